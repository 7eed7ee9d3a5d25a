use anyhow::{Context, Result};
use std::path::Path;

use crate::pdf::PdfDocument;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfInfo {
    pub page_count: usize,
    pub encrypted: bool,
}

pub fn inspect(path: &Path) -> Result<PdfInfo> {
    let doc = PdfDocument::open(path)
        .with_context(|| format!("Failed to open PDF: {}", path.display()))?;
    Ok(PdfInfo {
        page_count: doc.page_count(),
        encrypted: doc.is_encrypted(),
    })
}

pub fn run(path: &Path) -> Result<()> {
    let info = inspect(path)?;

    println!("File: {}", path.display());
    println!("Pages: {}", info.page_count);
    println!("Encrypted: {}", if info.encrypted { "yes" } else { "no" });

    Ok(())
}
