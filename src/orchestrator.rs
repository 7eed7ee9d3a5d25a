//! Page selection for merge and split.
//!
//! Everything here is synchronous and works on documents already in memory.
//! The codec does the byte-level work; this module only decides which pages
//! go into which output, in which order, under which file name.

use std::path::Path;
use tracing::{debug, info};

use crate::error::PdfToolError;
use crate::page_range::{self, PageGroup};
use crate::pdf::{self, PdfDocument, PdfPage};

/// A loaded input document, as far as page selection is concerned.
pub trait SourceDocument {
    type Page: Clone;

    fn name(&self) -> &str;
    fn page_count(&self) -> usize;
    fn is_encrypted(&self) -> bool;
    fn page_at(&self, index: usize) -> Option<Self::Page>;
}

/// Turns an ordered run of pages, possibly from several documents, into
/// file bytes.
pub trait PageCodec {
    type Page;

    fn file_suffix(&self) -> &'static str;
    fn serialize(&self, pages: &[Self::Page]) -> Result<Vec<u8>, PdfToolError>;
}

impl SourceDocument for PdfDocument {
    type Page = PdfPage;

    fn name(&self) -> &str {
        PdfDocument::name(self)
    }

    fn page_count(&self) -> usize {
        PdfDocument::page_count(self)
    }

    fn is_encrypted(&self) -> bool {
        PdfDocument::is_encrypted(self)
    }

    fn page_at(&self, index: usize) -> Option<PdfPage> {
        PdfDocument::page_at(self, index)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfCodec;

impl PageCodec for PdfCodec {
    type Page = PdfPage;

    fn file_suffix(&self) -> &'static str {
        pdf::PDF_SUFFIX
    }

    fn serialize(&self, pages: &[PdfPage]) -> Result<Vec<u8>, PdfToolError> {
        pdf::write_pages(pages)
    }
}

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputUnit {
    pub file_name: String,
    pub page_count: usize,
    pub bytes: Vec<u8>,
}

/// Every page of every document, document order then page order.
pub fn merge_sequence<D: SourceDocument>(documents: &[D]) -> Result<Vec<D::Page>, PdfToolError> {
    if documents.len() < 2 {
        return Err(PdfToolError::InsufficientInput(documents.len()));
    }

    // checked up front, before any page is collected
    if let Some(doc) = documents.iter().find(|doc| doc.is_encrypted()) {
        return Err(PdfToolError::EncryptedDocument(doc.name().to_string()));
    }

    let mut pages = Vec::new();
    for doc in documents {
        pages.extend(pages_of(doc, 0..doc.page_count())?);
    }
    Ok(pages)
}

/// Merge `documents` into a single output named `output_name`.
pub fn merge<C, D>(codec: &C, documents: &[D], output_name: &str) -> Result<OutputUnit, PdfToolError>
where
    D: SourceDocument,
    C: PageCodec<Page = D::Page>,
{
    let pages = merge_sequence(documents)?;
    if pages.is_empty() {
        return Err(PdfToolError::EmptyOutput);
    }
    info!(
        "Merging {} documents ({} pages)",
        documents.len(),
        pages.len()
    );

    Ok(OutputUnit {
        file_name: output_name.to_string(),
        page_count: pages.len(),
        bytes: codec.serialize(&pages)?,
    })
}

/// Split `document` into one output per page group.
///
/// Without range text every page becomes its own `{base}_page_{n}` file;
/// with it, every token becomes a `{base}_part_{k}` file. Range errors are
/// returned exactly as the parser reported them.
pub fn split_sequences<C, D>(
    codec: &C,
    document: &D,
    ranges_text: Option<&str>,
) -> Result<Vec<OutputUnit>, PdfToolError>
where
    D: SourceDocument,
    C: PageCodec<Page = D::Page>,
{
    if document.is_encrypted() {
        return Err(PdfToolError::EncryptedDocument(document.name().to_string()));
    }

    let total_pages = document.page_count();
    let base = base_name(document.name());
    let suffix = codec.file_suffix();

    let named_groups: Vec<(String, PageGroup)> = match ranges_text.map(str::trim) {
        Some(text) if !text.is_empty() => page_range::parse(text, total_pages)?
            .into_groups()
            .into_iter()
            .enumerate()
            .map(|(i, group)| (format!("{}_part_{}{}", base, i + 1, suffix), group))
            .collect(),
        _ => (0..total_pages)
            .map(|i| (format!("{}_page_{}{}", base, i + 1, suffix), vec![i]))
            .collect(),
    };

    debug!(
        "Splitting {} ({} pages) into {} outputs",
        document.name(),
        total_pages,
        named_groups.len()
    );

    named_groups
        .into_iter()
        .map(|(file_name, group)| {
            let pages = pages_of(document, group.iter().copied())?;
            Ok(OutputUnit {
                file_name,
                page_count: pages.len(),
                bytes: codec.serialize(&pages)?,
            })
        })
        .collect()
}

/// File stem used for generated names: `"` becomes `_`, and a nameless
/// input is called `document`.
pub fn base_name(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    if stem.is_empty() {
        "document".to_string()
    } else {
        stem.replace('"', "_")
    }
}

fn pages_of<D: SourceDocument>(
    document: &D,
    indices: impl IntoIterator<Item = usize>,
) -> Result<Vec<D::Page>, PdfToolError> {
    indices
        .into_iter()
        .map(|i| {
            document.page_at(i).ok_or_else(|| PdfToolError::InvalidPdf {
                name: document.name().to_string(),
                reason: format!("page index {} is missing", i),
            })
        })
        .collect()
}
