use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::PdfToolError;
use crate::orchestrator::{self, PdfCodec};
use crate::output;
use crate::pdf::PdfDocument;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitFile {
    pub path: PathBuf,
    pub page_count: usize,
}

/// Split `input` into `output_dir`, one file per page or per range token.
///
/// All outputs are built in memory and every target is checked before the
/// first file is written.
pub fn split_file(
    input: &Path,
    output_dir: &Path,
    ranges: Option<&str>,
    overwrite: bool,
) -> Result<Vec<SplitFile>> {
    output::ensure_input_file(input)?;

    let doc = PdfDocument::open(input)
        .with_context(|| format!("Failed to open PDF: {}", input.display()))?;

    let units = orchestrator::split_sequences(&PdfCodec, &doc, ranges)?;
    if units.is_empty() {
        return Err(PdfToolError::EmptyOutput.into());
    }

    output::ensure_directory(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let targets = output::unit_paths(output_dir, &units);
    output::check_writable(targets.iter().map(PathBuf::as_path), overwrite)?;

    let written = output::write_units(output_dir, &units)
        .with_context(|| format!("Failed to write into {}", output_dir.display()))?;

    info!(
        "Split {} into {} file(s) in {}",
        input.display(),
        written.len(),
        output_dir.display()
    );

    Ok(written
        .into_iter()
        .zip(&units)
        .map(|(path, unit)| SplitFile {
            path,
            page_count: unit.page_count,
        })
        .collect())
}

pub fn run(input: &Path, output_dir: &Path, ranges: Option<&str>, overwrite: bool) -> Result<()> {
    let files = split_file(input, output_dir, ranges, overwrite)?;

    println!(
        "Split {} into {} file(s) in {}",
        input.display(),
        files.len(),
        output_dir.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::test_support::{create_test_pdf, labels_of};
    use tempfile::tempdir;

    fn write_pdf(dir: &Path, name: &str, pages: u32) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, create_test_pdf(pages, "P")).unwrap();
        path
    }

    fn file_names(files: &[SplitFile]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_split_every_page() {
        let dir = tempdir().unwrap();
        let input = write_pdf(dir.path(), "book.pdf", 3);
        let out = dir.path().join("pages");

        let files = split_file(&input, &out, None, false).unwrap();
        assert_eq!(
            file_names(&files),
            vec!["book_page_1.pdf", "book_page_2.pdf", "book_page_3.pdf"]
        );
        assert_eq!(labels_of(&std::fs::read(&files[2].path).unwrap()), vec!["P-3"]);
    }

    #[test]
    fn test_split_by_ranges() {
        let dir = tempdir().unwrap();
        let input = write_pdf(dir.path(), "book.pdf", 5);
        let out = dir.path().join("parts");

        let files = split_file(&input, &out, Some("1-2,4"), false).unwrap();
        assert_eq!(file_names(&files), vec!["book_part_1.pdf", "book_part_2.pdf"]);
        assert_eq!(files[0].page_count, 2);
        assert_eq!(labels_of(&std::fs::read(&files[1].path).unwrap()), vec!["P-4"]);
    }

    #[test]
    fn test_split_creates_nested_output_dir() {
        let dir = tempdir().unwrap();
        let input = write_pdf(dir.path(), "book.pdf", 2);
        let out = dir.path().join("a/b/parts");

        let files = split_file(&input, &out, Some("2"), false).unwrap();
        assert!(out.is_dir());
        assert_eq!(file_names(&files), vec!["book_part_1.pdf"]);
    }

    #[test]
    fn test_bad_range_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = write_pdf(dir.path(), "book.pdf", 5);
        let out = dir.path().join("parts");

        let err = split_file(&input, &out, Some("1,9"), false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PdfToolError>(),
            Some(PdfToolError::InvalidRange(_))
        ));
        assert!(!out.exists());
    }

    #[test]
    fn test_conflict_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = write_pdf(dir.path(), "book.pdf", 3);
        let out = dir.path().join("pages");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("book_page_3.pdf"), b"old").unwrap();

        let err = split_file(&input, &out, None, false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PdfToolError>(),
            Some(PdfToolError::FileSystemConflict(_))
        ));
        assert!(!out.join("book_page_1.pdf").exists());

        assert_eq!(split_file(&input, &out, None, true).unwrap().len(), 3);
    }
}
