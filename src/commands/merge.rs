use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::PdfToolError;
use crate::orchestrator::{self, PdfCodec};
use crate::output;
use crate::pdf::PdfDocument;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    pub output: PathBuf,
    pub file_count: usize,
    pub page_count: usize,
}

/// Merge `inputs` in order into `output`.
///
/// Nothing is written unless every input loads, none is encrypted and the
/// output is free (or `overwrite` is set).
pub fn merge_files<P: AsRef<Path>>(inputs: &[P], output: &Path, overwrite: bool) -> Result<MergeSummary> {
    if inputs.len() < 2 {
        return Err(PdfToolError::InsufficientInput(inputs.len()).into());
    }

    for input in inputs {
        output::ensure_input_file(input.as_ref())?;
    }

    output::ensure_parent_directory(output)
        .with_context(|| format!("Failed to create directory for {}", output.display()))?;
    output::check_writable([output], overwrite)?;

    let documents = inputs
        .iter()
        .map(|input| {
            PdfDocument::open(input)
                .with_context(|| format!("Failed to open PDF: {}", input.as_ref().display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let file_name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let merged = orchestrator::merge(&PdfCodec, &documents, &file_name)?;

    std::fs::write(output, &merged.bytes)
        .with_context(|| format!("Failed to save merged PDF: {}", output.display()))?;

    info!("Wrote {}", output.display());

    Ok(MergeSummary {
        output: output.to_path_buf(),
        file_count: documents.len(),
        page_count: merged.page_count,
    })
}

pub fn run<P: AsRef<Path>>(inputs: &[P], output: &Path, overwrite: bool) -> Result<()> {
    let summary = merge_files(inputs, output, overwrite)?;

    println!(
        "Merged {} files ({} pages) into {}",
        summary.file_count,
        summary.page_count,
        summary.output.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::test_support::{create_test_pdf, labels_of};
    use tempfile::tempdir;

    fn write_pdf(dir: &Path, name: &str, pages: u32, prefix: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, create_test_pdf(pages, prefix)).unwrap();
        path
    }

    fn tool_error(err: &anyhow::Error) -> Option<&PdfToolError> {
        err.chain().find_map(|e| e.downcast_ref::<PdfToolError>())
    }

    #[test]
    fn test_merge_two_files() {
        let dir = tempdir().unwrap();
        let a = write_pdf(dir.path(), "a.pdf", 2, "A");
        let b = write_pdf(dir.path(), "b.pdf", 1, "B");
        let out = dir.path().join("out/merged.pdf");

        let summary = merge_files(&[a, b], &out, false).unwrap();
        assert_eq!(summary.file_count, 2);
        assert_eq!(summary.page_count, 3);
        assert_eq!(labels_of(&std::fs::read(&out).unwrap()), vec!["A-1", "A-2", "B-1"]);
    }

    #[test]
    fn test_merge_single_file_fails() {
        let dir = tempdir().unwrap();
        let a = write_pdf(dir.path(), "a.pdf", 2, "A");
        let err = merge_files(&[a], &dir.path().join("m.pdf"), false).unwrap_err();
        assert!(matches!(tool_error(&err), Some(PdfToolError::InsufficientInput(1))));
    }

    #[test]
    fn test_merge_missing_input() {
        let dir = tempdir().unwrap();
        let a = write_pdf(dir.path(), "a.pdf", 1, "A");
        let missing = dir.path().join("missing.pdf");
        let out = dir.path().join("m.pdf");
        let err = merge_files(&[a, missing], &out, false).unwrap_err();
        assert!(matches!(tool_error(&err), Some(PdfToolError::MissingOrEmptyInput(_))));
        assert!(!out.exists());
    }

    #[test]
    fn test_merge_respects_existing_output() {
        let dir = tempdir().unwrap();
        let a = write_pdf(dir.path(), "a.pdf", 1, "A");
        let b = write_pdf(dir.path(), "b.pdf", 1, "B");
        let out = dir.path().join("m.pdf");
        std::fs::write(&out, b"keep me").unwrap();

        let err = merge_files(&[a.clone(), b.clone()], &out, false).unwrap_err();
        assert!(matches!(tool_error(&err), Some(PdfToolError::FileSystemConflict(_))));
        assert_eq!(std::fs::read(&out).unwrap(), b"keep me");

        merge_files(&[a, b], &out, true).unwrap();
        assert_eq!(labels_of(&std::fs::read(&out).unwrap()), vec!["A-1", "B-1"]);
    }

    #[test]
    fn test_merge_output_without_extension() {
        let dir = tempdir().unwrap();
        let a = write_pdf(dir.path(), "a.pdf", 1, "A");
        let b = write_pdf(dir.path(), "b.pdf", 1, "B");
        let out = dir.path().join("merged");

        let summary = merge_files(&[a, b], &out, false).unwrap();
        assert_eq!(summary.page_count, 2);
        assert!(out.is_file());
        assert_eq!(labels_of(&std::fs::read(&out).unwrap()), vec!["A-1", "B-1"]);
    }
}
