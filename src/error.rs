use std::path::PathBuf;
use thiserror::Error;

use crate::page_range::InvalidRangeError;

#[derive(Error, Debug)]
pub enum PdfToolError {
    #[error("Invalid page range: {0}")]
    InvalidRange(#[from] InvalidRangeError),

    #[error("Encrypted PDF cannot be processed: {0}")]
    EncryptedDocument(String),

    #[error("Merging requires at least 2 PDF files, got {0}")]
    InsufficientInput(usize),

    #[error("Missing or empty input: {0}")]
    MissingOrEmptyInput(String),

    #[error("Output already exists (use --overwrite to replace it): {}", .0.display())]
    FileSystemConflict(PathBuf),

    #[error("Not a valid PDF: {name}: {reason}")]
    InvalidPdf { name: String, reason: String },

    #[error("No output files were produced")]
    EmptyOutput,

    #[error("Failed to write PDF: {0}")]
    Serialize(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PdfToolError {
    /// Errors caused by what the caller asked for, as opposed to failures
    /// while doing it.
    pub fn is_usage_error(&self) -> bool {
        !matches!(self, PdfToolError::Serialize(_) | PdfToolError::Io(_))
    }
}
