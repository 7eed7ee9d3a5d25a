pub mod document;
#[cfg(test)]
pub mod test_support;

pub use document::{write_pages, PdfDocument, PdfPage, PDF_SUFFIX};
