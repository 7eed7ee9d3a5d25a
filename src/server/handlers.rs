//! HTTP handlers for merge and split

use axum::{
    body::Bytes,
    extract::Multipart,
    http::{header, HeaderValue},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::io::{Cursor, Write};
use tracing::info;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use super::error::ApiError;
use crate::error::PdfToolError;
use crate::orchestrator::{self, OutputUnit, PdfCodec};
use crate::pdf::PdfDocument;

const INDEX_HTML: &str = include_str!("../../static/index.html");

pub const DEFAULT_MERGED_NAME: &str = "merged.pdf";

/// An uploaded file part.
struct Upload {
    file_name: String,
    bytes: Bytes,
}

impl Upload {
    async fn read(field: axum::extract::multipart::Field<'_>) -> Result<Self, ApiError> {
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        Ok(Upload { file_name, bytes })
    }

    fn check_pdf_name(&self) -> Result<(), ApiError> {
        if !has_pdf_extension(&self.file_name) {
            return Err(ApiError::InvalidRequest(format!(
                "Only PDF files are accepted: {}",
                self.file_name
            )));
        }
        Ok(())
    }

    fn load(&self) -> Result<PdfDocument, PdfToolError> {
        PdfDocument::from_bytes(self.file_name.as_str(), &self.bytes)
    }
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Merge the uploaded `files` parts, in upload order, into one PDF.
pub async fn merge(mut multipart: Multipart) -> Result<Response, ApiError> {
    let mut uploads = Vec::new();
    let mut output_name = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "files" | "files[]" => uploads.push(Upload::read(field).await?),
            "output_name" => output_name = Some(field.text().await?),
            _ => {}
        }
    }

    if uploads.len() < 2 {
        return Err(PdfToolError::InsufficientInput(uploads.len()).into());
    }
    for upload in &uploads {
        upload.check_pdf_name()?;
    }

    let output_name = merged_file_name(output_name.as_deref());
    let merged = run_blocking(move || {
        let documents = uploads
            .iter()
            .map(Upload::load)
            .collect::<Result<Vec<_>, _>>()?;
        orchestrator::merge(&PdfCodec, &documents, &output_name)
    })
    .await?;

    info!(
        "Merged upload into {} ({} pages)",
        merged.file_name, merged.page_count
    );

    attachment(&merged.file_name, "application/pdf", merged.bytes)
}

/// Split the uploaded `file` part. A single output comes back as a PDF,
/// several as a ZIP archive.
pub async fn split(mut multipart: Multipart) -> Result<Response, ApiError> {
    let mut upload = None;
    let mut ranges = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "file" => upload = Some(Upload::read(field).await?),
            "ranges" => ranges = Some(field.text().await?),
            _ => {}
        }
    }

    let upload =
        upload.ok_or_else(|| PdfToolError::MissingOrEmptyInput("no file was uploaded".into()))?;
    upload.check_pdf_name()?;

    let base = orchestrator::base_name(&upload.file_name);
    let units = run_blocking(move || {
        let doc = upload.load()?;
        orchestrator::split_sequences(&PdfCodec, &doc, ranges.as_deref())
    })
    .await?;

    info!("Split upload {} into {} file(s)", base, units.len());

    match units.len() {
        0 => Err(PdfToolError::EmptyOutput.into()),
        1 => {
            let unit = units.into_iter().next().ok_or(PdfToolError::EmptyOutput)?;
            attachment(&unit.file_name, "application/pdf", unit.bytes)
        }
        _ => {
            let archive = zip_units(&units)
                .map_err(|e| ApiError::Internal(format!("Failed to build ZIP: {}", e)))?;
            attachment(&format!("{}_split.zip", base), "application/zip", archive)
        }
    }
}

/// The requested merge output name, defaulted and forced to end in `.pdf`.
pub fn merged_file_name(requested: Option<&str>) -> String {
    let name = requested
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_MERGED_NAME);

    let mut name: String = name
        .chars()
        .map(|c| if c == '"' || c.is_control() { '_' } else { c })
        .collect();
    if !has_pdf_extension(&name) {
        name.push_str(".pdf");
    }
    name
}

fn has_pdf_extension(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".pdf")
}

pub fn zip_units(units: &[OutputUnit]) -> zip::result::ZipResult<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for unit in units {
        zip.start_file(unit.file_name.as_str(), options)?;
        zip.write_all(&unit.bytes)?;
    }

    Ok(zip.finish()?.into_inner())
}

async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, PdfToolError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

fn attachment(
    file_name: &str,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<Response, ApiError> {
    let disposition = format!("attachment; filename=\"{}\"", file_name);
    let disposition = HeaderValue::from_bytes(disposition.as_bytes())
        .map_err(|e| ApiError::Internal(format!("Bad file name {:?}: {}", file_name, e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merged_file_name() {
        assert_eq!(merged_file_name(None), "merged.pdf");
        assert_eq!(merged_file_name(Some("   ")), "merged.pdf");
        assert_eq!(merged_file_name(Some(" report ")), "report.pdf");
        assert_eq!(merged_file_name(Some("Report.PDF")), "Report.PDF");
        assert_eq!(merged_file_name(Some("a\"b.pdf")), "a_b.pdf");
    }

    #[test]
    fn test_zip_units_keeps_names_in_order() {
        let units = vec![
            OutputUnit {
                file_name: "a_part_1.pdf".into(),
                page_count: 1,
                bytes: b"one".to_vec(),
            },
            OutputUnit {
                file_name: "a_part_2.pdf".into(),
                page_count: 1,
                bytes: b"two".to_vec(),
            },
        ];
        let bytes = zip_units(&units).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut names: Vec<_> = archive.file_names().collect();
        names.sort();
        assert_eq!(names, vec!["a_part_1.pdf", "a_part_2.pdf"]);
    }
}
