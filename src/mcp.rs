use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::commands::{info::inspect, merge::merge_files, split::split_file};

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfMergeRequest {
    #[schemars(description = "PDF files to merge, in order (at least 2)")]
    pub inputs: Vec<String>,
    #[schemars(description = "Output file path")]
    pub output: String,
    #[schemars(description = "Replace the output file if it exists (default: false)")]
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfSplitRequest {
    #[schemars(description = "Path to the PDF file to split")]
    pub path: String,
    #[schemars(description = "Directory to write the output files into")]
    pub output_dir: String,
    #[schemars(
        description = "Page ranges, one output file each (e.g., '1-3,5,7-'). Omit to split every page into its own file"
    )]
    #[serde(default)]
    pub ranges: Option<String>,
    #[schemars(description = "Replace output files that exist (default: false)")]
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Clone)]
pub struct PdfServer {
    tool_router: ToolRouter<Self>,
}

impl PdfServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for PdfServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl PdfServer {
    #[tool(description = "Get the page count of a PDF and whether it is encrypted")]
    fn pdf_info(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        match inspect(Path::new(&path)) {
            Ok(info) => to_json(&PdfInfoResult {
                path,
                page_count: info.page_count,
                encrypted: info.encrypted,
            }),
            Err(e) => format!("Error: {:#}", e),
        }
    }

    #[tool(description = "Merge two or more PDFs, in the order given, into a new PDF file")]
    fn pdf_merge(&self, Parameters(req): Parameters<PdfMergeRequest>) -> String {
        let inputs: Vec<PathBuf> = req.inputs.iter().map(PathBuf::from).collect();
        match merge_files(&inputs, Path::new(&req.output), req.overwrite) {
            Ok(summary) => to_json(&MergeResult {
                output_path: req.output,
                file_count: summary.file_count,
                page_count: summary.page_count,
            }),
            Err(e) => format!("Error: {:#}", e),
        }
    }

    #[tool(
        description = "Split a PDF into one file per page, or one file per range token using syntax like '1-3,5,7-'. Files are named <name>_page_<n>.pdf or <name>_part_<k>.pdf"
    )]
    fn pdf_split(&self, Parameters(req): Parameters<PdfSplitRequest>) -> String {
        match split_file(
            Path::new(&req.path),
            Path::new(&req.output_dir),
            req.ranges.as_deref(),
            req.overwrite,
        ) {
            Ok(files) => to_json(&SplitResult {
                output_dir: req.output_dir,
                files: files
                    .into_iter()
                    .map(|f| SplitFileResult {
                        path: f.path.display().to_string(),
                        page_count: f.page_count,
                    })
                    .collect(),
            }),
            Err(e) => format!("Error: {:#}", e),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("Error: {}", e))
}

// Result types for MCP tools

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PdfInfoResult {
    pub path: String,
    pub page_count: usize,
    pub encrypted: bool,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct MergeResult {
    pub output_path: String,
    pub file_count: usize,
    pub page_count: usize,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SplitFileResult {
    pub path: String,
    pub page_count: usize,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SplitResult {
    pub output_dir: String,
    pub files: Vec<SplitFileResult>,
}

#[tool_handler]
impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PDF merge and split tools. Use pdf_info to get the page count, pdf_merge to \
                 combine PDFs in order, and pdf_split to break a PDF into per-page files or \
                 per-range files using range syntax like '1-3,5,7-' (1-based, '7-' runs to the \
                 last page)."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    let server = PdfServer::new();

    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
