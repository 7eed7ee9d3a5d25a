use clap::{Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdf-tool")]
#[command(about = "Merge PDFs into one file or split a PDF by pages and ranges")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Combine multiple PDFs into one, in the order given
    Merge {
        /// PDF files to merge (at least 2)
        #[arg(short, long, num_args = 1.., required = true)]
        inputs: Vec<PathBuf>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Replace the output file if it already exists
        #[arg(long)]
        overwrite: bool,
    },

    /// Split a PDF into one file per page, or one file per range
    #[command(alias = "burst")]
    Split {
        /// PDF file to split
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Page ranges, one output file each (e.g., "1-3,5,7-").
        /// Without it every page becomes its own file
        #[arg(short, long)]
        ranges: Option<String>,

        /// Replace output files that already exist
        #[arg(long)]
        overwrite: bool,
    },

    /// Show page count and encryption status
    Info {
        /// PDF file to inspect
        path: PathBuf,
    },

    /// Run the HTTP API
    Serve {
        /// Address to bind
        #[arg(long, env = "PDF_TOOL_HOST", default_value = "127.0.0.1")]
        host: IpAddr,

        /// Port to bind. Without it the first free port in 8000-8010 is used
        #[arg(short, long, env = "PDF_TOOL_PORT")]
        port: Option<u16>,

        /// Largest accepted request body, in megabytes
        #[arg(long, env = "PDF_TOOL_MAX_UPLOAD_MB", default_value = "100")]
        max_upload_mb: usize,
    },

    /// Run as MCP server over stdio
    Mcp,
}
