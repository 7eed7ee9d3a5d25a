mod cli;
mod commands;
mod error;
mod mcp;
mod orchestrator;
mod output;
mod page_range;
mod pdf;
mod server;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use error::PdfToolError;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Merge {
            inputs,
            output,
            overwrite,
        } => {
            commands::merge::run(&inputs, &output, overwrite)?;
        }
        Commands::Split {
            input,
            output_dir,
            ranges,
            overwrite,
        } => {
            commands::split::run(&input, &output_dir, ranges.as_deref(), overwrite)?;
        }
        Commands::Info { path } => {
            commands::info::run(&path)?;
        }
        Commands::Serve {
            host,
            port,
            max_upload_mb,
        } => {
            server::run_server(server::ServerConfig::new(host, port, max_upload_mb)).await?;
        }
        Commands::Mcp => {
            mcp::run_server().await?;
        }
    }

    Ok(())
}

/// Logs go to stderr: stdout carries command output and the MCP transport.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pdf_tool=info,tower_http=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// 2 for problems with what was asked, 1 for failures while doing it.
fn exit_code(err: &anyhow::Error) -> u8 {
    let usage = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<PdfToolError>())
        .is_some_and(PdfToolError::is_usage_error);

    if usage {
        2
    } else {
        1
    }
}
