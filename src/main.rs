use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use docx_chunker::service::{DocumentService, Download, ServiceError, StatusKind};
use docx_chunker::{Config, DocumentStore};

#[derive(Parser, Debug)]
#[command(
    name = "docx-chunker",
    about = "Split .docx files into paragraph chunks and merge them back",
    long_about = "Analyzes Word documents, splits them into self-contained chunk archives \
                  of a fixed number of paragraphs, and merges stored chunks into one document"
)]
#[command(version)]
struct Cli {
    /// Storage directory (overrides the config file)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Paragraphs per chunk when uploading (overrides the config file)
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    chunk_size: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Report paragraphs, page breaks, tables, images and headings
    Analyze {
        file: PathBuf,

        /// Group paragraphs into sections instead
        #[arg(long)]
        sections: bool,
    },
    /// Split a document into chunks and store it
    Upload { file: PathBuf },
    /// List stored documents, newest first
    List,
    /// Write one stored chunk to a file
    Chunk {
        document_id: String,
        index: usize,

        /// Output path (defaults to the chunk file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Merge the stored chunks of a document
    Merge { document_id: String },
    /// Write the merged document to a file
    Download {
        document_id: String,

        /// Output path (defaults to <id>_final.docx)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Remove everything stored for a document
    Delete { document_id: String },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write the default config file
    Init,
    /// Show the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let code = match error.downcast_ref::<ServiceError>() {
                Some(service_error) => {
                    if let Ok(body) = serde_json::to_string_pretty(service_error) {
                        eprintln!("{body}");
                    }
                    exit_code(service_error.kind)
                }
                None => {
                    eprintln!("Error: {error:#}");
                    1
                }
            };
            ExitCode::from(code)
        }
    }
}

fn exit_code(kind: StatusKind) -> u8 {
    match kind {
        StatusKind::BadRequest => 2,
        StatusKind::NotFound => 3,
        StatusKind::Internal => 1,
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(root) = cli.root {
        config.storage_root = root;
    }
    if let Some(chunk_size) = cli.chunk_size {
        config.paragraphs_per_chunk = chunk_size as usize;
    }
    config.validate()?;

    let service = DocumentService::new(
        DocumentStore::new(config.storage_root.clone()),
        config.split_options(),
    );

    match cli.command {
        Commands::Analyze { file, sections } => {
            let (name, bytes) = read_upload(&file).await?;
            if sections {
                print_json(&service.analyze_sections(&name, &bytes)?)
            } else {
                print_json(&service.analyze(&name, &bytes)?)
            }
        }
        Commands::Upload { file } => {
            let (name, bytes) = read_upload(&file).await?;
            print_json(&service.upload(&name, &bytes).await?)
        }
        Commands::List => print_json(&service.list().await?),
        Commands::Chunk {
            document_id,
            index,
            output,
        } => {
            let download = service.chunk(&document_id, index).await?;
            write_download(download, output).await
        }
        Commands::Merge { document_id } => print_json(&service.merge(&document_id).await?),
        Commands::Download {
            document_id,
            output,
        } => {
            let download = service.download(&document_id).await?;
            write_download(download, output).await
        }
        Commands::Delete { document_id } => print_json(&service.delete(&document_id).await?),
        Commands::Config { action } => match action {
            ConfigAction::Init => {
                Config::init_default()?;
                match Config::get_config_path() {
                    Some(path) => println!("Wrote {}", path.display()),
                    None => println!("No config directory available on this system"),
                }
                Ok(())
            }
            ConfigAction::Show => {
                println!("{}", toml::to_string_pretty(&config)?);
                Ok(())
            }
        },
    }
}

async fn read_upload(path: &Path) -> Result<(String, Vec<u8>)> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("upload.docx")
        .to_string();
    Ok((name, bytes))
}

async fn write_download(download: Download, output: Option<PathBuf>) -> Result<()> {
    let path = output.unwrap_or_else(|| PathBuf::from(&download.file_name));
    tokio::fs::write(&path, &download.bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!(
        "Wrote {} ({} bytes, {})",
        path.display(),
        download.bytes.len(),
        download.content_disposition()
    );
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
