use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Extract positioned table-cell text from scanned PDF documents.
#[derive(Debug, Parser)]
#[command(name = "gridocr", about, version)]
pub struct Cli {
    /// Log debug detail (geometry counts, OCR retries) to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the full pipeline over a PDF and submit segments to the store
    Extract {
        /// Path to the scanned PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Document id the segments belong to
        #[arg(long)]
        doc_id: i64,

        /// Base URL of the segment store
        #[arg(long, default_value = "http://localhost:5000")]
        store: String,

        /// Tesseract language model(s)
        #[arg(long, default_value = "jpn+eng")]
        lang: String,

        /// Page span to process, e.g. '3' or '1-20'. Default: 1-200
        #[arg(long)]
        pages: Option<String>,

        /// Write block crops, cell images, and raw OCR text to this directory
        #[arg(long, value_name = "DIR")]
        debug_dump: Option<PathBuf>,

        /// Print would-be segments as JSON lines instead of submitting them
        #[arg(long)]
        dry_run: bool,
    },

    /// Detect and print the block/row/column geometry of a page image
    Grid {
        /// Path to a page image (PNG)
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = GridFormat::Text)]
        format: GridFormat,
    },
}

/// Output format for the grid subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GridFormat {
    Text,
    Json,
}
