use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stickerforge")]
#[command(author, version, about = "Convert media into size-constrained WebP stickers")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert an input into a WebP sticker
    Convert {
        /// File path, http(s) URL, data URI, or JSON object with a "url" field
        #[arg(required = true)]
        input: String,

        /// Where to write the sticker
        #[arg(short, long)]
        output: PathBuf,

        /// Source kind: "image" for stills, "video" for animated stickers
        #[arg(short, long, default_value = "image")]
        kind: String,

        /// Stretch to a square instead of padding with transparent bars
        #[arg(long)]
        force_square: bool,

        /// Sticker pack name to embed
        #[arg(long)]
        pack: Option<String>,

        /// Sticker pack author to embed
        #[arg(long)]
        author: Option<String>,
    },

    /// Detect a file's format from its leading bytes
    Detect {
        /// File to inspect
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the pack metadata embedded in a sticker
    Inspect {
        /// Sticker file
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
