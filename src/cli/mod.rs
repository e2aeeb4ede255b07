//! CLI Module
//!
//! Command-line interface for soxgate.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// soxgate - run SoX audio operations through one serialized engine
#[derive(Parser, Debug)]
#[command(name = "soxgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the sox binary (overrides config and SOXGATE_SOX_PATH)
    #[arg(long, global = true)]
    pub sox: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cut a time range out of a file
    #[command(name = "trim")]
    Trim {
        input: PathBuf,
        output: PathBuf,

        /// Start of the range in seconds
        #[arg(short, long, default_value_t = 0.0)]
        start: f64,

        /// End of the range in seconds; 0 keeps the rest of the file
        #[arg(short, long, default_value_t = 0.0)]
        end: f64,
    },

    /// Convert to an uncompressed format chosen by the output extension
    #[command(name = "convert")]
    Convert {
        input: PathBuf,
        output: PathBuf,

        /// Output bit depth (8, 16, 24 or 32)
        #[arg(short, long)]
        bits: Option<u32>,

        /// Output sample rate in Hz
        #[arg(short, long)]
        rate: Option<f64>,
    },

    /// Encode as MP3
    #[command(name = "mp3")]
    Mp3 {
        input: PathBuf,
        output: PathBuf,

        /// Constant bitrate in kbps
        #[arg(short, long, conflicts_with = "vbr")]
        bitrate: Option<u32>,

        /// Variable bitrate level (0 = best, 9 = smallest)
        #[arg(long)]
        vbr: Option<u8>,

        /// Encoder quality (0 = best, 9 = fastest); defaults to the configured quality
        #[arg(short, long)]
        quality: Option<u8>,

        /// Output sample rate in Hz
        #[arg(short, long)]
        rate: Option<f64>,
    },

    /// Split a stereo file into <name>.L and <name>.R
    #[command(name = "split-stereo")]
    SplitStereo {
        input: PathBuf,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Export every channel as <name>.<n>
    #[command(name = "export-channels")]
    ExportChannels {
        input: PathBuf,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Keep the first channel as <name>.Mono
    #[command(name = "to-mono")]
    ToMono {
        input: PathBuf,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Combine files into one multi-channel file
    #[command(name = "mux")]
    Mux {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Input files, one or more channels each
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Show channels, sample rate and duration of a file
    #[command(name = "info")]
    Info { input: PathBuf },
}

/// Output placement shared by the channel export commands
#[derive(clap::Args, Debug, Clone)]
pub struct ExportArgs {
    /// Output directory (defaults to the input's directory)
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// Base name for outputs (defaults to the input's file stem)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Keep outputs that already exist
    #[arg(long)]
    pub keep_existing: bool,
}

impl ExportArgs {
    pub fn to_request(&self) -> crate::ops::ChannelExport {
        crate::ops::ChannelExport {
            destination: self.dest.clone(),
            new_name: self.name.clone(),
            overwrite: !self.keep_existing,
        }
    }
}
