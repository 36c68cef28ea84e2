//! Command-line interface for slatewire
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Live set captioning with slate annotations
#[derive(Parser, Debug)]
#[command(
    name = "slatewire",
    version,
    about = "Live set captioning: spoken slate calls become take annotations"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress status output (annotations still print)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Audio input device (e.g., pipewire)
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Token endpoint URL override
    #[arg(long, value_name = "URL")]
    pub token_url: Option<String>,

    /// Streaming relay address override (host:port)
    #[arg(long, value_name = "ADDR")]
    pub relay: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available audio input devices
    Devices,

    /// Manage configuration
    Config {
        /// Action to perform
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the configuration file path
    Path,
    /// Show the effective configuration
    Show,
    /// Write a default configuration file
    Init,
}
