use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(about = "Pixel-art reference overlay", version)]
pub struct Cli {
    /// JSON store file (defaults to PIXEL_OVERLAY_STORE or overlay_state.json)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pixelize an image file offline
    Pixelize {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, default_value_t = 16)]
        pixel_size: u32,
        #[command(flatten)]
        palette: PaletteArgs,
    },

    /// Load an image as the overlay
    Apply {
        image: PathBuf,
        /// Opacity percent (0-100)
        #[arg(long)]
        opacity: Option<u32>,
        /// Scale percent (10-1000)
        #[arg(long)]
        scale: Option<u32>,
        #[arg(long)]
        pixel_size: Option<u32>,
        #[arg(long)]
        pixelize: bool,
        /// Show the pixel grid (requires --pixelize)
        #[arg(long)]
        grid: bool,
        #[command(flatten)]
        palette: PaletteArgs,
    },

    /// Show the overlay
    Show,

    /// Hide the overlay
    Hide,

    /// Remove the overlay and reset to defaults
    Remove,

    /// Print a share code for the current overlay
    Share,

    /// Load an overlay from a share code
    LoadShare { code: String },

    /// Match the pixel size to a capture of the target canvas
    AutoMatch {
        #[arg(long)]
        capture: PathBuf,
    },

    /// Print the stored overlay state
    Status,
}

#[derive(Args, Debug, Default)]
pub struct PaletteArgs {
    /// Comma-separated hex colors to quantize to
    #[arg(long, conflicts_with = "preset")]
    pub palette: Option<String>,

    /// Built-in palette: wplace or rplace
    #[arg(long)]
    pub preset: Option<String>,
}
