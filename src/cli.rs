//! CLI argument parsing with clap.

use clap::Parser;

/// Fetch an image, shrink it to a 300px-wide JPEG and publish it to S3.
#[derive(Parser, Debug)]
#[command(name = "thumbnailer", version, about)]
pub struct Cli {
    /// URL of the source image.
    #[arg(required_unless_present = "show_config")]
    pub image_url: Option<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Print the resolved configuration (secret redacted) and exit.
    #[arg(long)]
    pub show_config: bool,

    /// Verbose logging (overridden by `RUST_LOG`).
    #[arg(short, long)]
    pub verbose: bool,
}
