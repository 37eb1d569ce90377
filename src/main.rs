//! Thumbnailer - publish JPEG thumbnails of remote images to S3.

mod adapters;
mod cassette;
mod cli;
mod config;
mod context;
mod error;
mod generator;
mod location;
mod ports;
mod transcode;

use std::io::IsTerminal;
use std::path::Path;
use std::process;

use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::Cli;
use crate::config::{discover_config_path, Config};
use crate::context::ServiceContext;
use crate::error::ThumbnailError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Log to stderr; stdout carries only the thumbnail URL.
fn init_tracing(verbose: bool) {
    let default = if verbose { "thumbnailer=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), ThumbnailError> {
    let config_path = discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(ThumbnailError::Config)?;
    debug!(config = %config_path.display(), "loaded config");

    if cli.show_config {
        print!("{}", config.resolve()?);
        return Ok(());
    }
    let Some(image_url) = cli.image_url else {
        return Err(ThumbnailError::Config("No image URL given".into()));
    };

    // Create context based on mode (live / recording / replaying)
    let replay_path = std::env::var("THUMBNAILER_REPLAY").ok();
    let is_recording = std::env::var("THUMBNAILER_REC").is_ok_and(|v| v == "true" || v == "1");

    // Replay touches no network, so it needs the destination but no credentials.
    let (ctx, destination, recording_session) = if let Some(ref cassette_path) = replay_path {
        debug!(cassette = %cassette_path, "replaying");
        let destination = config.resolve_destination()?;
        (ServiceContext::replaying(Path::new(cassette_path))?, destination, None)
    } else {
        let settings = config.resolve()?;
        debug!(
            original_bucket = %settings.original.bucket,
            thumbnail_bucket = %settings.thumbnail.bucket,
            "resolved settings"
        );
        if is_recording {
            debug!("recording mode enabled");
            let (ctx, session) = ServiceContext::recording(&settings).await;
            (ctx, settings.thumbnail.destination(), Some(session))
        } else {
            (ServiceContext::live(&settings).await, settings.thumbnail.destination(), None)
        }
    };

    let generator = ctx.into_generator(destination);
    let result = generator.generate(&image_url).await;
    drop(generator);

    // Failed runs are recorded too.
    if let Some(session) = recording_session {
        match session.finish() {
            Ok(path) => eprintln!("Cassette saved: {}", path.display()),
            Err(e) => warn!("failed to save cassette: {e}"),
        }
    }

    println!("{}", result?);
    Ok(())
}
