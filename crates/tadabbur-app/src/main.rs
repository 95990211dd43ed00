use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tadabbur_capture::{CameraManager, CropEngine, FrameCapturer, MediaConstraints, StillImageCamera};
use tadabbur_client::HttpProcessingClient;
use tadabbur_config::Config;
use tadabbur_core::CaptureWorkflow;
use tadabbur_types::Language;
use tokio::signal;
use tracing_subscriber::EnvFilter;

mod controller;
mod events;
mod profile;
mod state;
mod ui;

#[cfg(test)]
mod tests;

use self::controller::AppController;
use self::profile::ProfileStore;
use self::state::AppState;

/// Image served as the camera feed when none is configured
const DEFAULT_CAMERA_IMAGE: &str = "camera.jpg";

#[derive(Parser)]
#[command(name = "tadabbur", about = "Scan an ayah, crop it and read its translation and tafsir")]
#[command(version)]
struct Cli {
    /// Profile to load from the user config directory
    #[arg(long, default_value = "main")]
    profile: String,

    /// Image file played back as the camera feed
    #[arg(long, value_name = "PATH")]
    camera_image: Option<PathBuf>,

    /// Processing service base URL
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Language to request results in
    #[arg(long)]
    language: Option<Language>,

    /// Copy the main profile into a new profile with this name, then exit
    #[arg(long, value_name = "NAME")]
    new_profile: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // Plain text for people, JSON when piped into something else
    if atty::is(atty::Stream::Stderr) {
        builder.init();
    } else {
        builder.json().init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match ProfileStore::user() {
        Ok(store) => {
            store.init()?;
            store.load(&cli.profile)?
        }
        Err(e) => {
            tracing::warn!("Profiles unavailable, using defaults: {e}");
            Config::default()
        }
    };
    config.apply_env();

    if let Some(url) = &cli.api_url {
        config.api.base_url = Some(url.clone());
    }
    if let Some(language) = cli.language {
        config.ui.language = language;
    }
    if let Some(path) = &cli.camera_image {
        config.camera.still_image = Some(path.display().to_string());
    }
    Ok(config)
}

fn build_workflow(config: &Config) -> anyhow::Result<CaptureWorkflow<StillImageCamera>> {
    let still = config
        .camera
        .still_image
        .clone()
        .unwrap_or_else(|| DEFAULT_CAMERA_IMAGE.to_string());
    tracing::info!("Camera feed: {}", still);

    let constraints = MediaConstraints {
        facing_mode: config.camera.facing_mode,
        ideal_width: config.camera.ideal_width,
        ideal_height: config.camera.ideal_height,
    };
    let camera = CameraManager::new(StillImageCamera::from_path(still), constraints);

    let client = HttpProcessingClient::new(
        config.api.base_url(),
        Duration::from_millis(config.api.timeout_ms),
    )
    .context("building HTTP client")?;
    tracing::info!("Processing service: {}", client.base_url());

    Ok(CaptureWorkflow::new(camera, Arc::new(client))
        .with_capturer(FrameCapturer::new(config.camera.capture_quality))
        .with_crop_engine(CropEngine::new(
            config.crop.output_quality,
            config.crop.background,
        ))
        .with_language(config.ui.language))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing();

    if let Some(name) = &cli.new_profile {
        let store = ProfileStore::user()?;
        store.init()?;
        let file = store.add_from_main(name)?;
        println!("Created {}", file.display());
        return Ok(());
    }

    let config = load_config(&cli)?;
    tracing::debug!(?config, "Loaded config");
    let workflow = build_workflow(&config)?;
    let state = Arc::new(AppState::new(config));

    let controller = AppController::new(state);
    let mut tasks = controller.spawn_tasks(workflow);

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
        }
        Some(result) = tasks.join_next() => {
            match result {
                Ok(Ok(())) => tracing::info!("Task finished, shutting down"),
                Ok(Err(e)) => tracing::error!("Task failed: {e:#}"),
                Err(e) => tracing::error!("Task panicked: {e}"),
            }
        }
    }

    controller.shutdown();
    while let Some(result) = tasks.join_next().await {
        if let Ok(Err(e)) = result {
            tracing::error!("Task failed during shutdown: {e:#}");
        }
    }
    Ok(())
}
