//! Fresco worker binary.
//!
//! Loads configuration from the environment, assembles the pipeline with
//! the real service clients, and serves one action at a time from stdin.
//! The worker is single-flight by construction: the next line is not read
//! until the current run finishes.

use fresco_client::{ImageClient, SupervisorClient, TextClient};
use fresco_core::Config;
use fresco_pipeline::Pipeline;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod input;

use input::{parse_line, InputAction};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = Config::from_env()?;
    banner(&config);

    let states = SupervisorClient::new(&config.supervisor_api, config.supervisor_token.clone());
    let events = SupervisorClient::new(&config.supervisor_api, config.supervisor_token.clone());
    let text = TextClient::new(config.api_key.clone(), &config.prompt_model);
    let image = ImageClient::new(config.api_key.clone());
    let pipeline = Pipeline::new(states, events, text, image, config);

    serve(&pipeline).await;
    info!("input channel closed, shutting down");
    Ok(())
}

/// Read actions from stdin until EOF, running one pipeline at a time.
async fn serve<S, E, P, I>(pipeline: &Pipeline<S, E, P, I>)
where
    S: fresco_client::StateSource,
    E: fresco_client::EventSink,
    P: fresco_client::PromptGenerator,
    I: fresco_client::ImageGenerator,
{
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "failed to read input line");
                break;
            }
        };

        let action = match parse_line(&line) {
            Ok(Some(action)) => action,
            Ok(None) => continue,
            Err(message) => {
                warn!(message, "skipping malformed input line");
                continue;
            }
        };

        let run = match action {
            InputAction::Generate => pipeline.run_generate().await,
            InputAction::Direct(request) => pipeline.run_direct(&request).await,
        };
        if run.success {
            info!(run_id = %run.id, total_seconds = run.total_seconds, "run succeeded");
        } else {
            warn!(run_id = %run.id, error = run.error.as_deref(), "run failed");
        }
    }
}

/// Startup summary of the effective configuration.
fn banner(config: &Config) {
    info!(version = env!("CARGO_PKG_VERSION"), "fresco display worker starting");
    info!(
        prompt_model = %config.prompt_model,
        image_model = %config.image_model,
        "generation models"
    );
    info!(
        output_dir = %config.output_dir.display(),
        filename_prefix = %config.filename_prefix,
        "output"
    );
    info!(
        resize = config.resize_output,
        target = %config.target_resolution,
        archive = config.save_original,
        video = config.enable_video,
        "post-processing"
    );
    if config.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; generation calls will fail");
    }
    if config.supervisor_token.is_none() {
        warn!("SUPERVISOR_TOKEN is not set; state fetches and events are disabled");
    }
}
