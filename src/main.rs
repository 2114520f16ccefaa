use anyhow::{Context, Result};
use brandgen::compose::{ComposeStep, StepOutcome};
use brandgen::config::Config;
use brandgen::error::BrandError;
use brandgen::metrics::Metrics;
use brandgen::upstream::{secrets, GenerateService, GenerationClient};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Brandgen - branded image generation proxy
#[derive(Parser, Debug)]
#[command(name = "brandgen")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = brandgen::constants::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stamp the configured overlay onto a local image
    Compose {
        /// Generated image (PNG or JPEG)
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the branded PNG
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Forward a generation payload and brand the returned image
    Generate {
        /// JSON payload file, as a browser would POST it
        #[arg(short, long)]
        payload: PathBuf,

        /// Response file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate configuration and API key availability, then exit
    Check,
}

fn load_config(path: &Path) -> Result<Config> {
    let config = Config::from_file(path).map_err(BrandError::Config)?;
    config.validate().map_err(BrandError::Config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;

    brandgen::logging::init_subscriber(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging subsystem: {}", e))?;

    tracing::info!(
        config_file = %args.config.display(),
        overlay = config.overlay.variant_name(),
        asset_root = %config.assets.root.display(),
        model = %config.upstream.model,
        "Configuration loaded successfully"
    );

    let metrics = Arc::new(Metrics::new());

    match args.command {
        Command::Compose { input, output } => run_compose(&config, &metrics, &input, &output)?,
        Command::Generate { payload, output } => {
            run_generate(&config, Arc::clone(&metrics), &payload, output.as_deref()).await?
        }
        Command::Check => {
            let provider = secrets::from_config(&config.secret);
            secrets::require_api_key(provider.as_ref()).await?;
            println!(
                "Configuration OK: overlay={} assets={} model={}",
                config.overlay.variant_name(),
                config.assets.root.display(),
                config.upstream.model
            );
        }
    }

    let snapshot = metrics.snapshot();
    tracing::info!(
        compositions = snapshot.compositions,
        decode_failures = snapshot.decode_failures,
        upstream_requests = snapshot.upstream_requests,
        images_rewritten = snapshot.images_rewritten,
        "Run finished"
    );

    Ok(())
}

fn run_compose(config: &Config, metrics: &Metrics, input: &Path, output: &Path) -> Result<()> {
    let raw = std::fs::read(input)
        .with_context(|| format!("Failed to read input image {}", input.display()))?;

    let started = std::time::Instant::now();
    let composition = config.composer().compose(&raw);
    metrics.record_compose_duration(started.elapsed().as_secs_f64() * 1000.0);
    metrics.record_composition(&composition.report);

    std::fs::write(output, &composition.bytes)
        .with_context(|| format!("Failed to write output image {}", output.display()))?;

    let report = &composition.report;
    if let Some(err) = &report.decode {
        println!("decode: failed ({}), input copied unchanged", err);
    }
    for step in ComposeStep::ALL {
        match report.step(step) {
            StepOutcome::NotConfigured => {}
            outcome => match outcome.error() {
                Some(err) => println!("{}: {} ({})", step, outcome.label(), err),
                None => println!("{}: {}", step, outcome.label()),
            },
        }
    }
    if let Some(err) = &report.encode {
        println!("encode: failed ({}), input copied unchanged", err);
    }

    Ok(())
}

async fn run_generate(
    config: &Config,
    metrics: Arc<Metrics>,
    payload: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let text = std::fs::read_to_string(payload)
        .with_context(|| format!("Failed to read payload {}", payload.display()))?;
    let payload: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Payload {} is not valid JSON", payload.display()))?;

    let client = GenerationClient::new(&config.upstream).map_err(BrandError::from)?;
    let service = GenerateService::new(
        Arc::new(config.composer()),
        secrets::from_config(&config.secret),
        Arc::new(client),
        metrics,
    );

    let response = service.handle(Some(payload)).await;
    let body = serde_json::to_string_pretty(&response.body)?;

    match output {
        Some(path) => std::fs::write(path, body)
            .with_context(|| format!("Failed to write response {}", path.display()))?,
        None => println!("{}", body),
    }

    if !response.is_success() {
        anyhow::bail!("Generation failed with status {}", response.status);
    }
    Ok(())
}
