use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use textsnap_config::ConfigStore;
use textsnap_core::languages::tesseract_language_name;
use textsnap_core::state::AppState;
use textsnap_ocr::{TessdataDownloader, TesseractEngine, installed_languages};
use textsnap_translator::GoogleTranslator;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod capture;
mod controller;
mod events;
mod io;
mod sink;
mod ui;

#[cfg(test)]
mod tests;

use self::capture::{CaptureSource, Orchestrator};
use self::controller::{AppController, ChannelSet};
use self::sink::{DesktopSink, OutputSink};

#[derive(Parser)]
#[command(name = "textsnap")]
#[command(about = "Screenshot OCR with optional translation")]
struct Args {
    /// Settings file, overrides TEXTSNAP_CONFIG
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recognise the text in an image file
    Scan {
        image: PathBuf,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Download trained data for a Tesseract language code
    Download { code: String },
    /// Print the effective configuration
    Config,
    /// List installed OCR languages
    Languages,
    /// Take requests on stdin and print events to stdout as JSON lines
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();
    init_tracing();

    let store = match args.config {
        Some(path) => ConfigStore::new(path),
        None => ConfigStore::from_env(),
    };
    let state = Arc::new(AppState::new(store));

    match args.command {
        Command::Scan { image, json } => scan(state, image, json).await,
        Command::Download { code } => download(&state, &code).await,
        Command::Config => {
            let config = state.config();
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Command::Languages => {
            languages(&state);
            Ok(())
        }
        Command::Serve => serve(state).await,
    }
}

fn init_tracing() {
    let ansi = atty::is(atty::Stream::Stderr);
    let json = std::env::var_os("TEXTSNAP_LOG_JSON").is_some();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_ansi(ansi).with_writer(std::io::stderr)))
        .init();
}

/// Engines are built from the configuration at startup.
fn build_orchestrator(state: Arc<AppState>, sink: Arc<dyn OutputSink>) -> Arc<Orchestrator> {
    let config = state.config();
    let recognizer = Arc::new(TesseractEngine::from_config(&config.ocr));
    let translator = Arc::new(GoogleTranslator::from_config(&config.translate));

    Arc::new(Orchestrator::new(state, recognizer, translator, sink))
}

async fn scan(state: Arc<AppState>, image: PathBuf, json: bool) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator(state, Arc::new(DesktopSink::new()));
    let result = orchestrator.run(CaptureSource::File(image)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{}", result.extracted_text);
    if let Some(translation) = &result.translation {
        println!();
        println!(
            "[{} -> {}]",
            translation.source_name, translation.destination_name
        );
        println!("{}", translation.text);
    }
    Ok(())
}

async fn download(state: &AppState, code: &str) -> anyhow::Result<()> {
    let config = state.config();
    let cancel = CancellationToken::new();

    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let downloader = TessdataDownloader::new(&config.ocr.tessdata_path);
    let path = downloader
        .download(code, &cancel, |progress| match progress.percent() {
            Some(percent) => eprint!("\r{code}: {percent}%"),
            None => eprint!("\r{code}: {} bytes", progress.downloaded),
        })
        .await;
    eprintln!();

    println!("{}", path?.display());
    Ok(())
}

fn languages(state: &AppState) {
    let config = state.config();

    match TesseractEngine::from_config(&config.ocr).version() {
        Ok(version) => println!("{version}"),
        Err(e) => tracing::warn!("Could not query the OCR engine: {e}"),
    }

    for code in installed_languages(&PathBuf::from(&config.ocr.tessdata_path)) {
        let name = tesseract_language_name(&code).unwrap_or("unknown");
        println!("{code}\t{name}");
    }
}

async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    let controller = AppController::new(ChannelSet::new());
    let sink = Arc::new(DesktopSink::with_display(controller.app_to_ui_sender()));
    let orchestrator = build_orchestrator(state, sink);

    let mut tasks = controller.spawn_tasks(orchestrator);

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
        }
        Some(result) = tasks.join_next() => {
            match result {
                Ok(Ok(())) => tracing::info!("Task exited, shutting down"),
                Ok(Err(e)) => tracing::error!("Task failed: {e:#}"),
                Err(e) => tracing::error!("Task panicked: {e}"),
            }
        }
    }

    controller.shutdown();
    while let Some(result) = tasks.join_next().await {
        if let Ok(Err(e)) = result {
            tracing::warn!("Task ended with error during shutdown: {e:#}");
        }
    }
    Ok(())
}
