use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use secrecy::ExposeSecret;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use chat_relay::voice::{OpenAiSpeech, OpenAiTranscription, SpeechSynthesizer, Transcriber};
use chat_relay::{BackendClient, Config, InboundRelay, TelegramChannel};

/// Capacity of the queue between the poller and the relay
const EVENT_QUEUE_CAPACITY: usize = 100;

/// chat-relay - relay Telegram text and voice messages to an HTTP backend
#[derive(Parser)]
#[command(name = "chat-relay", version, about)]
struct Cli {
    /// Path to the YAML config file
    #[arg(short, long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Validate configuration and the Telegram bot token
    Check,
    /// Synthesize text into the outgoing audio directory
    Synthesize {
        /// Text to speak
        text: String,
    },
    /// Transcribe a local audio file
    Transcribe {
        /// Audio file to transcribe
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,chat_relay=info",
        1 => "info,chat_relay=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Arc::new(Config::load(cli.config.as_deref())?);
    tracing::debug!(?config, "loaded configuration");

    match cli.command {
        Some(Command::Check) => check(&config).await,
        Some(Command::Synthesize { text }) => synthesize(&config, &text).await,
        Some(Command::Transcribe { file }) => transcribe(&config, &file).await,
        None => serve(&config).await,
    }
}

/// Poll Telegram and relay every update until Ctrl-C
async fn serve(config: &Config) -> anyhow::Result<()> {
    let telegram = TelegramChannel::new(config.telegram_token.expose_secret().to_string());
    telegram.get_me().await?;

    let relay = Arc::new(build_relay(config, telegram.clone())?);

    let (tx, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
    let poller = telegram.start_polling(config.telegram.poll_interval, tx);

    tracing::info!(
        backend = %config.backend_endpoint,
        require_username = config.telegram.require_username,
        "relay ready"
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
        }
    };
    let handled = relay.serve(rx, shutdown).await;

    poller.abort();
    tracing::info!(handled, "relay stopped");
    Ok(())
}

fn build_relay(config: &Config, telegram: TelegramChannel) -> anyhow::Result<InboundRelay> {
    Ok(InboundRelay::new(
        config,
        Arc::new(telegram),
        Arc::new(BackendClient::new(config)),
        build_transcriber(config)?,
        build_synthesizer(config)?,
    ))
}

fn build_transcriber(config: &Config) -> anyhow::Result<Transcriber> {
    let provider = OpenAiTranscription::new(
        config.openai_api_key.expose_secret().to_string(),
        config.voice.transcription_model.clone(),
    )?;
    Ok(Transcriber::new(Arc::new(provider)))
}

fn build_synthesizer(config: &Config) -> anyhow::Result<SpeechSynthesizer> {
    let provider = OpenAiSpeech::new(config.openai_api_key.expose_secret().to_string())?;
    Ok(SpeechSynthesizer::new(Arc::new(provider), &config.voice))
}

/// Validate configuration and credentials
async fn check(config: &Config) -> anyhow::Result<()> {
    let telegram = TelegramChannel::new(config.telegram_token.expose_secret().to_string());
    telegram.get_me().await?;

    println!("Telegram bot token: ok");
    println!("Backend endpoint:   {}", config.backend_endpoint);
    println!("Inbound audio:      {}", config.voice.store_dir.display());
    println!("Outgoing audio:     {}", config.voice.outgoing_dir.display());
    println!(
        "Voice:              {} / {}",
        config.voice.voice_model, config.voice.voice_name
    );
    Ok(())
}

/// Synthesize text once and print the artifact path
async fn synthesize(config: &Config, text: &str) -> anyhow::Result<()> {
    let synthesizer = build_synthesizer(config)?;
    let artifact = synthesizer.synthesize(text).await?;

    let origin = if artifact.from_cache { "cached" } else { "new" };
    println!("{} ({origin})", artifact.path.display());
    Ok(())
}

/// Transcribe a local file and print the transcript
async fn transcribe(config: &Config, file: &std::path::Path) -> anyhow::Result<()> {
    let transcriber = build_transcriber(config)?;
    let transcript = transcriber.transcribe(file).await?;
    println!("{transcript}");
    Ok(())
}
