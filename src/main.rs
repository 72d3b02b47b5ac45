use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use futures::{Stream, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use waav_tts_stream::{
    AppConfig, DeepgramTTS, SpeakOptions, TtsService,
    core::tts::{DeepgramModelsClient, VoiceCatalog},
};

/// WaaV TTS Stream - sentence-by-sentence text-to-speech
#[derive(Parser, Debug)]
#[command(name = "waav-tts-stream")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synthesize TEXT in one request and write the audio to a file
    Speak {
        text: String,

        #[arg(short = 'v', long = "voice")]
        voice: Option<String>,

        #[arg(short = 'l', long = "language")]
        language: Option<String>,

        /// Output file (defaults to speech.<format>)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },

    /// Read text from stdin line by line and synthesize it sentence by sentence
    Stream {
        #[arg(short = 'v', long = "voice")]
        voice: Option<String>,

        #[arg(short = 'l', long = "language")]
        language: Option<String>,

        /// Write all fragments, concatenated, to this file
        #[arg(short = 'o', long = "output", conflicts_with = "split_dir")]
        output: Option<PathBuf>,

        /// Write one file per fragment into this directory
        #[arg(long = "split-dir")]
        split_dir: Option<PathBuf>,
    },

    /// List supported languages, or the voices for one language
    Voices {
        #[arg(short = 'l', long = "language")]
        language: Option<String>,
    },

    /// Check that the configured API key is accepted
    Verify,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if !config.has_api_key() {
        bail!("No Deepgram API key configured (set DEEPGRAM_API_KEY or deepgram.api_key)");
    }

    match cli.command {
        Commands::Speak {
            text,
            voice,
            language,
            output,
        } => {
            let service = service_with_catalog(&config, language.is_some()).await?;
            let options = SpeakOptions {
                voice,
                language,
                format: None,
            };
            let (format, audio) = service.speak(&text, &options).await?;
            let path =
                output.unwrap_or_else(|| PathBuf::from(format!("speech.{}", format.extension())));
            tokio::fs::write(&path, &audio)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(bytes = audio.len(), path = %path.display(), "Wrote synthesized speech");
        }

        Commands::Stream {
            voice,
            language,
            output,
            split_dir,
        } => {
            let service = service_with_catalog(&config, language.is_some()).await?;
            let options = SpeakOptions {
                voice,
                language,
                format: None,
            };
            let output = output.unwrap_or_else(|| {
                PathBuf::from(format!("stream.{}", config.pipeline.audio_format.extension()))
            });
            run_stream(&service, &options, output, split_dir).await?;
        }

        Commands::Voices { language } => {
            let catalog = fetch_catalog(&config).await?;
            match language {
                Some(language) => match catalog.voices_for_language(&language) {
                    Some(voices) => {
                        for (canonical_name, name) in voices {
                            println!("{canonical_name}\t{name}");
                        }
                    }
                    None => bail!("No voices available for language '{language}'"),
                },
                None => {
                    for language in catalog.supported_languages() {
                        println!("{language}");
                    }
                }
            }
        }

        Commands::Verify => {
            DeepgramTTS::new(config.deepgram.clone())?
                .verify_api_key()
                .await
                .context("API key verification failed")?;
            println!("API key OK");
        }
    }

    Ok(())
}

async fn fetch_catalog(config: &AppConfig) -> anyhow::Result<VoiceCatalog> {
    let client = DeepgramModelsClient::new(&config.deepgram)?;
    client
        .fetch_catalog()
        .await
        .context("Failed to fetch Deepgram models")
}

async fn service_with_catalog(
    config: &AppConfig,
    need_catalog: bool,
) -> anyhow::Result<TtsService> {
    let service = TtsService::deepgram(config)?;
    if need_catalog {
        Ok(service.with_catalog(fetch_catalog(config).await?))
    } else {
        Ok(service)
    }
}

/// Lines of `reader`, each with its newline, ending at EOF or on the first
/// read error.
fn text_lines<R>(reader: R) -> impl Stream<Item = String> + Send + 'static
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async_stream::stream! {
        let mut lines = reader.lines();
        loop {
            match lines.next_line().await {
                // keep words on adjacent lines apart
                Ok(Some(line)) => {
                    yield format!("{line}\n");
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Failed to read stdin, ending text stream");
                    break;
                }
            }
        }
    }
}

/// Where streamed fragments are written.
enum FragmentSink {
    Combined(tokio::fs::File),
    Split(PathBuf),
}

async fn run_stream(
    service: &TtsService,
    options: &SpeakOptions,
    output: PathBuf,
    split_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let lines = text_lines(BufReader::new(tokio::io::stdin()));

    let mut sink = match split_dir {
        Some(dir) => {
            tokio::fs::create_dir_all(&dir)
                .await
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            FragmentSink::Split(dir)
        }
        None => FragmentSink::Combined(
            tokio::fs::File::create(&output)
                .await
                .with_context(|| format!("Failed to create {}", output.display()))?,
        ),
    };

    let mut audio = service.stream(lines, options)?;

    while let Some(fragment) = audio.next().await {
        match &mut sink {
            FragmentSink::Combined(file) => file.write_all(&fragment.data).await?,
            FragmentSink::Split(dir) => {
                let path = dir.join(format!(
                    "fragment_{:04}.{}",
                    fragment.sequence,
                    fragment.format.extension()
                ));
                tokio::fs::write(&path, &fragment.data)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
        }
        info!(sequence = fragment.sequence, bytes = fragment.len(), "Wrote fragment");
    }

    if let FragmentSink::Combined(mut file) = sink {
        file.flush().await?;
    }

    let summary = audio.summary().unwrap_or_default();
    info!(
        sentences = summary.sentences,
        fragments = summary.fragments,
        failures = summary.failures,
        "Stream finished"
    );
    Ok(())
}
