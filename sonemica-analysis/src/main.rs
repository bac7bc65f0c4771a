//! sonemica-analyze - listening session affect analysis
//!
//! Subcommands:
//! - `process`: fuse pre-classified rows and print the analysis + diversity as JSON
//! - `session`: analyze recently played tracks against the reference tables
//! - `init-config`: write a starter TOML config
//!
//! Logs go to stderr (or `[logging] file`); stdout carries only JSON.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sonemica_analysis::classifier::HttpSentimentClassifier;
use sonemica_analysis::reference::ReferenceTables;
use sonemica_analysis::types::{AudioFeatureRow, RecentTrack, SentimentRecord};
use sonemica_analysis::{AnalysisPipeline, AnalysisResult, DiversityResult, DiversityTier, FusionEngine};
use sonemica_common::config::{self, ConfigResolver, LoggingConfig, TomlConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for sonemica-analyze
#[derive(Parser, Debug)]
#[command(name = "sonemica-analyze")]
#[command(about = "Valence/arousal analysis of a listening session")]
#[command(version)]
struct Args {
    /// TOML config file (falls back to $SONEMICA_CONFIG, then the platform config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fuse audio feature rows with classified sentiment records
    Process {
        /// JSON array of audio feature rows
        #[arg(long)]
        audio: PathBuf,

        /// JSON array of sentiment records
        #[arg(long)]
        sentiments: PathBuf,

        /// Music valence weight (overrides config)
        #[arg(long)]
        music_weight: Option<f64>,

        /// Lyrics valence weight (overrides config)
        #[arg(long)]
        lyrics_weight: Option<f64>,
    },

    /// Analyze recently played tracks end to end
    Session {
        /// JSON array of recently played tracks
        #[arg(long)]
        tracks: PathBuf,

        /// Audio feature table (overrides `[data] audio_features_path`)
        #[arg(long)]
        audio_features: Option<PathBuf>,

        /// Lyrics table (overrides `[data] lyrics_path`)
        #[arg(long)]
        lyrics: Option<PathBuf>,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Destination path
        path: PathBuf,
    },
}

/// `process` output
#[derive(Serialize)]
struct ProcessOutput {
    valence_arousal: AnalysisResult,
    diversity: DiversityResult,
    diversity_tier: DiversityTier,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logging is configured from the file, so the load is reported once it is up
    let (toml_config, config_source) = ConfigResolver::new()
        .load_with_source(args.config.as_deref())
        .context("Failed to load configuration")?;

    init_logging(&toml_config.logging)?;
    config_source.log();

    match args.command {
        Command::Process {
            audio,
            sentiments,
            music_weight,
            lyrics_weight,
        } => {
            let audio_rows: Vec<AudioFeatureRow> = read_json(&audio)?;
            let sentiment_rows: Vec<SentimentRecord> = read_json(&sentiments)?;

            let mut fusion_config = toml_config.clone();
            if let Some(weight) = music_weight {
                fusion_config.fusion.music_valence = weight;
            }
            if let Some(weight) = lyrics_weight {
                fusion_config.fusion.lyrics_valence = weight;
            }
            let engine = FusionEngine::from_config(&fusion_config)?;

            let valence_arousal = engine.process_songs(&audio_rows, &sentiment_rows)?;
            let diversity = sonemica_analysis::compute_diversity(&valence_arousal)?;
            let diversity_tier = diversity.tier();

            print_json(&ProcessOutput {
                valence_arousal,
                diversity,
                diversity_tier,
            })
        }

        Command::Session {
            tracks,
            audio_features,
            lyrics,
        } => {
            let recent: Vec<RecentTrack> = read_json(&tracks)?;

            let audio_path = audio_features.or_else(|| toml_config.data.audio_features_path.clone());
            let lyrics_path = lyrics.or_else(|| toml_config.data.lyrics_path.clone());
            let tables = ReferenceTables::load(audio_path.as_deref(), lyrics_path.as_deref())
                .context("Failed to load reference tables")?;

            let classifier = HttpSentimentClassifier::from_config(&toml_config.classifier)
                .context("Failed to create sentiment classifier")?;
            info!(endpoint = classifier.endpoint(), "Sentiment classifier ready");

            let pipeline =
                AnalysisPipeline::from_config(Arc::new(tables), Arc::new(classifier), &toml_config)?;
            let report = pipeline.run(&recent).await?;

            print_json(&report)
        }

        Command::InitConfig { path } => {
            config::write_toml_config(&TomlConfig::default(), &path)
                .with_context(|| format!("Failed to write config to {}", path.display()))?;
            info!(path = %path.display(), "Default configuration written");
            Ok(())
        }
    }
}

/// `RUST_LOG` when set, otherwise `[logging] level`; stderr unless `[logging] file` is set
fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("Invalid log level")?;

    let (file_layer, stderr_layer) = match &logging.file {
        Some(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(layer), None)
        }
        None => (
            None,
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
