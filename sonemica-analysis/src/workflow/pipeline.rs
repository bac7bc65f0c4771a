//! Analysis Pipeline
//!
//! Runs one listening session end to end.
//!
//! # Phases
//! - **Phase 1**: Truncate recent tracks to `max_tracks`, convert to identities
//! - **Phase 2**: Fetch audio feature rows and lyric rows (both requests concurrently)
//! - **Phase 3**: Normalize lyrics and classify them, `classify_concurrency` calls in flight
//! - **Phase 4**: Fusion + summary, then diversity
//! - **Phase 5**: Audio and lyric profiles
//!
//! # Error Handling
//! Collaborator failures and `EmptyInput` abort the run and are returned unchanged.
//!
//! # Example
//! ```rust,ignore
//! let pipeline = AnalysisPipeline::new(tables, classifier, FusionEngine::default());
//! let report = pipeline.run(&recent_tracks).await?;
//! ```

use super::SessionReport;
use crate::aggregation::DiversityScorer;
use crate::error::{AnalysisError, Result};
use crate::fusion::FusionEngine;
use crate::lyrics::normalize_lyrics;
use crate::profile::{AudioProfile, LyricsProfile};
use crate::types::{
    ClassifierError, RecentTrack, ReferenceDataProvider, SentimentClassifier, SentimentRecord,
    TrackIdentity,
};
use futures::stream::{self, StreamExt, TryStreamExt};
use sonemica_common::config::{PipelineConfig, TomlConfig};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Session analysis pipeline
pub struct AnalysisPipeline {
    provider: Arc<dyn ReferenceDataProvider>,
    classifier: Arc<dyn SentimentClassifier>,
    engine: FusionEngine,
    config: PipelineConfig,
}

impl AnalysisPipeline {
    /// Pipeline with default limits (50 tracks, 4 concurrent classifications)
    pub fn new(
        provider: Arc<dyn ReferenceDataProvider>,
        classifier: Arc<dyn SentimentClassifier>,
        engine: FusionEngine,
    ) -> Self {
        Self {
            provider,
            classifier,
            engine,
            config: PipelineConfig::default(),
        }
    }

    /// Override track and concurrency limits
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Pipeline configured from `[pipeline]`, `[fusion]` and `[matching]`
    pub fn from_config(
        provider: Arc<dyn ReferenceDataProvider>,
        classifier: Arc<dyn SentimentClassifier>,
        config: &TomlConfig,
    ) -> Result<Self> {
        let engine = FusionEngine::from_config(config)?;
        Ok(Self::new(provider, classifier, engine).with_config(config.pipeline.clone()))
    }

    /// Analyze a batch of recently played tracks
    pub async fn run(&self, recent_tracks: &[RecentTrack]) -> Result<SessionReport> {
        // Phase 1: identities
        if recent_tracks.is_empty() {
            return Err(AnalysisError::EmptyInput("no recently played tracks".to_string()));
        }

        let limit = self.config.max_tracks.max(1);
        if recent_tracks.len() > limit {
            warn!(
                received = recent_tracks.len(),
                max_tracks = limit,
                "Truncating recent tracks"
            );
        }
        let identities: Vec<TrackIdentity> = recent_tracks
            .iter()
            .take(limit)
            .map(TrackIdentity::from)
            .collect();
        let requested = identities.len();

        info!(tracks = requested, "Starting session analysis");

        // Phase 2: reference rows
        let (audio_rows, lyric_rows) = tokio::try_join!(
            self.provider.audio_features_for(&identities),
            self.provider.lyrics_for(&identities)
        )?;

        debug!(
            audio_rows = audio_rows.len(),
            lyric_rows = lyric_rows.len(),
            "Reference rows fetched"
        );

        // Phase 3: lyric sentiment
        let texts: Vec<(TrackIdentity, String)> = lyric_rows
            .iter()
            .filter_map(|row| {
                let identity = row.identity()?;
                let text = row.lyrics.as_deref().and_then(normalize_lyrics);
                if text.is_none() {
                    debug!(title = %identity.title, artist = %identity.artist, "No lyric text");
                }
                Some((identity, text?))
            })
            .collect();

        let sentiments = self.classify_all(texts).await?;

        // Phase 4: fusion, summary, diversity
        let valence_arousal = self.engine.process_songs(&audio_rows, &sentiments)?;
        let diversity = DiversityScorer::score(&valence_arousal.songs)?;
        let diversity_tier = diversity.tier();

        // Phase 5: profiles
        let audio_profile = AudioProfile::from_rows(&audio_rows, requested);
        let lyrics_profile = LyricsProfile::from_records(&sentiments, requested);

        info!(
            songs = valence_arousal.songs.len(),
            diversity = diversity.normalized,
            tier = %diversity_tier,
            "Session analysis complete"
        );

        Ok(SessionReport {
            valence_arousal,
            diversity,
            diversity_tier,
            audio_profile,
            lyrics_profile,
        })
    }

    /// Classify lyric texts with bounded concurrency, preserving input order
    async fn classify_all(&self, texts: Vec<(TrackIdentity, String)>) -> Result<Vec<SentimentRecord>> {
        let classifier = &self.classifier;
        let concurrency = self.config.classify_concurrency.max(1);

        debug!(
            texts = texts.len(),
            classifier = classifier.name(),
            concurrency = concurrency,
            "Classifying lyrics"
        );

        let records = stream::iter(texts.into_iter().map(|(identity, text)| async move {
            let distribution = classifier.classify(&text).await?;
            Ok::<_, ClassifierError>(SentimentRecord {
                title: identity.title,
                artist: identity.artist,
                distribution,
            })
        }))
        .buffered(concurrency)
        .try_collect::<Vec<_>>()
        .await?;

        Ok(records)
    }
}
