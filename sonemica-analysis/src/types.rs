//! Core Types and Trait Definitions for sonemica-analysis
//!
//! Defines the record shapes exchanged with collaborators and the capability traits
//! the pipeline depends on:
//! - **SentimentClassifier:** lyric text → distribution over 4 emotion labels
//! - **ReferenceDataProvider:** track identities → audio feature rows and lyric rows
//!
//! Both traits are object-safe so the pipeline can hold `Arc<dyn ...>` handles and tests
//! can substitute deterministic stubs.

use crate::error::{AnalysisError, Result};
use crate::matching::SongKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Track identity
// ============================================================================

/// Loosely-identified track (title + artist)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackIdentity {
    pub title: String,
    pub artist: String,
}

impl TrackIdentity {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }

    /// Normalized join key for this identity
    pub fn song_key(&self) -> SongKey {
        SongKey::new(&self.title, &self.artist)
    }
}

/// Recently played track as returned by the music service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentTrack {
    /// Track name
    pub name: String,
    /// Credited artists, primary artist first
    #[serde(default)]
    pub artists: Vec<String>,
}

impl From<&RecentTrack> for TrackIdentity {
    /// Uses the primary artist only; a track without artists gets an empty artist.
    fn from(track: &RecentTrack) -> Self {
        TrackIdentity::new(
            track.name.clone(),
            track.artists.first().cloned().unwrap_or_default(),
        )
    }
}

// ============================================================================
// Audio features
// ============================================================================

/// Audio feature row as delivered by the reference-data provider
///
/// All columns are optional at this layer. Unknown columns (e.g. `Length`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatureRow {
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Artist", default)]
    pub artist: Option<String>,
    #[serde(rename = "Energy", default)]
    pub energy: Option<f64>,
    #[serde(rename = "Danceability", default)]
    pub danceability: Option<f64>,
    #[serde(rename = "Loudness", default)]
    pub loudness: Option<f64>,
    #[serde(rename = "Liveness", default)]
    pub liveness: Option<f64>,
    #[serde(rename = "Valence", default)]
    pub valence: Option<f64>,
    #[serde(rename = "Acousticness", default)]
    pub acousticness: Option<f64>,
    #[serde(rename = "Speechiness", default)]
    pub speechiness: Option<f64>,
    #[serde(rename = "Popularity", default)]
    pub popularity: Option<f64>,
}

impl AudioFeatureRow {
    /// Identity of this row, `None` when title or artist is missing or blank
    pub fn identity(&self) -> Option<TrackIdentity> {
        identity_of(self.title.as_deref(), self.artist.as_deref())
    }

    /// Validate the numeric fields required by the affect computation
    ///
    /// # Errors
    /// `MalformedRecord` when Energy, Loudness or Valence is missing or non-finite.
    pub fn validate(&self) -> Result<AudioFeatureRecord> {
        let title = self.title.clone().unwrap_or_default();
        let artist = self.artist.clone().unwrap_or_default();

        let require = |value: Option<f64>, field: &'static str| -> Result<f64> {
            match value {
                Some(v) if v.is_finite() => Ok(v),
                _ => Err(AnalysisError::MalformedRecord {
                    title: title.clone(),
                    artist: artist.clone(),
                    field,
                }),
            }
        };

        let energy = require(self.energy, "Energy")?;
        let loudness = require(self.loudness, "Loudness")?;
        let valence = require(self.valence, "Valence")?;

        Ok(AudioFeatureRecord {
            title: title.clone(),
            artist: artist.clone(),
            energy,
            loudness,
            valence,
            danceability: self.danceability,
            liveness: self.liveness,
            acousticness: self.acousticness,
            speechiness: self.speechiness,
            popularity: self.popularity,
        })
    }
}

/// Validated audio feature record
///
/// Energy, Danceability, Valence, Acousticness, Speechiness and Popularity are on a
/// 0-100 scale; Loudness is in dB, roughly -60..0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatureRecord {
    pub title: String,
    pub artist: String,
    pub energy: f64,
    pub loudness: f64,
    pub valence: f64,
    pub danceability: Option<f64>,
    pub liveness: Option<f64>,
    pub acousticness: Option<f64>,
    pub speechiness: Option<f64>,
    pub popularity: Option<f64>,
}

// ============================================================================
// Lyrics and sentiment
// ============================================================================

/// Lyric row as delivered by the reference-data provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LyricsRow {
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Artist", default)]
    pub artist: Option<String>,
    #[serde(rename = "Lyrics", default)]
    pub lyrics: Option<String>,
}

impl LyricsRow {
    /// Identity of this row, `None` when title or artist is missing or blank
    pub fn identity(&self) -> Option<TrackIdentity> {
        identity_of(self.title.as_deref(), self.artist.as_deref())
    }
}

/// Emotion labels produced by the classifier, in canonical order
pub const EMOTION_LABELS: [&str; 4] = ["anger", "joy", "optimism", "sadness"];

/// Probability distribution over the four emotion labels
///
/// Keys missing from the classifier output deserialize to 0 so every estimator stays total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionDistribution {
    pub anger: f64,
    pub joy: f64,
    pub optimism: f64,
    pub sadness: f64,
}

impl EmotionDistribution {
    pub fn new(anger: f64, joy: f64, optimism: f64, sadness: f64) -> Self {
        Self {
            anger,
            joy,
            optimism,
            sadness,
        }
    }

    /// Probability for a label, `None` for unknown labels
    pub fn get(&self, label: &str) -> Option<f64> {
        match label {
            "anger" => Some(self.anger),
            "joy" => Some(self.joy),
            "optimism" => Some(self.optimism),
            "sadness" => Some(self.sadness),
            _ => None,
        }
    }

    /// Set probability for a label; returns false for unknown labels
    pub fn set(&mut self, label: &str, value: f64) -> bool {
        match label {
            "anger" => self.anger = value,
            "joy" => self.joy = value,
            "optimism" => self.optimism = value,
            "sadness" => self.sadness = value,
            _ => return false,
        }
        true
    }

    /// Highest-probability label; ties resolve to the first label in [`EMOTION_LABELS`]
    pub fn dominant(&self) -> &'static str {
        let mut best = EMOTION_LABELS[0];
        let mut best_value = self.anger;
        for label in &EMOTION_LABELS[1..] {
            let value = self.get(label).unwrap_or(0.0);
            if value > best_value {
                best = label;
                best_value = value;
            }
        }
        best
    }

    /// Component-wise mean, `None` for an empty iterator
    pub fn mean<'a, I>(distributions: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a EmotionDistribution>,
    {
        let mut sum = EmotionDistribution::default();
        let mut count = 0usize;
        for d in distributions {
            sum.anger += d.anger;
            sum.joy += d.joy;
            sum.optimism += d.optimism;
            sum.sadness += d.sadness;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        let n = count as f64;
        Some(EmotionDistribution::new(
            sum.anger / n,
            sum.joy / n,
            sum.optimism / n,
            sum.sadness / n,
        ))
    }
}

/// Classified lyrics for one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub title: String,
    pub artist: String,
    pub distribution: EmotionDistribution,
}

impl SentimentRecord {
    pub fn identity(&self) -> Option<TrackIdentity> {
        identity_of(Some(&self.title), Some(&self.artist))
    }
}

// ============================================================================
// Fused output
// ============================================================================

/// Which valence signals contributed to a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Both,
    AudioOnly,
    LyricsOnly,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Both => write!(f, "both"),
            DataSource::AudioOnly => write!(f, "audio_only"),
            DataSource::LyricsOnly => write!(f, "lyrics_only"),
        }
    }
}

/// One fused track
///
/// `valence` and `arousal` are always in [0, 100]; at least one of `music_valence` and
/// `lyrics_valence` is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedSong {
    pub title: String,
    pub artist: String,
    pub valence: f64,
    pub arousal: f64,
    pub music_valence: Option<f64>,
    pub lyrics_valence: Option<f64>,
    pub energy: Option<f64>,
    pub loudness: Option<f64>,
    pub data_source: DataSource,
    pub sentiment_scores: Option<SentimentRecord>,
}

// ============================================================================
// Affect quadrants
// ============================================================================

/// Valence/arousal midpoint separating the quadrants
pub const QUADRANT_MIDPOINT: f64 = 50.0;

/// Region of the valence-arousal plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    HighValenceHighArousal,
    LowValenceHighArousal,
    LowValenceLowArousal,
    HighValenceLowArousal,
}

impl Quadrant {
    /// All quadrants in reporting order
    pub const ALL: [Quadrant; 4] = [
        Quadrant::HighValenceHighArousal,
        Quadrant::LowValenceHighArousal,
        Quadrant::LowValenceLowArousal,
        Quadrant::HighValenceLowArousal,
    ];

    /// Classify a point; the midpoint itself counts as "high" on both axes
    pub fn classify(valence: f64, arousal: f64) -> Self {
        match (valence >= QUADRANT_MIDPOINT, arousal >= QUADRANT_MIDPOINT) {
            (true, true) => Quadrant::HighValenceHighArousal,
            (false, true) => Quadrant::LowValenceHighArousal,
            (false, false) => Quadrant::LowValenceLowArousal,
            (true, false) => Quadrant::HighValenceLowArousal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Quadrant::HighValenceHighArousal => "high_valence_high_arousal",
            Quadrant::LowValenceHighArousal => "low_valence_high_arousal",
            Quadrant::LowValenceLowArousal => "low_valence_low_arousal",
            Quadrant::HighValenceLowArousal => "high_valence_low_arousal",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Quadrant::HighValenceHighArousal => "Joy/Excitement",
            Quadrant::LowValenceHighArousal => "Tension/Anxiety",
            Quadrant::LowValenceLowArousal => "Sadness/Melancholy",
            Quadrant::HighValenceLowArousal => "Calm/Peace",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Quadrant::HighValenceHighArousal => "Energetic and positive state",
            Quadrant::LowValenceHighArousal => "Activated but negative state",
            Quadrant::LowValenceLowArousal => "Deactivated and negative state",
            Quadrant::HighValenceLowArousal => "Relaxed and positive state",
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emotional state of a point, as reported for the session centroid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalState {
    pub category: Quadrant,
    pub label: String,
    pub description: String,
}

impl From<Quadrant> for EmotionalState {
    fn from(quadrant: Quadrant) -> Self {
        Self {
            category: quadrant,
            label: quadrant.label().to_string(),
            description: quadrant.description().to_string(),
        }
    }
}

// ============================================================================
// Collaborator capabilities
// ============================================================================

/// Opaque lyric sentiment model
///
/// # Example
/// ```rust,ignore
/// use sonemica_analysis::types::{SentimentClassifier, EmotionDistribution, ClassifierError};
///
/// struct Neutral;
///
/// #[async_trait::async_trait]
/// impl SentimentClassifier for Neutral {
///     fn name(&self) -> &'static str { "Neutral" }
///
///     async fn classify(&self, _text: &str) -> Result<EmotionDistribution, ClassifierError> {
///         Ok(EmotionDistribution::new(0.25, 0.25, 0.25, 0.25))
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Classifier name for logging
    fn name(&self) -> &'static str;

    /// Classify lyric text into a distribution over [`EMOTION_LABELS`]
    async fn classify(&self, text: &str) -> std::result::Result<EmotionDistribution, ClassifierError>;
}

/// Reference dataset access
///
/// Implementations join the requested identities against their tables by exact
/// title + artist equality; the core applies its own normalization afterwards.
#[async_trait::async_trait]
pub trait ReferenceDataProvider: Send + Sync {
    /// Audio feature rows for the given tracks
    async fn audio_features_for(
        &self,
        tracks: &[TrackIdentity],
    ) -> std::result::Result<Vec<AudioFeatureRow>, ProviderError>;

    /// Lyric rows for the given tracks
    async fn lyrics_for(
        &self,
        tracks: &[TrackIdentity],
    ) -> std::result::Result<Vec<LyricsRow>, ProviderError>;
}

/// Sentiment classifier error
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Classifier service returned an error
    #[error("API error: {0}")]
    Api(String),

    /// Failed to parse classifier output
    #[error("Parse error: {0}")]
    Parse(String),

    /// Classifier not configured or unavailable
    #[error("Classifier not available: {0}")]
    NotAvailable(String),
}

/// Reference data provider error
#[derive(Debug, Error)]
pub enum ProviderError {
    /// I/O error (dataset read)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse dataset
    #[error("Parse error: {0}")]
    Parse(String),

    /// Dataset not loaded
    #[error("Dataset not available: {0}")]
    NotAvailable(String),
}

fn identity_of(title: Option<&str>, artist: Option<&str>) -> Option<TrackIdentity> {
    match (title, artist) {
        (Some(t), Some(a)) if !t.trim().is_empty() && !a.trim().is_empty() => {
            Some(TrackIdentity::new(t, a))
        }
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
