//! Session audio and lyric profiles
//!
//! Plain averages over the rows that matched the session's tracks, reported next to the
//! valence/arousal analysis.

use crate::types::{AudioFeatureRow, EmotionDistribution, SentimentRecord};
use serde::{Deserialize, Serialize};

/// Mean audio features of the matched rows
///
/// A column with no values among the matched rows is omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub danceability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loudness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liveness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acousticness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speechiness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,
    pub tracks_matched: usize,
    pub tracks_requested: usize,
}

impl AudioProfile {
    pub fn from_rows(rows: &[AudioFeatureRow], tracks_requested: usize) -> Self {
        let column = |get: fn(&AudioFeatureRow) -> Option<f64>| mean(rows.iter().filter_map(get));

        Self {
            energy: column(|r| r.energy),
            danceability: column(|r| r.danceability),
            loudness: column(|r| r.loudness),
            liveness: column(|r| r.liveness),
            valence: column(|r| r.valence),
            acousticness: column(|r| r.acousticness),
            speechiness: column(|r| r.speechiness),
            popularity: column(|r| r.popularity),
            tracks_matched: rows.len(),
            tracks_requested,
        }
    }
}

/// Mean emotion distribution of the classified lyrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LyricsProfile {
    /// All zeros when nothing was classified
    pub distribution: EmotionDistribution,
    pub dominant_emotion: Option<String>,
    pub tracks_matched: usize,
    pub tracks_requested: usize,
}

impl LyricsProfile {
    pub fn from_records(records: &[SentimentRecord], tracks_requested: usize) -> Self {
        let mean = EmotionDistribution::mean(records.iter().map(|r| &r.distribution));

        Self {
            distribution: mean.unwrap_or_default(),
            dominant_emotion: mean.map(|d| d.dominant().to_string()),
            tracks_matched: records.len(),
            tracks_requested,
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
