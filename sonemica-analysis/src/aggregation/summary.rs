//! Aggregator
//!
//! Centroid and population standard deviation of valence and arousal, the centroid's
//! emotional state, and the per-quadrant distribution of songs.

use super::quadrant_counts;
use crate::error::{AnalysisError, Result};
use crate::types::{EmotionalState, ProcessedSong, Quadrant};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Mean point of the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub valence: f64,
    pub arousal: f64,
    pub emotional_state: EmotionalState,
}

/// Population standard deviations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dispersion {
    pub valence_std: f64,
    pub arousal_std: f64,
}

/// Songs falling in one quadrant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuadrantShare {
    pub count: usize,
    /// Share of all songs, 0-100, rounded to 2 decimals
    pub percentage: f64,
    pub label: String,
}

/// Session summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_songs: usize,
    pub centroid: Centroid,
    pub dispersion: Dispersion,
    /// Independent of the centroid's quadrant
    pub quadrant_distribution: BTreeMap<Quadrant, QuadrantShare>,
}

/// Aggregator
pub struct Aggregator;

impl Aggregator {
    /// Summarize a non-empty song set
    ///
    /// # Errors
    /// `EmptyInput` for an empty slice.
    pub fn summarize(songs: &[ProcessedSong]) -> Result<Summary> {
        if songs.is_empty() {
            return Err(AnalysisError::EmptyInput(
                "cannot summarize an empty song set".to_string(),
            ));
        }

        let (valence, valence_std) = mean_and_std(songs.iter().map(|s| s.valence));
        let (arousal, arousal_std) = mean_and_std(songs.iter().map(|s| s.arousal));
        let quadrant = Quadrant::classify(valence, arousal);

        let total = songs.len();
        let quadrant_distribution = quadrant_counts(songs)
            .into_iter()
            .map(|(q, count)| {
                let share = QuadrantShare {
                    count,
                    percentage: round2(count as f64 / total as f64 * 100.0),
                    label: q.label().to_string(),
                };
                (q, share)
            })
            .collect();

        debug!(
            total_songs = total,
            valence = valence,
            arousal = arousal,
            quadrant = %quadrant,
            "Session summary computed"
        );

        Ok(Summary {
            total_songs: total,
            centroid: Centroid {
                valence,
                arousal,
                emotional_state: EmotionalState::from(quadrant),
            },
            dispersion: Dispersion {
                valence_std,
                arousal_std,
            },
            quadrant_distribution,
        })
    }
}

/// Arithmetic mean and population standard deviation; caller guarantees a non-empty input
fn mean_and_std(values: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let n = values.clone().count() as f64;
    let mean = values.clone().sum::<f64>() / n;
    let variance = values.map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
