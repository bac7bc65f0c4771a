//! Diversity Scorer
//!
//! Normalized Shannon entropy of the songs' quadrant proportions:
//! `H = -Σ p_i·ln(p_i)` over non-empty quadrants, `H_norm = H / ln(4)`.
//! 0 means every song sits in one quadrant; 1 means a perfectly even spread.

use super::quadrant_counts;
use crate::error::{AnalysisError, Result};
use crate::types::{ProcessedSong, Quadrant};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Shannon diversity of a song set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiversityResult {
    /// Raw entropy in nats, >= 0
    pub shannon_raw: f64,
    /// Entropy divided by ln(4), in [0, 1]
    pub normalized: f64,
    pub category_counts: BTreeMap<Quadrant, usize>,
}

impl DiversityResult {
    pub fn tier(&self) -> DiversityTier {
        DiversityTier::from_normalized(self.normalized)
    }
}

/// Qualitative diversity band for narrative text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiversityTier {
    /// [0.85, 1]
    VeryHigh,
    /// [0.65, 0.85)
    High,
    /// [0.40, 0.65)
    Moderate,
    /// [0, 0.40)
    Low,
}

impl DiversityTier {
    pub fn from_normalized(normalized: f64) -> Self {
        if normalized >= 0.85 {
            DiversityTier::VeryHigh
        } else if normalized >= 0.65 {
            DiversityTier::High
        } else if normalized >= 0.40 {
            DiversityTier::Moderate
        } else {
            DiversityTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DiversityTier::VeryHigh => "very_high",
            DiversityTier::High => "high",
            DiversityTier::Moderate => "moderate",
            DiversityTier::Low => "low",
        }
    }
}

impl fmt::Display for DiversityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diversity Scorer
pub struct DiversityScorer;

impl DiversityScorer {
    /// Score a non-empty song set
    ///
    /// # Errors
    /// `EmptyInput` for an empty slice.
    pub fn score(songs: &[ProcessedSong]) -> Result<DiversityResult> {
        if songs.is_empty() {
            return Err(AnalysisError::EmptyInput(
                "cannot score diversity of an empty song set".to_string(),
            ));
        }

        let category_counts = quadrant_counts(songs);
        let total = songs.len() as f64;

        let entropy: f64 = category_counts
            .values()
            .filter(|&&count| count > 0)
            .map(|&count| {
                let p = count as f64 / total;
                -p * p.ln()
            })
            .sum();
        // A single occupied quadrant yields -0.0
        let shannon_raw = if entropy > 0.0 { entropy } else { 0.0 };
        let normalized = (shannon_raw / (Quadrant::ALL.len() as f64).ln()).min(1.0);

        debug!(
            songs = songs.len(),
            shannon_raw = shannon_raw,
            normalized = normalized,
            "Diversity computed"
        );

        Ok(DiversityResult {
            shannon_raw,
            normalized,
            category_counts,
        })
    }
}
