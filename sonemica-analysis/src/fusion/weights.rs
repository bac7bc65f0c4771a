//! Valence fusion weights

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use sonemica_common::config::FusionConfig;

/// Allowed deviation of `music_valence + lyrics_valence` from 1
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Weights applied when both valence signals are present
///
/// `valence = music_valence·Wm + lyrics_valence·Wl`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    music_valence: f64,
    lyrics_valence: f64,
}

impl FusionWeights {
    /// Validated weights
    ///
    /// # Errors
    /// `InvalidWeights` unless both weights are finite, within [0, 1], and sum to 1.
    pub fn new(music_valence: f64, lyrics_valence: f64) -> Result<Self> {
        for (name, weight) in [("music_valence", music_valence), ("lyrics_valence", lyrics_valence)] {
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(AnalysisError::InvalidWeights(format!(
                    "{} = {} is outside [0, 1]",
                    name, weight
                )));
            }
        }

        let sum = music_valence + lyrics_valence;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(AnalysisError::InvalidWeights(format!(
                "weights sum to {}, expected 1",
                sum
            )));
        }

        Ok(Self {
            music_valence,
            lyrics_valence,
        })
    }

    /// Weights taken as given, without range or sum checks
    pub fn unchecked(music_valence: f64, lyrics_valence: f64) -> Self {
        Self {
            music_valence,
            lyrics_valence,
        }
    }

    /// Validated weights from the `[fusion]` config section
    pub fn from_config(config: &FusionConfig) -> Result<Self> {
        Self::new(config.music_valence, config.lyrics_valence)
    }

    pub fn music_valence(&self) -> f64 {
        self.music_valence
    }

    pub fn lyrics_valence(&self) -> f64 {
        self.lyrics_valence
    }

    /// Weighted combination of both valence signals
    pub fn fuse(&self, music_valence: f64, lyrics_valence: f64) -> f64 {
        music_valence * self.music_valence + lyrics_valence * self.lyrics_valence
    }
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            music_valence: 0.6,
            lyrics_valence: 0.4,
        }
    }
}
