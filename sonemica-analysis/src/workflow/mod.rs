//! Session workflow
//!
//! Orchestrates a full analysis run: recent tracks → reference rows → lyric sentiment →
//! fusion → summary, diversity and profiles.

pub mod pipeline;

pub use pipeline::AnalysisPipeline;

use crate::aggregation::{DiversityResult, DiversityTier};
use crate::fusion::AnalysisResult;
use crate::profile::{AudioProfile, LyricsProfile};
use serde::{Deserialize, Serialize};

/// Everything produced for one listening session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub valence_arousal: AnalysisResult,
    pub diversity: DiversityResult,
    pub diversity_tier: DiversityTier,
    pub audio_profile: AudioProfile,
    pub lyrics_profile: LyricsProfile,
}
