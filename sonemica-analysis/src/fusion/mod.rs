//! Fusion Engine
//!
//! Merges per-track audio valence and lyric valence into a single valence/arousal point,
//! choosing a data-source mode (both / audio-only / lyrics-only) per track.

pub mod engine;
pub mod weights;

pub use engine::{AnalysisResult, FusionEngine, Stats};
pub use weights::{FusionWeights, WEIGHT_SUM_TOLERANCE};
