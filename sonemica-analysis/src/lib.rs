//! sonemica-analysis library
//!
//! Record-linkage and affect-fusion core: joins recently played tracks against audio
//! feature and lyric tables, places every track in valence/arousal space, and summarizes
//! the session (centroid, dispersion, quadrant distribution, Shannon diversity).

pub mod affect;
pub mod aggregation;
pub mod classifier;
pub mod error;
pub mod fusion;
pub mod lyrics;
pub mod matching;
pub mod profile;
pub mod reference;
pub mod types;
pub mod workflow;

pub use crate::aggregation::{DiversityResult, DiversityScorer, DiversityTier, Summary};
pub use crate::error::{AnalysisError, Result};
pub use crate::fusion::{AnalysisResult, FusionEngine, FusionWeights, Stats};
pub use crate::matching::{IdentityMatcher, SongKey};
pub use crate::workflow::{AnalysisPipeline, SessionReport};

use crate::types::{AudioFeatureRow, SentimentRecord};

/// Fuse audio feature rows and sentiment records, then summarize
///
/// Exact-key join only; build a [`FusionEngine`] directly for the fuzzy sentiment join.
///
/// # Errors
/// `EmptyInput` when no track survives the join, `MalformedRecord` for an audio row
/// missing a required numeric field.
pub fn process_songs(
    audio_rows: &[AudioFeatureRow],
    sentiments: &[SentimentRecord],
    weights: FusionWeights,
) -> Result<AnalysisResult> {
    FusionEngine::new(weights).process_songs(audio_rows, sentiments)
}

/// Shannon diversity of an analysis result's songs
pub fn compute_diversity(result: &AnalysisResult) -> Result<DiversityResult> {
    DiversityScorer::score(&result.songs)
}
