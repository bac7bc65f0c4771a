//! Session-level aggregates over fused (valence, arousal) points
//!
//! - [`Aggregator`]: centroid, dispersion, quadrant distribution
//! - [`DiversityScorer`]: normalized Shannon diversity over the same quadrants
//!
//! Both are independent of song order.

pub mod diversity;
pub mod summary;

pub use diversity::{DiversityResult, DiversityScorer, DiversityTier};
pub use summary::{Aggregator, Centroid, Dispersion, QuadrantShare, Summary};

use crate::types::{ProcessedSong, Quadrant};
use std::collections::BTreeMap;

/// Songs per quadrant; every quadrant is present, possibly with a zero count
pub fn quadrant_counts(songs: &[ProcessedSong]) -> BTreeMap<Quadrant, usize> {
    let mut counts: BTreeMap<Quadrant, usize> = Quadrant::ALL.iter().map(|q| (*q, 0)).collect();
    for song in songs {
        *counts
            .entry(Quadrant::classify(song.valence, song.arousal))
            .or_insert(0) += 1;
    }
    counts
}
