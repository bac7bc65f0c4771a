//! Identity Matcher
//!
//! Matches a target [`SongKey`] against candidate records, exactly or fuzzily.
//!
//! # Fuzzy Strategy
//! 1. Compute the Ratcliff/Obershelp ratio between the target key and every candidate key
//! 2. Keep the candidate with the highest ratio
//! 3. Accept it only if `ratio >= threshold` (default 0.85)
//!
//! Candidates are scanned in ascending key order and only a strictly higher ratio
//! replaces the current best, so ties resolve to the lexicographically-first key no
//! matter how the caller ordered its collection.

use super::similarity::similarity_ratio;
use super::song_key::SongKey;
use crate::types::SentimentRecord;
use tracing::{debug, warn};

/// Default minimum similarity for a fuzzy match
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.85;

/// Accepted fuzzy match
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch<'a, T> {
    /// Matched candidate
    pub candidate: &'a T,
    /// Candidate key
    pub key: SongKey,
    /// Similarity ratio (>= threshold)
    pub ratio: f64,
}

/// Identity Matcher
///
/// Pure functions over caller-provided collections; holds only the fuzzy threshold.
#[derive(Debug, Clone)]
pub struct IdentityMatcher {
    /// Minimum similarity ratio for fuzzy acceptance
    threshold: f64,
}

impl IdentityMatcher {
    /// Create matcher with the default threshold (0.85)
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }

    /// Create matcher with custom threshold, clamped to [0, 1]
    ///
    /// A non-finite threshold falls back to [`DEFAULT_FUZZY_THRESHOLD`].
    pub fn with_threshold(threshold: f64) -> Self {
        if !threshold.is_finite() {
            warn!(
                threshold,
                default = DEFAULT_FUZZY_THRESHOLD,
                "Non-finite fuzzy threshold, using default"
            );
            return Self::new();
        }
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// First candidate whose key equals `target`
    pub fn exact_match<'a, T, F>(&self, target: &SongKey, candidates: &'a [T], key_of: F) -> Option<&'a T>
    where
        F: Fn(&T) -> SongKey,
    {
        candidates.iter().find(|&c| key_of(c) == *target)
    }

    /// Best candidate by similarity ratio, if it reaches the threshold
    pub fn fuzzy_match<'a, T, F>(
        &self,
        target: &SongKey,
        candidates: &'a [T],
        key_of: F,
    ) -> Option<FuzzyMatch<'a, T>>
    where
        F: Fn(&T) -> SongKey,
    {
        let mut keyed: Vec<(SongKey, &'a T)> = candidates.iter().map(|c| (key_of(c), c)).collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));

        let mut best: Option<(SongKey, &'a T, f64)> = None;
        for (key, candidate) in keyed {
            let ratio = similarity_ratio(target.as_str(), key.as_str());
            let better = best.as_ref().map_or(true, |(_, _, best_ratio)| ratio > *best_ratio);
            if better {
                best = Some((key, candidate, ratio));
            }
        }

        match best {
            Some((key, candidate, ratio)) if ratio >= self.threshold => {
                debug!(
                    target = %target,
                    matched = %key,
                    ratio = ratio,
                    "Fuzzy key match accepted"
                );
                Some(FuzzyMatch {
                    candidate,
                    key,
                    ratio,
                })
            }
            Some((key, _, ratio)) => {
                debug!(
                    target = %target,
                    closest = %key,
                    ratio = ratio,
                    threshold = self.threshold,
                    "Closest key below fuzzy threshold"
                );
                None
            }
            None => None,
        }
    }

    /// Best key from a key set, if it reaches the threshold
    pub fn best_key<'a, I>(&self, target: &SongKey, keys: I) -> Option<(&'a SongKey, f64)>
    where
        I: IntoIterator<Item = &'a SongKey>,
    {
        let keys: Vec<&'a SongKey> = keys.into_iter().collect();
        let best = self.fuzzy_match(target, &keys, |k| SongKey::clone(k))?;
        Some((*best.candidate, best.ratio))
    }

    /// Sentiment record for a song: exact key match first, fuzzy only as fallback
    pub fn find_sentiment<'a>(
        &self,
        target: &SongKey,
        sentiments: &'a [SentimentRecord],
    ) -> Option<&'a SentimentRecord> {
        let key_of = |s: &SentimentRecord| SongKey::new(&s.title, &s.artist);

        self.exact_match(target, sentiments, key_of)
            .or_else(|| self.fuzzy_match(target, sentiments, key_of).map(|m| m.candidate))
    }
}

impl Default for IdentityMatcher {
    fn default() -> Self {
        Self::new()
    }
}
