//! Fusion Engine
//!
//! Joins audio feature rows and sentiment records on [`SongKey`] and produces one
//! [`ProcessedSong`] per key.
//!
//! # Algorithm
//! 1. Key every row; rows without title or artist are counted and dropped
//! 2. (optional) Re-key unmatched sentiment records onto unmatched audio keys by fuzzy match
//! 3. Walk the union of keys in ascending order
//! 4. Music valence from the audio row, lyric valence from the sentiment distribution
//! 5. Fuse with [`FusionWeights`] when both are present, otherwise take whichever exists
//! 6. Arousal from Energy + Loudness, or from the sentiment distribution when audio is absent
//!
//! A key with no valence signal at all is skipped and counted, never an error.

use super::weights::FusionWeights;
use crate::affect;
use crate::aggregation::{Aggregator, Summary};
use crate::error::{AnalysisError, Result};
use crate::matching::{IdentityMatcher, SongKey};
use crate::types::{AudioFeatureRow, DataSource, ProcessedSong, SentimentRecord, TrackIdentity};
use serde::{Deserialize, Serialize};
use sonemica_common::config::TomlConfig;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Join and fusion counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Keys in the union of both tables
    pub unique_songs: usize,
    pub songs_with_audio_features: usize,
    pub songs_with_sentiments: usize,
    pub songs_with_both: usize,
    pub songs_with_only_audio: usize,
    pub songs_with_only_sentiments: usize,
    pub songs_processed: usize,
    /// Keys with no valence signal (not expected after the union join)
    pub songs_skipped: usize,
    /// Input rows dropped for a missing title or artist
    pub rows_without_identity: usize,
    /// Sentiment records re-keyed by fuzzy match
    pub fuzzy_matches: usize,
}

/// Result of one `process_songs` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Fused tracks, in ascending key order
    pub songs: Vec<ProcessedSong>,
    pub summary: Summary,
    pub stats: Stats,
}

/// Fusion Engine
#[derive(Debug, Clone, Default)]
pub struct FusionEngine {
    weights: FusionWeights,
    matcher: IdentityMatcher,
    /// Re-key orphan sentiment records onto orphan audio keys
    fuzzy_join: bool,
}

impl FusionEngine {
    /// Engine with the given weights and exact-key join only
    pub fn new(weights: FusionWeights) -> Self {
        Self {
            weights,
            matcher: IdentityMatcher::new(),
            fuzzy_join: false,
        }
    }

    /// Enable the fuzzy sentiment join using `matcher`
    pub fn with_fuzzy_join(mut self, matcher: IdentityMatcher) -> Self {
        self.matcher = matcher;
        self.fuzzy_join = true;
        self
    }

    /// Engine configured from the `[fusion]` and `[matching]` sections
    pub fn from_config(config: &TomlConfig) -> Result<Self> {
        let engine = Self::new(FusionWeights::from_config(&config.fusion)?);
        if config.matching.fuzzy_sentiment_join {
            Ok(engine.with_fuzzy_join(IdentityMatcher::with_threshold(
                config.matching.fuzzy_threshold,
            )))
        } else {
            Ok(engine)
        }
    }

    pub fn weights(&self) -> &FusionWeights {
        &self.weights
    }

    /// Fuse both tables and summarize the resulting point cloud
    ///
    /// # Errors
    /// - `MalformedRecord` when a keyed audio row lacks Energy, Loudness or Valence
    /// - `EmptyInput` when no track survives the join
    pub fn process_songs(
        &self,
        audio_rows: &[AudioFeatureRow],
        sentiments: &[SentimentRecord],
    ) -> Result<AnalysisResult> {
        let mut stats = Stats::default();

        let audio = key_rows(audio_rows, AudioFeatureRow::identity, "audio", &mut stats);
        let mut by_sentiment =
            key_rows(sentiments, SentimentRecord::identity, "sentiment", &mut stats);

        if self.fuzzy_join {
            let (rekeyed, matched) = self.fuzzy_rekey(&audio, by_sentiment);
            by_sentiment = rekeyed;
            stats.fuzzy_matches = matched;
        }

        stats.songs_with_audio_features = audio.len();
        stats.songs_with_sentiments = by_sentiment.len();

        let keys: BTreeSet<&SongKey> = audio.keys().chain(by_sentiment.keys()).collect();
        stats.unique_songs = keys.len();

        let mut songs = Vec::with_capacity(keys.len());
        for key in keys {
            let audio_row = audio.get(key).copied();
            let sentiment = by_sentiment.get(key).copied();

            if audio_row.is_none() && sentiment.is_none() {
                debug!(key = %key, "No record for key, skipping");
                stats.songs_skipped += 1;
                continue;
            }

            let audio_record = audio_row.map(AudioFeatureRow::validate).transpose()?;
            let music_valence = audio_record.as_ref().map(|a| a.valence);
            let lyrics_valence = sentiment.map(|s| affect::lyrics_valence(&s.distribution));

            let (valence, data_source) = match (music_valence, lyrics_valence) {
                (Some(m), Some(l)) => (self.weights.fuse(m, l), DataSource::Both),
                (Some(m), None) => (m, DataSource::AudioOnly),
                (None, Some(l)) => (l, DataSource::LyricsOnly),
                (None, None) => {
                    debug!(key = %key, "No valence signal, skipping");
                    stats.songs_skipped += 1;
                    continue;
                }
            };

            let arousal = match (&audio_record, sentiment) {
                (Some(a), _) => affect::audio_arousal(a.energy, a.loudness),
                (None, Some(s)) => affect::sentiment_arousal(&s.distribution),
                (None, None) => continue,
            };

            match data_source {
                DataSource::Both => stats.songs_with_both += 1,
                DataSource::AudioOnly => stats.songs_with_only_audio += 1,
                DataSource::LyricsOnly => stats.songs_with_only_sentiments += 1,
            }

            let (title, artist) = match (&audio_record, sentiment) {
                (Some(a), _) => (a.title.clone(), a.artist.clone()),
                (None, Some(s)) => (s.title.clone(), s.artist.clone()),
                (None, None) => continue,
            };

            songs.push(ProcessedSong {
                title,
                artist,
                valence: valence.clamp(0.0, 100.0),
                arousal,
                music_valence,
                lyrics_valence,
                energy: audio_record.as_ref().map(|a| a.energy),
                loudness: audio_record.as_ref().map(|a| a.loudness),
                data_source,
                sentiment_scores: sentiment.cloned(),
            });
        }

        stats.songs_processed = songs.len();

        if songs.is_empty() {
            return Err(AnalysisError::EmptyInput(
                "no track has audio features or lyric sentiment".to_string(),
            ));
        }

        let summary = Aggregator::summarize(&songs)?;

        info!(
            processed = stats.songs_processed,
            both = stats.songs_with_both,
            audio_only = stats.songs_with_only_audio,
            lyrics_only = stats.songs_with_only_sentiments,
            skipped = stats.songs_skipped,
            "Fusion complete"
        );

        Ok(AnalysisResult {
            songs,
            summary,
            stats,
        })
    }

    /// Move sentiment records without an exact audio partner onto the closest audio key
    /// that has no exact sentiment partner; each audio key accepts at most one record
    fn fuzzy_rekey<'a>(
        &self,
        audio: &BTreeMap<SongKey, &AudioFeatureRow>,
        sentiments: BTreeMap<SongKey, &'a SentimentRecord>,
    ) -> (BTreeMap<SongKey, &'a SentimentRecord>, usize) {
        let mut open_audio: BTreeSet<SongKey> = audio
            .keys()
            .filter(|k| !sentiments.contains_key(*k))
            .cloned()
            .collect();

        let mut rekeyed = BTreeMap::new();
        let mut matched = 0;

        for (key, record) in sentiments {
            if audio.contains_key(&key) {
                rekeyed.insert(key, record);
                continue;
            }

            let found = self
                .matcher
                .best_key(&key, open_audio.iter())
                .map(|(k, ratio)| (k.clone(), ratio));

            match found {
                Some((audio_key, ratio)) => {
                    debug!(
                        sentiment_key = %key,
                        audio_key = %audio_key,
                        ratio = ratio,
                        "Sentiment record re-keyed by fuzzy match"
                    );
                    open_audio.remove(&audio_key);
                    rekeyed.insert(audio_key, record);
                    matched += 1;
                }
                None => {
                    rekeyed.insert(key, record);
                }
            }
        }

        (rekeyed, matched)
    }
}

/// Key rows by their normalized identity; the last row for a duplicated key wins
fn key_rows<'a, T, F>(
    rows: &'a [T],
    identity_of: F,
    table: &'static str,
    stats: &mut Stats,
) -> BTreeMap<SongKey, &'a T>
where
    F: Fn(&T) -> Option<TrackIdentity>,
{
    let mut keyed = BTreeMap::new();
    for row in rows {
        let Some(identity) = identity_of(row) else {
            stats.rows_without_identity += 1;
            continue;
        };
        let key = identity.song_key();
        if keyed.insert(key.clone(), row).is_some() {
            debug!(table = table, key = %key, "Duplicate key, keeping last row");
        }
    }
    keyed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EmotionDistribution;

    fn audio(title: &str, artist: &str, energy: f64, loudness: f64, valence: f64) -> AudioFeatureRow {
        AudioFeatureRow {
            title: Some(title.to_string()),
            artist: Some(artist.to_string()),
            energy: Some(energy),
            loudness: Some(loudness),
            valence: Some(valence),
            ..Default::default()
        }
    }

    fn sentiment(title: &str, artist: &str, d: EmotionDistribution) -> SentimentRecord {
        SentimentRecord {
            title: title.to_string(),
            artist: artist.to_string(),
            distribution: d,
        }
    }

    fn reference_distribution() -> EmotionDistribution {
        EmotionDistribution::new(0.1, 0.5, 0.3, 0.1)
    }

    #[test]
    fn test_reference_scenario_both_sources() {
        let engine = FusionEngine::default();
        let mut row = audio("Song", "Band", 80.0, -10.0, 20.0);
        row.danceability = Some(70.0);
        row.acousticness = Some(10.0);

        let result = engine
            .process_songs(&[row], &[sentiment("song", "BAND", reference_distribution())])
            .unwrap();

        assert_eq!(result.songs.len(), 1);
        let song = &result.songs[0];
        assert_eq!(song.data_source, DataSource::Both);
        assert!((song.lyrics_valence.unwrap() - 80.0).abs() < 1e-9);
        assert!((song.valence - 44.0).abs() < 1e-9);
        assert!((song.arousal - 80.67).abs() < 0.01);
        assert_eq!(song.title, "Song");
        assert_eq!(result.stats.songs_with_both, 1);
    }

    #[test]
    fn test_lyrics_only_uses_sentiment_arousal() {
        let engine = FusionEngine::default();
        let d = reference_distribution();
        let result = engine
            .process_songs(&[], &[sentiment("Only Words", "Poet", d)])
            .unwrap();

        let song = &result.songs[0];
        assert_eq!(song.data_source, DataSource::LyricsOnly);
        assert!(song.music_valence.is_none());
        assert_eq!(song.arousal, affect::sentiment_arousal(&d));
        assert_eq!(result.stats.songs_with_only_sentiments, 1);
    }

    #[test]
    fn test_audio_only() {
        let engine = FusionEngine::default();
        let result = engine
            .process_songs(&[audio("Instrumental", "Band", 50.0, -30.0, 65.0)], &[])
            .unwrap();

        let song = &result.songs[0];
        assert_eq!(song.data_source, DataSource::AudioOnly);
        assert_eq!(song.valence, 65.0);
        assert!(song.lyrics_valence.is_none());
        assert!(song.sentiment_scores.is_none());
    }

    #[test]
    fn test_empty_tables_fail() {
        let engine = FusionEngine::default();
        assert!(matches!(
            engine.process_songs(&[], &[]),
            Err(AnalysisError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_rows_without_identity_are_counted() {
        let engine = FusionEngine::default();
        let mut anonymous = audio("", "Band", 50.0, -30.0, 50.0);
        anonymous.title = None;

        let result = engine
            .process_songs(&[anonymous, audio("Song", "Band", 50.0, -30.0, 50.0)], &[])
            .unwrap();
        assert_eq!(result.stats.rows_without_identity, 1);
        assert_eq!(result.stats.songs_processed, 1);
    }

    #[test]
    fn test_malformed_audio_row_is_surfaced() {
        let engine = FusionEngine::default();
        let mut row = audio("Song", "Band", 50.0, -30.0, 50.0);
        row.energy = None;

        assert!(matches!(
            engine.process_songs(&[row], &[]),
            Err(AnalysisError::MalformedRecord { field: "Energy", .. })
        ));
    }

    #[test]
    fn test_duplicate_keys_last_row_wins() {
        let engine = FusionEngine::default();
        let rows = [
            audio("Song", "Band", 50.0, -30.0, 10.0),
            audio("SONG!", "band", 50.0, -30.0, 90.0),
        ];
        let result = engine.process_songs(&rows, &[]).unwrap();
        assert_eq!(result.songs.len(), 1);
        assert_eq!(result.songs[0].valence, 90.0);
    }

    #[test]
    fn test_stats_tally() {
        let engine = FusionEngine::default();
        let rows = [
            audio("A", "X", 50.0, -30.0, 50.0),
            audio("B", "X", 50.0, -30.0, 50.0),
        ];
        let sentiments = [
            sentiment("B", "X", reference_distribution()),
            sentiment("C", "X", reference_distribution()),
        ];
        let stats = engine.process_songs(&rows, &sentiments).unwrap().stats;

        assert_eq!(stats.unique_songs, 3);
        assert_eq!(stats.songs_with_audio_features, 2);
        assert_eq!(stats.songs_with_sentiments, 2);
        assert_eq!(stats.songs_with_both, 1);
        assert_eq!(stats.songs_with_only_audio, 1);
        assert_eq!(stats.songs_with_only_sentiments, 1);
        assert_eq!(stats.songs_processed, 3);
        assert_eq!(stats.songs_skipped, 0);
        assert_eq!(stats.fuzzy_matches, 0);
    }

    #[test]
    fn test_fuzzy_join_disabled_by_default() {
        let engine = FusionEngine::default();
        let result = engine
            .process_songs(
                &[audio("Yesterday", "The Beatles", 50.0, -30.0, 50.0)],
                &[sentiment("Yesterday", "Beatles", reference_distribution())],
            )
            .unwrap();
        assert_eq!(result.songs.len(), 2);
        assert_eq!(result.stats.songs_with_both, 0);
    }

    #[test]
    fn test_fuzzy_join_rekeys_orphan_sentiment() {
        let engine = FusionEngine::default().with_fuzzy_join(IdentityMatcher::new());
        let result = engine
            .process_songs(
                &[audio("Yesterday", "The Beatles", 50.0, -30.0, 50.0)],
                &[sentiment("Yesterday", "Beatles", reference_distribution())],
            )
            .unwrap();

        assert_eq!(result.songs.len(), 1);
        assert_eq!(result.songs[0].data_source, DataSource::Both);
        assert_eq!(result.songs[0].artist, "The Beatles");
        assert_eq!(result.stats.fuzzy_matches, 1);
    }

    #[test]
    fn test_fuzzy_join_prefers_exact_partner() {
        let engine = FusionEngine::default().with_fuzzy_join(IdentityMatcher::new());
        let result = engine
            .process_songs(
                &[audio("Yesterday", "The Beatles", 50.0, -30.0, 50.0)],
                &[
                    sentiment("Yesterday", "The Beatles", reference_distribution()),
                    sentiment("Yesterday", "Beatles", EmotionDistribution::new(0.0, 0.0, 0.0, 1.0)),
                ],
            )
            .unwrap();

        // The exact partner keeps the audio key; the near-duplicate stays on its own key
        assert_eq!(result.songs.len(), 2);
        assert_eq!(result.stats.fuzzy_matches, 0);
        assert_eq!(result.stats.songs_with_both, 1);
    }

    #[test]
    fn test_from_config_rejects_bad_weights() {
        let mut config = TomlConfig::default();
        config.fusion.music_valence = 0.9;
        assert!(matches!(
            FusionEngine::from_config(&config),
            Err(AnalysisError::InvalidWeights(_))
        ));
    }
}
