//! Fusion and aggregate property tests
//!
//! Bound checks over deterministic grids, idempotence, and the reference scenarios
//! for `process_songs` / `compute_diversity`.

use sonemica_analysis::affect::{audio_arousal, lyrics_valence, sentiment_arousal};
use sonemica_analysis::types::{AudioFeatureRow, DataSource, EmotionDistribution, SentimentRecord};
use sonemica_analysis::{compute_diversity, process_songs, AnalysisError, FusionWeights, SongKey};

fn audio_row(title: &str, artist: &str, energy: f64, loudness: f64, valence: f64) -> AudioFeatureRow {
    AudioFeatureRow {
        title: Some(title.to_string()),
        artist: Some(artist.to_string()),
        energy: Some(energy),
        loudness: Some(loudness),
        valence: Some(valence),
        ..Default::default()
    }
}

fn sentiment(title: &str, artist: &str, distribution: EmotionDistribution) -> SentimentRecord {
    SentimentRecord {
        title: title.to_string(),
        artist: artist.to_string(),
        distribution,
    }
}

/// Distributions over a 0.1 grid whose components sum to 1
fn distribution_grid() -> Vec<EmotionDistribution> {
    let mut grid = Vec::new();
    for a in 0..=10 {
        for j in 0..=(10 - a) {
            for o in 0..=(10 - a - j) {
                let s = 10 - a - j - o;
                grid.push(EmotionDistribution::new(
                    a as f64 / 10.0,
                    j as f64 / 10.0,
                    o as f64 / 10.0,
                    s as f64 / 10.0,
                ));
            }
        }
    }
    grid
}

// =============================================================================
// Estimator bounds
// =============================================================================

#[test]
fn lyrics_valence_bounded_for_all_distributions() {
    for d in distribution_grid() {
        let v = lyrics_valence(&d);
        assert!((0.0..=100.0).contains(&v), "valence {} out of range for {:?}", v, d);
        let a = sentiment_arousal(&d);
        assert!((0.0..=100.0).contains(&a), "arousal {} out of range for {:?}", a, d);
    }
}

#[test]
fn audio_arousal_bounded_over_nominal_ranges() {
    for energy in (0..=100).step_by(5) {
        for loudness in (-60..=0).step_by(3) {
            let a = audio_arousal(energy as f64, loudness as f64);
            assert!((0.0..=100.0).contains(&a));
        }
    }
}

// =============================================================================
// process_songs
// =============================================================================

#[test]
fn reference_scenario() {
    let mut row = audio_row("Song", "Band", 80.0, -10.0, 20.0);
    row.danceability = Some(70.0);
    row.acousticness = Some(10.0);
    let d = EmotionDistribution::new(0.1, 0.5, 0.3, 0.1);

    let result = process_songs(&[row], &[sentiment("Song", "Band", d)], FusionWeights::default())
        .unwrap();
    let song = &result.songs[0];

    assert!((song.lyrics_valence.unwrap() - 80.0).abs() < 1e-9);
    assert!((song.valence - 44.0).abs() < 1e-9);
    assert!((song.arousal - 80.67).abs() < 0.01);
    assert_eq!(song.music_valence, Some(20.0));
}

#[test]
fn full_music_weight_returns_music_valence_exactly() {
    let weights = FusionWeights::new(1.0, 0.0).unwrap();
    let d = EmotionDistribution::new(0.0, 1.0, 0.0, 0.0);

    for valence in [0.0, 12.5, 37.3, 99.9] {
        let result = process_songs(
            &[audio_row("T", "A", 50.0, -20.0, valence)],
            &[sentiment("T", "A", d)],
            weights,
        )
        .unwrap();
        assert_eq!(result.songs[0].valence, valence);
        assert_eq!(result.songs[0].data_source, DataSource::Both);
    }
}

#[test]
fn lyrics_only_track() {
    let d = EmotionDistribution::new(0.6, 0.1, 0.1, 0.2);
    let result = process_songs(&[], &[sentiment("Scream", "Band", d)], FusionWeights::default())
        .unwrap();

    let song = &result.songs[0];
    assert_eq!(song.data_source, DataSource::LyricsOnly);
    assert_eq!(song.music_valence, None);
    assert_eq!(song.arousal, sentiment_arousal(&d));
    assert_eq!(song.sentiment_scores.as_ref().map(|s| s.distribution), Some(d));
}

#[test]
fn empty_tables_raise_empty_input() {
    assert!(matches!(
        process_songs(&[], &[], FusionWeights::default()),
        Err(AnalysisError::EmptyInput(_))
    ));
}

#[test]
fn rows_without_identity_only_raise_empty_input() {
    let mut row = audio_row("x", "y", 50.0, -10.0, 50.0);
    row.artist = None;
    let err = process_songs(&[row], &[], FusionWeights::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::EmptyInput(_)));
}

#[test]
fn process_songs_is_idempotent() {
    let rows = vec![
        audio_row("One", "A", 90.0, -4.0, 80.0),
        audio_row("Two", "B", 20.0, -30.0, 15.0),
        audio_row("Three", "C", 60.0, -12.0, 55.0),
    ];
    let sentiments = vec![
        sentiment("two", "b", EmotionDistribution::new(0.2, 0.1, 0.1, 0.6)),
        sentiment("Four", "D", EmotionDistribution::new(0.0, 0.7, 0.2, 0.1)),
    ];

    let first = process_songs(&rows, &sentiments, FusionWeights::default()).unwrap();
    let second = process_songs(&rows, &sentiments, FusionWeights::default()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn input_order_does_not_change_result() {
    let rows = vec![
        audio_row("One", "A", 90.0, -4.0, 80.0),
        audio_row("Two", "B", 20.0, -30.0, 15.0),
    ];
    let reversed: Vec<_> = rows.iter().rev().cloned().collect();

    let a = process_songs(&rows, &[], FusionWeights::default()).unwrap();
    let b = process_songs(&reversed, &[], FusionWeights::default()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn fused_points_stay_in_range() {
    let distributions = distribution_grid();
    let rows: Vec<AudioFeatureRow> = (0..distributions.len())
        .map(|i| {
            let f = (i % 21) as f64 * 5.0;
            audio_row(&format!("Track {}", i), "Artist", f, -(f * 0.6), 100.0 - f)
        })
        .collect();
    let sentiments: Vec<SentimentRecord> = distributions
        .iter()
        .enumerate()
        .map(|(i, d)| sentiment(&format!("Track {}", i * 2), "Artist", *d))
        .collect();

    let result = process_songs(&rows, &sentiments, FusionWeights::default()).unwrap();
    for song in &result.songs {
        assert!((0.0..=100.0).contains(&song.valence));
        assert!((0.0..=100.0).contains(&song.arousal));
        assert!(song.music_valence.is_some() || song.lyrics_valence.is_some());
    }
    assert_eq!(result.stats.songs_processed, result.songs.len());
    assert_eq!(
        result.stats.songs_with_both
            + result.stats.songs_with_only_audio
            + result.stats.songs_with_only_sentiments,
        result.songs.len()
    );
}

// =============================================================================
// compute_diversity
// =============================================================================

#[test]
fn even_quadrant_split_is_maximally_diverse() {
    // (valence, energy, loudness) per quadrant; loudness -60 keeps arousal = 0.8 * energy
    let quadrants = [(80.0, 90.0), (20.0, 90.0), (20.0, 10.0), (80.0, 10.0)];
    let rows: Vec<AudioFeatureRow> = (0..100)
        .map(|i| {
            let (valence, energy) = quadrants[i % 4];
            audio_row(&format!("Song {}", i), "Band", energy, -60.0, valence)
        })
        .collect();

    let result = process_songs(&rows, &[], FusionWeights::default()).unwrap();
    let diversity = compute_diversity(&result).unwrap();

    assert!(diversity.category_counts.values().all(|&c| c == 25));
    assert!((diversity.normalized - 1.0).abs() < 1e-9);
}

#[test]
fn single_quadrant_has_zero_diversity() {
    let rows: Vec<AudioFeatureRow> = (0..10)
        .map(|i| audio_row(&format!("Song {}", i), "Band", 90.0, -3.0, 90.0))
        .collect();

    let result = process_songs(&rows, &[], FusionWeights::default()).unwrap();
    let diversity = compute_diversity(&result).unwrap();
    assert_eq!(diversity.normalized, 0.0);
}

#[test]
fn song_key_normalization_example() {
    assert_eq!(
        SongKey::new(" The Beatles ", "Let It Be!!"),
        SongKey::new("the beatles", "letitbe")
    );
}
