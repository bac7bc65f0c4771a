//! Affect Estimator
//!
//! Maps raw signals onto the 0-100 valence/arousal scales:
//! - Lyric valence from an emotion distribution
//! - Audio arousal from Energy + Loudness
//! - Fallback arousal from an emotion distribution, for tracks without audio features
//!
//! All estimators are pure and total for finite inputs; every output is clamped to [0, 100].

use crate::types::EmotionDistribution;

/// Lower bound of the loudness range mapped onto 0-100 (dB)
pub const LOUDNESS_FLOOR_DB: f64 = -60.0;

/// Weight of energy in audio arousal (loudness takes the remainder)
pub const ENERGY_AROUSAL_WEIGHT: f64 = 0.8;

const LOUDNESS_AROUSAL_WEIGHT: f64 = 1.0 - ENERGY_AROUSAL_WEIGHT;

// Sentiment-only arousal coefficients, applied around a neutral 50
const ANGER_AROUSAL: f64 = 40.0;
const JOY_AROUSAL: f64 = 20.0;
const OPTIMISM_AROUSAL: f64 = 15.0;
const SADNESS_AROUSAL: f64 = -30.0;

fn clamp_scale(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Lyric valence
///
/// `positive = (joy + optimism)·100`, `negative = (sadness + anger)·100`,
/// `valence = clamp(50 + (positive - negative) / 2)`.
pub fn lyrics_valence(distribution: &EmotionDistribution) -> f64 {
    let positive = (distribution.joy + distribution.optimism) * 100.0;
    let negative = (distribution.sadness + distribution.anger) * 100.0;
    clamp_scale(50.0 + (positive - negative) / 2.0)
}

/// Loudness in dB mapped linearly from [-60, 0] onto [0, 100]
pub fn normalized_loudness(loudness_db: f64) -> f64 {
    clamp_scale((loudness_db - LOUDNESS_FLOOR_DB) / -LOUDNESS_FLOOR_DB * 100.0)
}

/// Audio arousal: 80% energy, 20% normalized loudness
pub fn audio_arousal(energy: f64, loudness_db: f64) -> f64 {
    clamp_scale(
        energy * ENERGY_AROUSAL_WEIGHT + normalized_loudness(loudness_db) * LOUDNESS_AROUSAL_WEIGHT,
    )
}

/// Arousal estimated from lyric sentiment alone
///
/// Only used when a track has no audio feature record.
pub fn sentiment_arousal(distribution: &EmotionDistribution) -> f64 {
    clamp_scale(
        50.0 + distribution.anger * ANGER_AROUSAL
            + distribution.joy * JOY_AROUSAL
            + distribution.optimism * OPTIMISM_AROUSAL
            + distribution.sadness * SADNESS_AROUSAL,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "Expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_lyrics_valence_reference_case() {
        let d = EmotionDistribution::new(0.1, 0.5, 0.3, 0.1);
        // 50 + (80 - 20) / 2
        assert_close(lyrics_valence(&d), 80.0);
    }

    #[test]
    fn test_lyrics_valence_extremes() {
        assert_close(lyrics_valence(&EmotionDistribution::new(0.0, 1.0, 0.0, 0.0)), 100.0);
        assert_close(lyrics_valence(&EmotionDistribution::new(0.0, 0.0, 0.0, 1.0)), 0.0);
        assert_close(lyrics_valence(&EmotionDistribution::default()), 50.0);
    }

    #[test]
    fn test_lyrics_valence_clamps_unnormalized_input() {
        let d = EmotionDistribution::new(0.0, 2.0, 2.0, 0.0);
        assert_close(lyrics_valence(&d), 100.0);
    }

    #[test]
    fn test_audio_arousal_reference_case() {
        // 80*0.8 + (50/60*100)*0.2 = 64 + 16.667
        assert_close(audio_arousal(80.0, -10.0), 64.0 + 50.0 / 60.0 * 100.0 * 0.2);
        assert!((audio_arousal(80.0, -10.0) - 80.67).abs() < 0.01);
    }

    #[test]
    fn test_normalized_loudness_range() {
        assert_close(normalized_loudness(-60.0), 0.0);
        assert_close(normalized_loudness(0.0), 100.0);
        assert_close(normalized_loudness(-30.0), 50.0);
        // Outside the nominal range
        assert_close(normalized_loudness(-90.0), 0.0);
        assert_close(normalized_loudness(5.0), 100.0);
    }

    #[test]
    fn test_audio_arousal_bounds_over_grid() {
        for e in 0..=20 {
            for l in 0..=12 {
                let energy = e as f64 * 5.0;
                let loudness = -(l as f64) * 5.0;
                let a = audio_arousal(energy, loudness);
                assert!((0.0..=100.0).contains(&a), "arousal {} out of range", a);
            }
        }
    }

    #[test]
    fn test_sentiment_arousal() {
        assert_close(sentiment_arousal(&EmotionDistribution::new(1.0, 0.0, 0.0, 0.0)), 90.0);
        assert_close(sentiment_arousal(&EmotionDistribution::new(0.0, 0.0, 0.0, 1.0)), 20.0);
        assert_close(
            sentiment_arousal(&EmotionDistribution::new(0.1, 0.5, 0.3, 0.1)),
            50.0 + 4.0 + 10.0 + 4.5 - 3.0,
        );
    }
}
