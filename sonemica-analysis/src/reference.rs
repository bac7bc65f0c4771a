//! In-memory reference tables
//!
//! The audio feature and lyric datasets are loaded once at process start and shared
//! read-only (`Arc<ReferenceTables>`) by every analysis run. Lookups are an inner join on
//! exact `Title` + `Artist` equality with the requested identities: every requested track
//! yields every table row it matches, so a track played three times yields its row three
//! times. Normalization and fuzzy matching happen later, inside the core.

use crate::types::{AudioFeatureRow, LyricsRow, ProviderError, ReferenceDataProvider, TrackIdentity};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Audio feature and lyric tables
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    audio_features: Vec<AudioFeatureRow>,
    lyrics: Vec<LyricsRow>,
}

impl ReferenceTables {
    pub fn new(audio_features: Vec<AudioFeatureRow>, lyrics: Vec<LyricsRow>) -> Self {
        Self {
            audio_features,
            lyrics,
        }
    }

    /// Load both tables from JSON array files
    ///
    /// A table without a path is left empty (every lookup against it returns no rows).
    pub fn load(
        audio_features_path: Option<&Path>,
        lyrics_path: Option<&Path>,
    ) -> Result<Self, ProviderError> {
        let audio_features = match audio_features_path {
            Some(path) => load_json_rows(path)?,
            None => {
                warn!("No audio feature table configured, all tracks will lack audio features");
                Vec::new()
            }
        };
        let lyrics = match lyrics_path {
            Some(path) => load_json_rows(path)?,
            None => {
                warn!("No lyrics table configured, all tracks will lack lyrics");
                Vec::new()
            }
        };

        info!(
            audio_rows = audio_features.len(),
            lyric_rows = lyrics.len(),
            "Reference tables loaded"
        );

        Ok(Self::new(audio_features, lyrics))
    }

    pub fn audio_features(&self) -> &[AudioFeatureRow] {
        &self.audio_features
    }

    pub fn lyrics(&self) -> &[LyricsRow] {
        &self.lyrics
    }
}

#[async_trait]
impl ReferenceDataProvider for ReferenceTables {
    async fn audio_features_for(
        &self,
        tracks: &[TrackIdentity],
    ) -> Result<Vec<AudioFeatureRow>, ProviderError> {
        Ok(inner_join(&self.audio_features, tracks, |row| {
            (row.title.as_deref(), row.artist.as_deref())
        }))
    }

    async fn lyrics_for(&self, tracks: &[TrackIdentity]) -> Result<Vec<LyricsRow>, ProviderError> {
        Ok(inner_join(&self.lyrics, tracks, |row| {
            (row.title.as_deref(), row.artist.as_deref())
        }))
    }
}

/// Rows matching each requested identity, in request order then table order
fn inner_join<'a, T, F>(rows: &'a [T], tracks: &[TrackIdentity], identity_of: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&'a T) -> (Option<&'a str>, Option<&'a str>),
{
    let mut index: HashMap<(&str, &str), Vec<&T>> = HashMap::new();
    for row in rows {
        if let (Some(title), Some(artist)) = identity_of(row) {
            index.entry((title, artist)).or_default().push(row);
        }
    }

    tracks
        .iter()
        .filter_map(|t| index.get(&(t.title.as_str(), t.artist.as_str())))
        .flatten()
        .map(|row| (*row).clone())
        .collect()
}

fn load_json_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ProviderError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| ProviderError::Parse(format!("{}: {}", path.display(), e)))
}
