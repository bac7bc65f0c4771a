//! Normalized song join key

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between the title and artist components
pub const KEY_SEPARATOR: char = '|';

/// Normalized join key: `<title>|<artist>`, each component lowercase `[a-z0-9]*`
///
/// Normalization is lossy and many-to-one: identities that differ only by case,
/// punctuation, whitespace or non-ASCII characters collapse to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongKey(String);

impl SongKey {
    /// Build key from title and artist; empty inputs give empty components
    pub fn new(title: &str, artist: &str) -> Self {
        let mut key = normalize_component(title);
        key.push(KEY_SEPARATOR);
        key.push_str(&normalize_component(artist));
        SongKey(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SongKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SongKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lowercase, then drop every character outside `[a-z0-9]`
pub fn normalize_component(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_punctuation_whitespace_collapse() {
        assert_eq!(
            SongKey::new(" The Beatles ", "Let It Be!!"),
            SongKey::new("the beatles", "letitbe")
        );
    }

    #[test]
    fn test_key_format() {
        assert_eq!(SongKey::new("Don't Stop", "AC/DC").as_str(), "dontstop|acdc");
    }

    #[test]
    fn test_empty_components() {
        assert_eq!(SongKey::new("", "").as_str(), "|");
        assert_eq!(SongKey::new("Title", "").as_str(), "title|");
    }

    #[test]
    fn test_non_ascii_is_dropped() {
        // Accented letters are outside [a-z0-9] after lowercasing
        assert_eq!(normalize_component("Canción Número 1"), "cancinnmero1");
    }

    #[test]
    fn test_separator_keeps_components_apart() {
        assert_ne!(SongKey::new("ab", "c"), SongKey::new("a", "bc"));
    }
}
