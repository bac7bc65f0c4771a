//! Track identity matching
//!
//! Songs arrive from three independently sourced record sets (recently played tracks,
//! audio feature rows, lyric rows) with no shared identifier. Matching works on a
//! normalized [`SongKey`] built from title + artist:
//! - **Exact:** keys compare equal
//! - **Fuzzy:** Ratcliff/Obershelp similarity of keys above a threshold

pub mod identity_matcher;
pub mod similarity;
pub mod song_key;

pub use identity_matcher::{FuzzyMatch, IdentityMatcher, DEFAULT_FUZZY_THRESHOLD};
pub use similarity::similarity_ratio;
pub use song_key::{normalize_component, SongKey, KEY_SEPARATOR};
