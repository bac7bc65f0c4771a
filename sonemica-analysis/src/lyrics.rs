//! Lyric text cleanup before classification

use std::borrow::Cow;
use tracing::debug;

/// Characters Windows-1252 places at bytes 0x80..=0x9F (`None` where it leaves a gap)
const CP1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'), None, Some('\u{201A}'), Some('\u{0192}'),
    Some('\u{201E}'), Some('\u{2026}'), Some('\u{2020}'), Some('\u{2021}'),
    Some('\u{02C6}'), Some('\u{2030}'), Some('\u{0160}'), Some('\u{2039}'),
    Some('\u{0152}'), None, Some('\u{017D}'), None,
    None, Some('\u{2018}'), Some('\u{2019}'), Some('\u{201C}'),
    Some('\u{201D}'), Some('\u{2022}'), Some('\u{2013}'), Some('\u{2014}'),
    Some('\u{02DC}'), Some('\u{2122}'), Some('\u{0161}'), Some('\u{203A}'),
    Some('\u{0153}'), None, Some('\u{017E}'), Some('\u{0178}'),
];

/// Lead characters of UTF-8 multi-byte sequences misread as Windows-1252
const MOJIBAKE_MARKERS: [char; 3] = ['\u{00C3}', '\u{00C2}', '\u{00E2}'];

/// Repair UTF-8 text that was decoded as Windows-1252 (or Latin-1)
///
/// `donâ€™t` becomes `don’t`. Text is returned unchanged unless every character maps
/// back to a single byte and those bytes form valid UTF-8.
pub fn fix_mojibake(text: &str) -> Cow<'_, str> {
    if !text.contains(MOJIBAKE_MARKERS) {
        return Cow::Borrowed(text);
    }

    let bytes: Option<Vec<u8>> = text.chars().map(cp1252_byte).collect();
    match bytes.map(String::from_utf8) {
        Some(Ok(repaired)) if repaired != text => {
            debug!("Repaired mis-decoded lyric text");
            Cow::Owned(repaired)
        }
        _ => Cow::Borrowed(text),
    }
}

fn cp1252_byte(c: char) -> Option<u8> {
    match u32::from(c) {
        code @ 0..=0xFF => u8::try_from(code).ok(),
        _ => CP1252_HIGH
            .iter()
            .position(|&mapped| mapped == Some(c))
            .and_then(|offset| u8::try_from(0x80 + offset).ok()),
    }
}

/// Repair mis-decoded text, collapse line breaks and whitespace runs to single spaces, trim
///
/// Returns `None` when nothing but whitespace remains; such tracks are not classified.
pub fn normalize_lyrics(text: &str) -> Option<String> {
    let text = fix_mojibake(text);
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}
