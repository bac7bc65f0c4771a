//! Ratcliff/Obershelp sequence similarity
//!
//! `ratio = 2·M / T` where `M` is the number of characters in matching blocks and `T`
//! the combined length of both strings. Matching blocks are found by taking the
//! longest common substring, then recursing on the unmatched text to its left and to
//! its right.
//!
//! Among equally long common substrings the one ending earliest in `a` wins, then the
//! one starting earliest in `b`, so the result is deterministic for any input pair.

/// Similarity ratio in [0, 1]; two empty strings are identical (1.0)
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    2.0 * matching_characters(&a, &b) as f64 / total as f64
}

/// Total length of all matching blocks
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    // (a_lo, a_hi, b_lo, b_hi) ranges still to be examined
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let (i, j, size) = longest_common_block(a, b, a_lo, a_hi, b_lo, b_hi);
        if size == 0 {
            continue;
        }
        matched += size;

        if a_lo < i && b_lo < j {
            pending.push((a_lo, i, b_lo, j));
        }
        if i + size < a_hi && j + size < b_hi {
            pending.push((i + size, a_hi, j + size, b_hi));
        }
    }

    matched
}

/// Longest common substring of `a[a_lo..a_hi]` and `b[b_lo..b_hi]`
///
/// Returns `(start_in_a, start_in_b, length)`.
fn longest_common_block(
    a: &[char],
    b: &[char],
    a_lo: usize,
    a_hi: usize,
    b_lo: usize,
    b_hi: usize,
) -> (usize, usize, usize) {
    let width = b_hi - b_lo;
    // run[j + 1] = length of the common run ending at a[i], b[b_lo + j]
    let mut prev = vec![0usize; width + 1];
    let mut curr = vec![0usize; width + 1];

    let (mut best_i, mut best_j, mut best_size) = (a_lo, b_lo, 0);

    for i in a_lo..a_hi {
        for j in 0..width {
            curr[j + 1] = if a[i] == b[b_lo + j] { prev[j] + 1 } else { 0 };
            let k = curr[j + 1];
            if k > best_size {
                best_i = i + 1 - k;
                best_j = b_lo + j + 1 - k;
                best_size = k;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    (best_i, best_j, best_size)
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
    fn test_identical_strings() {
        assert_close(similarity_ratio("letitbe|thebeatles", "letitbe|thebeatles"), 1.0);
    }

    #[test]
    fn test_disjoint_strings() {
        assert_close(similarity_ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_empty_strings() {
        assert_close(similarity_ratio("", ""), 1.0);
        assert_close(similarity_ratio("abc", ""), 0.0);
    }

    #[test]
    fn test_known_ratios() {
        // "abcd" vs "bcde": block "bcd" → 2*3/8
        assert_close(similarity_ratio("abcd", "bcde"), 0.75);
        // Classic example: "abxcd" vs "abcd" → blocks "ab" + "cd" → 2*4/9
        assert_close(similarity_ratio("abxcd", "abcd"), 8.0 / 9.0);
    }

    #[test]
    fn test_recursion_on_both_sides() {
        // Longest block "word" in the middle, then "x" on the left and "y" on the right
        assert_close(similarity_ratio("x-word-y", "x_word_y"), 2.0 * 6.0 / 16.0);
    }

    #[test]
    fn test_symmetric_for_single_blocks() {
        let forward = similarity_ratio("yesterday|beatles", "yesterday|thebeatles");
        let backward = similarity_ratio("yesterday|thebeatles", "yesterday|beatles");
        assert_close(forward, backward);
        // 17 chars match out of 17 + 20
        assert_close(forward, 34.0 / 37.0);
    }

    #[test]
    fn test_ratio_bounds() {
        let samples = ["", "a", "ab", "hello|world", "helo|wrld", "zzz"];
        for a in samples {
            for b in samples {
                let r = similarity_ratio(a, b);
                assert!((0.0..=1.0).contains(&r), "ratio {} out of range for {:?} {:?}", r, a, b);
            }
        }
    }
}
