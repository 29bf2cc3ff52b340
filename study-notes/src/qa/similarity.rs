//! Fuzzy similarity for duplicate suppression.

use similar::TextDiff;

/// Normalized similarity between two strings, in `[0, 1]`.
pub trait SimilarityScorer {
    fn ratio(&self, a: &str, b: &str) -> f64;
}

/// Character-level matching ratio `2·M / T`, case-insensitive.
///
/// `M` is the number of characters in matching runs of the minimal diff and
/// `T` the combined length of both strings.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequenceRatio;

impl SimilarityScorer for SequenceRatio {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        let a = a.to_lowercase();
        let b = b.to_lowercase();
        f64::from(TextDiff::from_chars(a.as_str(), b.as_str()).ratio())
    }
}
