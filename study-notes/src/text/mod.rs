//! Text preparation: cleaning, sentence splitting and token-bounded chunking.

pub mod chunker;
mod cleaner;
mod segmenter;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use chunker::{ChunkConfig, Tokenizer, chunk_text};
pub use cleaner::clean_text;
pub use segmenter::{PunctuationSegmenter, SeamsSegmenter, SentenceSegmenter};

/// How aggressively raw text is cleaned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CleaningLevel {
    /// Brackets, time codes, punctuation runs and spacing only
    Light,
    /// Light, plus filler words, stutters and dangling conjunctions
    #[default]
    Strict,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        level: CleaningLevel,
    }

    #[test]
    fn test_cleaning_level_parsing() {
        let parsed: Wrapper = toml::from_str(r#"level = "light""#).unwrap();
        assert_eq!(parsed.level, CleaningLevel::Light);
        assert_eq!(CleaningLevel::default(), CleaningLevel::Strict);
        assert_eq!(
            CleaningLevel::from_str("strict", true).unwrap(),
            CleaningLevel::Strict
        );
    }
}
