//! study-notes configuration file.

use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;
use crate::qa::QuestionSettings;
use crate::text::chunker::DEFAULT_CHARS_PER_TOKEN;
use crate::text::{
    ChunkConfig, CleaningLevel, PunctuationSegmenter, SeamsSegmenter, SentenceSegmenter,
    Tokenizer,
};

/// Tokenizer used to measure sentences while chunking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    #[default]
    Estimate,
    Whitespace,
    Characters,
}

/// Sentence boundary detector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SegmenterKind {
    /// Dialog-aware detector (handles abbreviations and quotes)
    #[default]
    Seams,
    /// Split on terminal punctuation only
    Punctuation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyConfig {
    #[serde(default)]
    pub cleaning_level: CleaningLevel,

    #[serde(default)]
    pub segmenter: SegmenterKind,

    #[serde(default)]
    pub tokenizer: TokenizerKind,

    /// Ratio used by the `characters` tokenizer
    #[serde(default = "default_chars_per_token")]
    pub chars_per_token: usize,

    /// Model preset for question generation (None = llm.toml default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_preset: Option<String>,

    /// Model preset for answers (None = same as questions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_preset: Option<String>,

    #[serde(default)]
    pub chunking: ChunkConfig,

    #[serde(default)]
    pub questions: QuestionSettings,
}

fn default_chars_per_token() -> usize {
    DEFAULT_CHARS_PER_TOKEN
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            cleaning_level: CleaningLevel::default(),
            segmenter: SegmenterKind::default(),
            tokenizer: TokenizerKind::default(),
            chars_per_token: default_chars_per_token(),
            question_preset: None,
            answer_preset: None,
            chunking: ChunkConfig::default(),
            questions: QuestionSettings::default(),
        }
    }
}

impl StudyConfig {
    /// Get the config file path: ~/.config/cli-programs/study-notes.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("study-notes.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: StudyConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn tokenizer(&self) -> Tokenizer {
        match self.tokenizer {
            TokenizerKind::Estimate => Tokenizer::Estimate,
            TokenizerKind::Whitespace => Tokenizer::Whitespace,
            TokenizerKind::Characters => Tokenizer::Characters {
                chars_per_token: self.chars_per_token,
            },
        }
    }

    pub fn build_segmenter(&self) -> Result<Box<dyn SentenceSegmenter>, PipelineError> {
        let segmenter: Box<dyn SentenceSegmenter> = match self.segmenter {
            SegmenterKind::Seams => Box::new(SeamsSegmenter::new()?),
            SegmenterKind::Punctuation => Box::new(PunctuationSegmenter),
        };
        Ok(segmenter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StudyConfig::default();
        assert_eq!(config.cleaning_level, CleaningLevel::Strict);
        assert_eq!(config.chunking.max_tokens_per_chunk, 400);
        assert_eq!(config.questions.questions_per_chunk, 3);
        assert!(config.questions.generate_answers);
        assert!(config.question_preset.is_none());
        assert_eq!(config.tokenizer(), Tokenizer::Estimate);
    }

    #[test]
    fn test_config_path() {
        let path = StudyConfig::config_path().unwrap();
        assert!(path.ends_with("cli-programs/study-notes.toml"));
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
cleaning_level = "light"
segmenter = "punctuation"
tokenizer = "characters"
chars_per_token = 3
question_preset = "qg-local"

[chunking]
max_tokens_per_chunk = 256
min_tokens_per_chunk = 32
max_chunks = 10

[questions]
questions_per_chunk = 2
filter_low_quality = false
"#;
        let config: StudyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.cleaning_level, CleaningLevel::Light);
        assert_eq!(config.segmenter, SegmenterKind::Punctuation);
        assert_eq!(
            config.tokenizer(),
            Tokenizer::Characters { chars_per_token: 3 }
        );
        assert_eq!(config.question_preset.as_deref(), Some("qg-local"));
        assert_eq!(config.chunking.max_chunks, Some(10));
        assert_eq!(config.chunking.min_tokens_per_chunk, 32);
        assert_eq!(config.questions.questions_per_chunk, 2);
        assert!(!config.questions.filter_low_quality);
        assert!(config.questions.generate_answers);
    }

    #[test]
    fn test_parse_empty_config() {
        let config: StudyConfig = toml::from_str("").unwrap();
        assert_eq!(config, StudyConfig::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("study-notes.toml");

        let mut config = StudyConfig::default();
        config.answer_preset = Some("anthropic-haiku".to_string());
        config.chunking.max_tokens_per_chunk = 128;
        config.save_to(&path).unwrap();

        let loaded = StudyConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = StudyConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, StudyConfig::default());
    }

    #[test]
    fn test_punctuation_segmenter_builds() {
        let config = StudyConfig {
            segmenter: SegmenterKind::Punctuation,
            ..StudyConfig::default()
        };
        let segmenter = config.build_segmenter().unwrap();
        assert_eq!(segmenter.segment("One. Two.").unwrap(), vec!["One.", "Two."]);
    }
}
