//! Token-bounded chunking for length-limited models.

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::cleaner::clean_text;
use super::segmenter::SentenceSegmenter;
use super::CleaningLevel;
use crate::error::PipelineError;

/// Default token budget per chunk.
pub const DEFAULT_MAX_TOKENS: usize = 400;

/// Default character-per-token ratio for the character tokenizer.
pub const DEFAULT_CHARS_PER_TOKEN: usize = 4;

static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w+|[^\w\s]").expect("token pattern is a valid regex"));

/// Counts model tokens in a piece of text.
pub trait TokenCounter {
    fn count_tokens(&self, text: &str) -> Result<usize, PipelineError>;
}

impl<F> TokenCounter for F
where
    F: Fn(&str) -> Result<usize, PipelineError>,
{
    fn count_tokens(&self, text: &str) -> Result<usize, PipelineError> {
        self(text)
    }
}

/// Approximate token count: word runs plus standalone punctuation marks.
pub fn estimate_tokens(text: &str) -> usize {
    TOKEN.find_iter(text).count()
}

/// Built-in tokenizers selectable from the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tokenizer {
    /// Word and punctuation estimate
    Estimate,
    /// Whitespace-separated words
    Whitespace,
    /// Characters divided by a fixed ratio, rounded up
    Characters { chars_per_token: usize },
}

impl TokenCounter for Tokenizer {
    fn count_tokens(&self, text: &str) -> Result<usize, PipelineError> {
        match *self {
            Tokenizer::Estimate => Ok(estimate_tokens(text)),
            Tokenizer::Whitespace => Ok(text.split_whitespace().count()),
            Tokenizer::Characters { chars_per_token } => {
                if chars_per_token == 0 {
                    return Err(PipelineError::Tokenizer(
                        "chars_per_token must be positive".to_string(),
                    ));
                }
                Ok(text.chars().count().div_ceil(chars_per_token))
            }
        }
    }
}

/// Chunk size bounds.
///
/// `min_tokens_per_chunk > max_tokens_per_chunk` is accepted and simply
/// produces no chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkConfig {
    #[serde(default = "default_max_tokens")]
    pub max_tokens_per_chunk: usize,

    #[serde(default)]
    pub min_tokens_per_chunk: usize,

    /// Keep only the first N chunks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_chunks: Option<usize>,
}

fn default_max_tokens() -> usize {
    DEFAULT_MAX_TOKENS
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_tokens_per_chunk: DEFAULT_MAX_TOKENS,
            min_tokens_per_chunk: 0,
            max_chunks: None,
        }
    }
}

fn sentence_tokens(sentence: &str, tokenizer: Option<&dyn TokenCounter>) -> usize {
    match tokenizer {
        None => estimate_tokens(sentence),
        Some(counter) => counter.count_tokens(sentence).unwrap_or_else(|e| {
            warn!("{}; estimating tokens for this sentence instead", e);
            estimate_tokens(sentence)
        }),
    }
}

/// Greedily pack sentences into chunks, in order, without backtracking.
///
/// A sentence that is over budget on its own is dropped. A sentence that would
/// push the current chunk past `max_tokens_per_chunk` closes it; the closed
/// chunk is kept only if it reached `min_tokens_per_chunk`. Landing exactly on
/// the budget still fits.
pub fn chunk_sentences<S: AsRef<str>>(
    sentences: &[S],
    config: &ChunkConfig,
    tokenizer: Option<&dyn TokenCounter>,
) -> Vec<String> {
    let max = config.max_tokens_per_chunk;
    let mut chunks = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    let mut running = 0;

    for sentence in sentences {
        if config.max_chunks.is_some_and(|limit| chunks.len() >= limit) {
            break;
        }

        let sentence = sentence.as_ref().trim();
        if sentence.is_empty() {
            continue;
        }

        let tokens = sentence_tokens(sentence, tokenizer);
        if tokens > max {
            warn!(
                "Skipping sentence of {} tokens (limit {}): {:.60}",
                tokens, max, sentence
            );
            continue;
        }

        if running + tokens > max {
            finalize(&buffer, running, config, &mut chunks);
            buffer.clear();
            running = 0;
        }

        buffer.push(sentence);
        running += tokens;
    }

    finalize(&buffer, running, config, &mut chunks);

    if let Some(limit) = config.max_chunks {
        chunks.truncate(limit);
    }

    chunks
}

fn finalize(buffer: &[&str], tokens: usize, config: &ChunkConfig, chunks: &mut Vec<String>) {
    if buffer.is_empty() {
        return;
    }
    if tokens >= config.min_tokens_per_chunk {
        chunks.push(buffer.join(" ").trim().to_string());
    } else {
        debug!(
            "Discarding {}-token chunk below minimum of {}",
            tokens, config.min_tokens_per_chunk
        );
    }
}

/// Clean, segment and chunk raw text.
pub fn chunk_text(
    text: &str,
    level: CleaningLevel,
    segmenter: &dyn SentenceSegmenter,
    config: &ChunkConfig,
    tokenizer: Option<&dyn TokenCounter>,
) -> Result<Vec<String>, PipelineError> {
    let cleaned = clean_text(text, level);
    if cleaned.is_empty() {
        return Ok(Vec::new());
    }

    let sentences = segmenter.segment(&cleaned)?;
    let chunks = chunk_sentences(&sentences, config, tokenizer);
    debug!(
        "Chunked {} sentences into {} chunks (max {} tokens)",
        sentences.len(),
        chunks.len(),
        config.max_tokens_per_chunk
    );
    Ok(chunks)
}
