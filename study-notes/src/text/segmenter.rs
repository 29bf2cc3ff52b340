//! Sentence boundary detection.

use seams::sentence_detector::dialog_detector::SentenceDetectorDialog;

use crate::error::PipelineError;

/// Splits text into trimmed, non-empty sentences in document order.
pub trait SentenceSegmenter {
    fn segment(&self, text: &str) -> Result<Vec<String>, PipelineError>;
}

/// Dialog-aware detection backed by the seams library.
pub struct SeamsSegmenter {
    detector: SentenceDetectorDialog,
}

impl SeamsSegmenter {
    pub fn new() -> Result<Self, PipelineError> {
        let detector =
            SentenceDetectorDialog::new().map_err(|e| PipelineError::UpstreamUnavailable {
                service: "sentence segmenter",
                reason: format!("{:?}", e),
            })?;
        Ok(Self { detector })
    }
}

impl SentenceSegmenter for SeamsSegmenter {
    fn segment(&self, text: &str) -> Result<Vec<String>, PipelineError> {
        let sentences = self
            .detector
            .detect_sentences_borrowed(text)
            .map_err(|e| PipelineError::Segmentation(format!("{:?}", e)))?;

        Ok(sentences
            .iter()
            .map(|s| s.normalize().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect())
    }
}

/// Splits after `.`, `!` or `?` followed by whitespace or end of text.
///
/// No abbreviation handling; "Dr. Smith" becomes two sentences.
#[derive(Debug, Default, Clone, Copy)]
pub struct PunctuationSegmenter;

impl SentenceSegmenter for PunctuationSegmenter {
    fn segment(&self, text: &str) -> Result<Vec<String>, PipelineError> {
        let mut sentences = Vec::new();
        let mut start = 0;
        let mut chars = text.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            if !matches!(c, '.' | '!' | '?') {
                continue;
            }
            let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
            if at_boundary {
                let end = i + c.len_utf8();
                push_sentence(&mut sentences, &text[start..end]);
                start = end;
            }
        }
        push_sentence(&mut sentences, &text[start..]);

        Ok(sentences)
    }
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}
