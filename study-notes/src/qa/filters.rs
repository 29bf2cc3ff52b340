//! Acceptance rules for generated questions and answers.

use thiserror::Error;

pub const MIN_QUESTION_WORDS: usize = 4;
pub const MIN_ANSWER_WORDS: usize = 2;

/// The model echoed placeholder content instead of asking about the passage.
const BOILERPLATE_MARKER: &str = "sample text";

/// Quiz-style phrasings that make poor flashcards without their options.
const LOW_QUALITY_PATTERNS: &[&str] = &[
    "which of the following",
    "all of the above",
    "none of the above",
];

/// Why a candidate question was not kept.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("does not end with '?'")]
    NotAQuestion,

    #[error("only {0} words")]
    TooShort(usize),

    #[error("contains boilerplate")]
    Boilerplate,

    #[error("matches low-quality pattern {0:?}")]
    LowQuality(&'static str),

    #[error("near-duplicate of {existing:?} (similarity {score:.2})")]
    Duplicate { existing: String, score: f64 },
}

/// Checks that need nothing but the candidate itself, cheapest first.
pub fn check_question_form(question: &str, filter_low_quality: bool) -> Result<(), Rejection> {
    if !question.ends_with('?') {
        return Err(Rejection::NotAQuestion);
    }

    let words = question.split_whitespace().count();
    if words < MIN_QUESTION_WORDS {
        return Err(Rejection::TooShort(words));
    }

    let lowered = question.to_lowercase();
    if lowered.contains(BOILERPLATE_MARKER) {
        return Err(Rejection::Boilerplate);
    }

    if filter_low_quality {
        if let Some(pattern) = LOW_QUALITY_PATTERNS
            .iter()
            .copied()
            .find(|p| lowered.contains(p))
        {
            return Err(Rejection::LowQuality(pattern));
        }
    }

    Ok(())
}

pub fn is_acceptable_answer(answer: &str) -> bool {
    answer.split_whitespace().count() >= MIN_ANSWER_WORDS
}
