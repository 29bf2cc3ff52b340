//! Noise removal for transcripts, OCR output and pasted notes.

use once_cell::sync::Lazy;
use regex::Regex;

use super::CleaningLevel;

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("cleaner patterns are valid regexes")
}

static BRACKETED: Lazy<Regex> = Lazy::new(|| pattern(r"\[.*?\]"));
static TIMESTAMP: Lazy<Regex> = Lazy::new(|| pattern(r"\b\d{1,2}:\d{2}(?::\d{2})?\b"));
static ELLIPSIS: Lazy<Regex> = Lazy::new(|| pattern(r"\.\.\."));
static REPEATED_TERMINAL: Lazy<Regex> = Lazy::new(|| pattern(r"([.!?]){2,}"));

static FILLER: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)\b(?:uh|um|erm|you know|like|so|well)\b[,\s]*"));
static WORD: Lazy<Regex> = Lazy::new(|| pattern(r"\w+"));
static HANGING_CONJUNCTION: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)\b(?:and|or|but)\b(\s*[.!?])"));
static DOUBLE_CONJUNCTION: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)\b(and|or|but)\s+(?:and|or|but)\b"));

static REPEATED_COMMAS: Lazy<Regex> = Lazy::new(|| pattern(r",\s*,+"));
static SPACE_BEFORE_PUNCTUATION: Lazy<Regex> = Lazy::new(|| pattern(r"\s+([?.!,])"));
static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| pattern(r"\s{2,}"));

/// Clean raw text before sentence segmentation.
///
/// Rule order matters: structural noise (annotations, time codes, runaway
/// punctuation) goes first, then the strict-only disfluency rules, then the
/// spacing fix-ups that tidy whatever the earlier rules left behind.
/// Returns an empty string when nothing survives.
pub fn clean_text(text: &str, level: CleaningLevel) -> String {
    let text = BRACKETED.replace_all(text, "");
    let text = TIMESTAMP.replace_all(&text, "");
    let text = ELLIPSIS.replace_all(&text, " ... ");
    let mut text = REPEATED_TERMINAL.replace_all(&text, "$1").into_owned();

    if level == CleaningLevel::Strict {
        text = strip_disfluencies(&text);
    }

    let text = REPEATED_COMMAS.replace_all(&text, ",");
    let text = SPACE_BEFORE_PUNCTUATION.replace_all(&text, "$1");
    let text = MULTI_SPACE.replace_all(&text, " ");

    text.trim().to_string()
}

/// Strict-only rules for spoken-language artifacts.
fn strip_disfluencies(text: &str) -> String {
    let text = FILLER.replace_all(text, "");
    let text = collapse_repeated_words(&text);
    let text = HANGING_CONJUNCTION.replace_all(&text, "$1");
    DOUBLE_CONJUNCTION.replace_all(&text, "$1").into_owned()
}

/// Collapse "the the THE" style stutters to the first occurrence.
///
/// Only words separated by pure whitespace count as repeats.
fn collapse_repeated_words(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut last_end = 0;
    let mut previous: Option<&str> = None;

    for word in WORD.find_iter(text) {
        let gap = &text[last_end..word.start()];
        let repeated = previous.is_some_and(|prev| {
            !gap.is_empty()
                && gap.chars().all(char::is_whitespace)
                && prev.to_lowercase() == word.as_str().to_lowercase()
        });

        if !repeated {
            result.push_str(gap);
            result.push_str(word.as_str());
            previous = Some(word.as_str());
        }
        last_end = word.end();
    }

    result.push_str(&text[last_end..]);
    result
}
