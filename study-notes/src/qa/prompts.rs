//! Prompt templates for the question and answer models.

use log::debug;

/// Instruction prefix understood by highlight-style question generators.
pub const QUESTION_INSTRUCTION: &str = "generate question: ";

/// Delimiter placed on both sides of the focus sentence.
pub const HIGHLIGHT_MARKER: &str = "<hl>";

pub const QUESTION_SYSTEM_PROMPT: &str = "You write study questions. The passage marks one \
sentence between <hl> tags. Reply with a single question about that sentence and nothing else.";

pub const ANSWER_SYSTEM_PROMPT: &str = "You answer study questions using only the given \
context. Reply with the answer in one or two sentences and nothing else.";

/// Wrap the first occurrence of `sentence` in highlight markers.
///
/// Later repeats of the same sentence stay untouched. If the sentence is not
/// found the context is sent without a highlight.
pub fn highlight_prompt(context: &str, sentence: &str) -> String {
    if !context.contains(sentence) {
        debug!("Sentence {:?} not found in chunk; sending it unhighlighted", sentence);
    }
    let highlighted = format!("{HIGHLIGHT_MARKER} {sentence} {HIGHLIGHT_MARKER}");
    format!(
        "{QUESTION_INSTRUCTION}{}",
        context.replacen(sentence, &highlighted, 1)
    )
}

pub fn answer_prompt(context: &str, question: &str) -> String {
    format!(
        "Answer the question based on the context below.\n\nContext: {context}\n\nQuestion: {question}\n\nAnswer:"
    )
}
