//! Question generation from chunks, with quality filters and deduplication.

mod filters;
mod generator;
pub mod prompts;
mod similarity;

use serde::{Deserialize, Serialize};

pub use generator::{QuestionGenerator, QuestionSettings};

/// A question with a generated answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

/// One generated study item: a bare question when answers are disabled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StudyItem {
    Question(String),
    Pair(QaPair),
}

impl StudyItem {
    pub fn question(&self) -> &str {
        match self {
            StudyItem::Question(question) => question,
            StudyItem::Pair(pair) => &pair.question,
        }
    }

    pub fn answer(&self) -> Option<&str> {
        match self {
            StudyItem::Question(_) => None,
            StudyItem::Pair(pair) => Some(&pair.answer),
        }
    }
}
