//! Rendering chunks and study items for the terminal or for import elsewhere.

use anyhow::Result;
use clap::ValueEnum;

use crate::qa::StudyItem;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Numbered, human-readable listing
    #[default]
    Text,
    /// Pretty-printed JSON array
    Json,
    /// Tab-separated rows; question/answer rows import as flashcards
    Tsv,
}

pub fn render_chunks(chunks: &[String], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| format!("Chunk {}:\n{}", i + 1, chunk))
            .collect::<Vec<_>>()
            .join("\n\n"),
        OutputFormat::Json => serde_json::to_string_pretty(chunks)?,
        OutputFormat::Tsv => chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| format!("{}\t{}", i + 1, tsv_field(chunk)))
            .collect::<Vec<_>>()
            .join("\n"),
    })
}

pub fn render_items(items: &[StudyItem], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => items
            .iter()
            .enumerate()
            .map(|(i, item)| match item.answer() {
                Some(answer) => format!("Q{n}: {}\nA{n}: {}", item.question(), answer, n = i + 1),
                None => format!("Q{}: {}", i + 1, item.question()),
            })
            .collect::<Vec<_>>()
            .join("\n\n"),
        OutputFormat::Json => serde_json::to_string_pretty(items)?,
        OutputFormat::Tsv => items
            .iter()
            .map(|item| {
                format!(
                    "{}\t{}",
                    tsv_field(item.question()),
                    tsv_field(item.answer().unwrap_or_default())
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
    })
}

/// Tabs and line breaks would split the row.
fn tsv_field(value: &str) -> String {
    value
        .split(['\t', '\n', '\r'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qa::QaPair;

    fn items() -> Vec<StudyItem> {
        vec![
            StudyItem::Pair(QaPair {
                question: "How fast is the Rust language?".to_string(),
                answer: "It is very fast.\nAlmost C-like.".to_string(),
            }),
            StudyItem::Question("Why does AI matter here today?".to_string()),
        ]
    }

    #[test]
    fn test_render_items_text() {
        let rendered = render_items(&items(), OutputFormat::Text).unwrap();
        assert_eq!(
            rendered,
            "Q1: How fast is the Rust language?\nA1: It is very fast.\nAlmost C-like.\n\nQ2: Why does AI matter here today?"
        );
    }

    #[test]
    fn test_render_items_tsv() {
        let rendered = render_items(&items(), OutputFormat::Tsv).unwrap();
        assert_eq!(
            rendered,
            "How fast is the Rust language?\tIt is very fast. Almost C-like.\nWhy does AI matter here today?\t"
        );
    }

    #[test]
    fn test_render_items_json() {
        let rendered = render_items(&items(), OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed[0]["question"], "How fast is the Rust language?");
        assert_eq!(parsed[1], "Why does AI matter here today?");
    }

    #[test]
    fn test_render_chunks() {
        let chunks = vec!["A is a test.".to_string(), "B\tfollows A.".to_string()];
        assert_eq!(
            render_chunks(&chunks, OutputFormat::Text).unwrap(),
            "Chunk 1:\nA is a test.\n\nChunk 2:\nB\tfollows A."
        );
        assert_eq!(
            render_chunks(&chunks, OutputFormat::Tsv).unwrap(),
            "1\tA is a test.\n2\tB follows A."
        );
        assert!(render_items(&[], OutputFormat::Text).unwrap().is_empty());
    }
}
