//! Highlight-driven question generation with run-wide deduplication.

use llm_client::{LlmProvider, LlmRequest};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::filters::{Rejection, check_question_form, is_acceptable_answer};
use super::prompts::{ANSWER_SYSTEM_PROMPT, QUESTION_SYSTEM_PROMPT, answer_prompt, highlight_prompt};
use super::similarity::{SequenceRatio, SimilarityScorer};
use super::{QaPair, StudyItem};
use crate::error::PipelineError;
use crate::text::SentenceSegmenter;

pub const DEFAULT_DUPLICATE_THRESHOLD: f64 = 0.80;

const QUESTION_SERVICE: &str = "question model";
const ANSWER_SERVICE: &str = "answer model";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSettings {
    /// Upper bound on accepted questions per chunk
    #[serde(default = "default_questions_per_chunk")]
    pub questions_per_chunk: usize,

    /// Ask the answer model for an answer to every accepted question
    #[serde(default = "default_true")]
    pub generate_answers: bool,

    /// Reject quiz-style phrasings such as "which of the following"
    #[serde(default = "default_true")]
    pub filter_low_quality: bool,

    /// Similarity above which a question counts as a duplicate
    #[serde(default = "default_duplicate_threshold")]
    pub duplicate_threshold: f64,

    #[serde(default = "default_question_max_tokens")]
    pub question_max_tokens: u32,

    #[serde(default = "default_answer_max_tokens")]
    pub answer_max_tokens: u32,
}

fn default_questions_per_chunk() -> usize {
    3
}

fn default_true() -> bool {
    true
}

fn default_duplicate_threshold() -> f64 {
    DEFAULT_DUPLICATE_THRESHOLD
}

fn default_question_max_tokens() -> u32 {
    64
}

fn default_answer_max_tokens() -> u32 {
    128
}

impl Default for QuestionSettings {
    fn default() -> Self {
        Self {
            questions_per_chunk: default_questions_per_chunk(),
            generate_answers: true,
            filter_low_quality: true,
            duplicate_threshold: DEFAULT_DUPLICATE_THRESHOLD,
            question_max_tokens: default_question_max_tokens(),
            answer_max_tokens: default_answer_max_tokens(),
        }
    }
}

/// Questions accepted so far in one generation run.
///
/// Owned by the caller and threaded through every chunk, so a question
/// accepted in the first chunk suppresses its near-duplicates in the last.
#[derive(Debug, Default, Clone)]
pub struct SeenQuestions {
    questions: Vec<String>,
}

impl SeenQuestions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, question: String) {
        self.questions.push(question);
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[allow(dead_code)]
    pub fn contains(&self, question: &str) -> bool {
        self.questions.iter().any(|q| q == question)
    }

    /// First earlier question scoring above `threshold`, with its score.
    pub fn find_duplicate(
        &self,
        candidate: &str,
        scorer: &dyn SimilarityScorer,
        threshold: f64,
    ) -> Option<(&str, f64)> {
        self.questions.iter().find_map(|seen| {
            let score = scorer.ratio(candidate, seen);
            (score > threshold).then_some((seen.as_str(), score))
        })
    }
}

/// Generates study items chunk by chunk.
///
/// The question and answer models may be the same provider.
pub struct QuestionGenerator<'a> {
    question_model: &'a dyn LlmProvider,
    answer_model: &'a dyn LlmProvider,
    segmenter: &'a dyn SentenceSegmenter,
    scorer: &'a dyn SimilarityScorer,
    settings: QuestionSettings,
}

impl<'a> QuestionGenerator<'a> {
    pub fn new(
        model: &'a dyn LlmProvider,
        segmenter: &'a dyn SentenceSegmenter,
        settings: QuestionSettings,
    ) -> Self {
        Self {
            question_model: model,
            answer_model: model,
            segmenter,
            scorer: &SequenceRatio,
            settings,
        }
    }

    pub fn with_answer_model(mut self, model: &'a dyn LlmProvider) -> Self {
        self.answer_model = model;
        self
    }

    /// Substitute the similarity measure used for deduplication.
    #[allow(dead_code)]
    pub fn with_scorer(mut self, scorer: &'a dyn SimilarityScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn settings(&self) -> &QuestionSettings {
        &self.settings
    }

    /// Fail fast when a model the run needs cannot serve requests.
    pub fn check_available(&self) -> Result<(), PipelineError> {
        self.question_model
            .is_available()
            .map_err(|e| PipelineError::from_llm(QUESTION_SERVICE, e))?;
        if self.settings.generate_answers {
            self.answer_model
                .is_available()
                .map_err(|e| PipelineError::from_llm(ANSWER_SERVICE, e))?;
        }
        Ok(())
    }

    /// Run every chunk in order against a fresh [`SeenQuestions`].
    ///
    /// `on_chunk` is called after each chunk with the number of items so far.
    pub async fn generate<S, F>(
        &self,
        chunks: &[S],
        mut on_chunk: F,
    ) -> Result<Vec<StudyItem>, PipelineError>
    where
        S: AsRef<str>,
        F: FnMut(usize),
    {
        self.check_available()?;

        let mut seen = SeenQuestions::new();
        let mut items = Vec::new();
        for chunk in chunks {
            items.extend(self.process_chunk(chunk.as_ref(), &mut seen).await?);
            on_chunk(items.len());
        }
        debug!("{} distinct questions accepted", seen.len());
        Ok(items)
    }

    /// Generate up to `questions_per_chunk` items for one chunk.
    ///
    /// Every accepted question is recorded in `seen`. Only fatal errors are
    /// returned; anything scoped to a sentence or this chunk is logged and
    /// skipped.
    pub async fn process_chunk(
        &self,
        chunk: &str,
        seen: &mut SeenQuestions,
    ) -> Result<Vec<StudyItem>, PipelineError> {
        let mut items = Vec::new();
        if chunk.trim().is_empty() || self.settings.questions_per_chunk == 0 {
            return Ok(items);
        }

        // Segmenters may normalize spacing; keep the chunk in the same form so
        // every sentence can be found again when highlighting.
        let chunk = chunk.split_whitespace().collect::<Vec<_>>().join(" ");
        let chunk = chunk.as_str();

        let sentences = match self.segmenter.segment(chunk) {
            Ok(sentences) => sentences,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!("{}; skipping chunk", e);
                return Ok(items);
            }
        };

        for sentence in &sentences {
            if items.len() >= self.settings.questions_per_chunk {
                break;
            }

            let request = LlmRequest::new(highlight_prompt(chunk, sentence))
                .with_system_prompt(QUESTION_SYSTEM_PROMPT)
                .with_max_tokens(self.settings.question_max_tokens)
                .with_temperature(0.0);
            let Some(question) = self.ask(self.question_model, QUESTION_SERVICE, request).await?
            else {
                continue;
            };

            if let Err(rejection) = self.screen(&question, seen) {
                debug!("Rejected question {:?}: {}", question, rejection);
                continue;
            }

            let item = if self.settings.generate_answers {
                let request = LlmRequest::new(answer_prompt(chunk, &question))
                    .with_system_prompt(ANSWER_SYSTEM_PROMPT)
                    .with_max_tokens(self.settings.answer_max_tokens)
                    .with_temperature(0.0);
                match self.ask(self.answer_model, ANSWER_SERVICE, request).await? {
                    Some(answer) if is_acceptable_answer(&answer) => StudyItem::Pair(QaPair {
                        question: question.clone(),
                        answer,
                    }),
                    other => {
                        debug!("Dropping {:?}: unusable answer {:?}", question, other);
                        continue;
                    }
                }
            } else {
                StudyItem::Question(question.clone())
            };

            seen.push(question);
            items.push(item);
        }

        Ok(items)
    }

    fn screen(&self, question: &str, seen: &SeenQuestions) -> Result<(), Rejection> {
        check_question_form(question, self.settings.filter_low_quality)?;

        if let Some((existing, score)) =
            seen.find_duplicate(question, self.scorer, self.settings.duplicate_threshold)
        {
            return Err(Rejection::Duplicate {
                existing: existing.to_string(),
                score,
            });
        }
        Ok(())
    }

    /// One model call. `Ok(None)` means this call failed but the run goes on.
    async fn ask(
        &self,
        model: &dyn LlmProvider,
        service: &'static str,
        request: LlmRequest,
    ) -> Result<Option<String>, PipelineError> {
        match model.complete(request).await {
            Ok(response) => Ok(Some(response.content.trim().to_string())),
            Err(err) => match PipelineError::from_llm(service, err) {
                fatal if fatal.is_fatal() => Err(fatal),
                skipped => {
                    warn!("{}; skipping sentence", skipped);
                    Ok(None)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qa::prompts::HIGHLIGHT_MARKER;
    use crate::text::PunctuationSegmenter;
    use llm_client::{MockProvider, MockReply};

    struct FixedScore(f64);

    impl SimilarityScorer for FixedScore {
        fn ratio(&self, _a: &str, _b: &str) -> f64 {
            self.0
        }
    }

    fn questions_only() -> QuestionSettings {
        QuestionSettings {
            generate_answers: false,
            ..QuestionSettings::default()
        }
    }

    fn script(replies: &[&str]) -> MockProvider {
        MockProvider::scripted(replies.iter().map(|r| MockReply::text(*r)))
    }

    fn questions(items: &[StudyItem]) -> Vec<&str> {
        items.iter().map(StudyItem::question).collect()
    }

    #[tokio::test]
    async fn test_filters_reject_malformed_candidates() {
        let model = script(&["This is short", "Why?", "Why does AI matter here today?"]);
        let generator = QuestionGenerator::new(&model, &PunctuationSegmenter, questions_only());

        let items = generator
            .generate(
                &["AI is changing software. Models learn from data. It matters today."],
                |_| {},
            )
            .await
            .unwrap();

        assert_eq!(
            items,
            vec![StudyItem::Question("Why does AI matter here today?".to_string())]
        );
        assert_eq!(model.call_count(), 3);
    }

    #[tokio::test]
    async fn test_duplicates_suppressed_across_chunks() {
        let model = script(&[
            "What is the role of AI in healthcare?",
            "What is the role of AI in the healthcare?",
        ]);
        let generator = QuestionGenerator::new(&model, &PunctuationSegmenter, questions_only());

        let items = generator
            .generate(&["AI helps doctors.", "AI helps nurses."], |_| {})
            .await
            .unwrap();

        assert_eq!(questions(&items), vec!["What is the role of AI in healthcare?"]);
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn test_injected_scorer_threshold() {
        let chunk = "AI is a field. AI is studied widely.";

        let model = script(&["What is AI exactly?", "What is AI really about?"]);
        let generator = QuestionGenerator::new(&model, &PunctuationSegmenter, questions_only())
            .with_scorer(&FixedScore(0.85));
        let items = generator.generate(&[chunk], |_| {}).await.unwrap();
        assert_eq!(questions(&items), vec!["What is AI exactly?"]);

        // Exactly at the threshold is still distinct enough
        let model = script(&["What is AI exactly?", "What is AI really about?"]);
        let generator = QuestionGenerator::new(&model, &PunctuationSegmenter, questions_only())
            .with_scorer(&FixedScore(0.80));
        let items = generator.generate(&[chunk], |_| {}).await.unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_seen_questions_find_duplicate() {
        let mut seen = SeenQuestions::new();
        assert!(seen.is_empty());
        seen.push("What is AI?".to_string());

        let hit = seen.find_duplicate("What is AI really?", &FixedScore(0.85), 0.80);
        assert_eq!(hit, Some(("What is AI?", 0.85)));
        assert!(
            seen.find_duplicate("What is AI really?", &FixedScore(0.5), 0.80)
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_per_chunk_limit_and_order() {
        let model = script(&[
            "How fast is the Rust language?",
            "What do machine learning models learn from?",
            "Why are virtual assistants becoming popular?",
            "Where is data privacy a critical concern?",
        ]);
        let settings = QuestionSettings {
            questions_per_chunk: 2,
            ..questions_only()
        };
        let generator = QuestionGenerator::new(&model, &PunctuationSegmenter, settings);

        let items = generator
            .generate(
                &[
                    "Rust is fast. Models learn from data. This third sentence is never asked about.",
                    "Assistants are popular. Privacy matters.",
                ],
                |_| {},
            )
            .await
            .unwrap();

        assert_eq!(
            questions(&items),
            vec![
                "How fast is the Rust language?",
                "What do machine learning models learn from?",
                "Why are virtual assistants becoming popular?",
                "Where is data privacy a critical concern?",
            ]
        );
        assert_eq!(model.call_count(), 4);
    }

    #[tokio::test]
    async fn test_prompts_highlight_each_sentence() {
        let model = MockProvider::always("How fast is the Rust language?");
        let generator = QuestionGenerator::new(&model, &PunctuationSegmenter, questions_only());

        generator
            .generate(&["Rust is fast. Rust is safe."], |_| {})
            .await
            .unwrap();

        assert_eq!(
            model.prompts(),
            vec![
                "generate question: <hl> Rust is fast. <hl> Rust is safe.",
                "generate question: Rust is fast. <hl> Rust is safe. <hl>",
            ]
        );
    }

    #[tokio::test]
    async fn test_model_failure_skips_sentence() {
        let model = MockProvider::scripted([
            MockReply::ApiError("timeout".to_string()),
            MockReply::text("What makes Rust a fast language?"),
        ]);
        let generator = QuestionGenerator::new(&model, &PunctuationSegmenter, questions_only());

        let items = generator
            .generate(&["Rust compiles ahead of time. Rust is fast."], |_| {})
            .await
            .unwrap();

        assert_eq!(questions(&items), vec!["What makes Rust a fast language?"]);
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn test_unavailable_model_is_fatal() {
        let model = MockProvider::unavailable("no endpoint");
        let generator = QuestionGenerator::new(&model, &PunctuationSegmenter, questions_only());

        let err = generator.generate(&["Rust is fast."], |_| {}).await.unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_provider_lost_mid_run_is_fatal() {
        let model = MockProvider::scripted([
            MockReply::text("How fast is the Rust language?"),
            MockReply::Unavailable("connection refused".to_string()),
        ]);
        let generator = QuestionGenerator::new(&model, &PunctuationSegmenter, questions_only());

        let err = generator
            .generate(&["Rust is fast. Rust is safe. Rust is fun."], |_| {})
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::UpstreamUnavailable {
                service: "question model",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_answers_attach_and_bad_answers_discard_candidate() {
        let question_model = script(&[
            "What do machine learning models learn from?",
            "How fast is the Rust language?",
        ]);
        let answer_model = script(&["Data.", "It is very fast."]);
        let generator =
            QuestionGenerator::new(&question_model, &PunctuationSegmenter, QuestionSettings::default())
                .with_answer_model(&answer_model);

        let mut seen = SeenQuestions::new();
        let items = generator
            .process_chunk("Models learn from data. Rust is fast.", &mut seen)
            .await
            .unwrap();

        assert_eq!(
            items,
            vec![StudyItem::Pair(QaPair {
                question: "How fast is the Rust language?".to_string(),
                answer: "It is very fast.".to_string(),
            })]
        );
        assert_eq!(seen.len(), 1);
        assert!(!seen.contains("What do machine learning models learn from?"));
        assert!(answer_model.prompts()[1].contains("Question: How fast is the Rust language?"));
    }

    #[tokio::test]
    async fn test_answer_model_failure_discards_candidate() {
        let question_model = MockProvider::always("How fast is the Rust language?");
        let answer_model = MockProvider::scripted([MockReply::ApiError("overloaded".to_string())]);
        let generator =
            QuestionGenerator::new(&question_model, &PunctuationSegmenter, QuestionSettings::default())
                .with_answer_model(&answer_model);

        let items = generator.generate(&["Rust is fast."], |_| {}).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_zero_questions_per_chunk_makes_no_calls() {
        let model = MockProvider::always("How fast is the Rust language?");
        let settings = QuestionSettings {
            questions_per_chunk: 0,
            ..questions_only()
        };
        let generator = QuestionGenerator::new(&model, &PunctuationSegmenter, settings);

        let items = generator.generate(&["Rust is fast."], |_| {}).await.unwrap();
        assert!(items.is_empty());
        assert_eq!(model.call_count(), 0);
    }

    /// Collapses spacing inside sentences the way the seams detector does.
    struct CollapsingSegmenter;

    impl SentenceSegmenter for CollapsingSegmenter {
        fn segment(&self, text: &str) -> Result<Vec<String>, PipelineError> {
            Ok(PunctuationSegmenter
                .segment(text)?
                .iter()
                .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
                .collect())
        }
    }

    #[tokio::test]
    async fn test_irregular_spacing_still_highlights() {
        let model = MockProvider::always("When did the Rust class begin?");
        let generator = QuestionGenerator::new(&model, &CollapsingSegmenter, questions_only());

        generator
            .generate(&["Dr Smith arrived late.  The  class began."], |_| {})
            .await
            .unwrap();

        let prompts = model.prompts();
        assert_eq!(
            prompts[1],
            "generate question: Dr Smith arrived late. <hl> The class began. <hl>"
        );
        assert!(prompts.iter().all(|p| p.contains(HIGHLIGHT_MARKER)));
    }

    #[tokio::test]
    async fn test_duplicates_ignore_letter_case() {
        let model = script(&[
            "What does the Rust compiler check?",
            "WHAT DOES THE RUST COMPILER CHECK?",
        ]);
        let generator = QuestionGenerator::new(&model, &PunctuationSegmenter, questions_only());

        let items = generator
            .generate(&["Rust checks borrows.", "Rust checks types."], |_| {})
            .await
            .unwrap();

        assert_eq!(questions(&items), vec!["What does the Rust compiler check?"]);
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn test_progress_reported_per_chunk() {
        let model = script(&[
            "Why is the Rust language fast?",
            "What do machine learning models learn from?",
        ]);
        let generator = QuestionGenerator::new(&model, &PunctuationSegmenter, questions_only());

        let mut reported = Vec::new();
        generator
            .generate(&["Rust is fast.", "", "Models learn from data."], |n| {
                reported.push(n)
            })
            .await
            .unwrap();

        assert_eq!(reported, vec![1, 1, 2]);
    }

    #[test]
    fn test_settings_from_toml() {
        let settings: QuestionSettings =
            toml::from_str("questions_per_chunk = 5\ngenerate_answers = false").unwrap();
        assert_eq!(settings.questions_per_chunk, 5);
        assert!(!settings.generate_answers);
        assert!(settings.filter_low_quality);
        assert_eq!(settings.duplicate_threshold, DEFAULT_DUPLICATE_THRESHOLD);
    }
}
