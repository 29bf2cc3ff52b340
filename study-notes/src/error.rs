//! Error taxonomy for the chunking and question pipeline.

use llm_client::LlmError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// A required service cannot serve the run at all.
    #[error("{service} unavailable: {reason}")]
    UpstreamUnavailable {
        service: &'static str,
        reason: String,
    },

    #[error("Tokenizer failed: {0}")]
    Tokenizer(String),

    #[error("Sentence segmentation failed: {0}")]
    Segmentation(String),

    #[error("Model call failed: {0}")]
    Model(LlmError),
}

impl PipelineError {
    /// Fatal errors end the run; the rest only cost the current item.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PipelineError::UpstreamUnavailable { .. })
    }

    /// Classify a provider error raised while serving `service`.
    pub fn from_llm(service: &'static str, err: LlmError) -> Self {
        if err.is_fatal() {
            PipelineError::UpstreamUnavailable {
                service,
                reason: err.to_string(),
            }
        } else {
            PipelineError::Model(err)
        }
    }
}
