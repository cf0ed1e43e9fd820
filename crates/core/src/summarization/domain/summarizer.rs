use super::prompt_builder::PromptBuilder;
use super::summary_format::SummaryFormat;

/// Domain interface for LLM text generation.
///
/// `None` means the engine could not produce text (timeout, bad status,
/// malformed response); the caller decides how to degrade.
pub trait SummaryEngine: Send {
    fn generate(&self, prompt: &str) -> Option<String>;
}

/// Minimum transcript length worth sending to the model.
const MIN_TRANSCRIPT_CHARS: usize = 10;

pub const EMPTY_TRANSCRIPT_SUMMARY: &str =
    "# Meeting Summary\n\nNo transcript available to summarize.";
pub const FAILED_SUMMARY: &str = "# Meeting Summary\n\nFailed to generate summary.";

/// Generates meeting summaries through a [`SummaryEngine`].
///
/// Engine failure never propagates: an empty transcript or a failed
/// generation both yield a fixed placeholder document, so the session always
/// ends with a summary artifact.
pub struct Summarizer {
    engine: Box<dyn SummaryEngine>,
    format: SummaryFormat,
}

impl Summarizer {
    pub fn new(engine: Box<dyn SummaryEngine>, format: SummaryFormat) -> Self {
        Self { engine, format }
    }

    pub fn generate_summary(&self, transcript: &str, duration_minutes: Option<u64>) -> String {
        if transcript.trim().len() < MIN_TRANSCRIPT_CHARS {
            return EMPTY_TRANSCRIPT_SUMMARY.to_string();
        }

        let date = chrono::Local::now().format("%B %d, %Y").to_string();
        let prompt = PromptBuilder::build(self.format, transcript, duration_minutes, &date);

        log::info!(
            "Generating {} summary ({} chars)",
            self.format,
            transcript.len()
        );

        match self.engine.generate(&prompt) {
            Some(summary) if !summary.trim().is_empty() => summary,
            _ => {
                log::warn!("Summary generation failed");
                FAILED_SUMMARY.to_string()
            }
        }
    }
}
