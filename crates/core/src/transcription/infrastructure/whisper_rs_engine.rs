use std::path::{Path, PathBuf};

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::audio::infrastructure::wav_file;
use crate::transcription::domain::transcription_engine::TranscriptionEngine;

/// In-process speech-to-text engine using whisper.cpp via whisper-rs.
///
/// Alternative to [`WhisperCliEngine`](super::whisper_cli_engine::WhisperCliEngine)
/// for installs without the external binary. Holds only the model path; the
/// whisper context is created per call so the engine stays `Send`.
#[derive(Debug)]
pub struct WhisperRsEngine {
    model_path: PathBuf,
}

impl WhisperRsEngine {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if !model_path.exists() {
            return Err(format!("whisper model not found at: {}", model_path.display()).into());
        }
        Ok(Self {
            model_path: model_path.to_path_buf(),
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl TranscriptionEngine for WhisperRsEngine {
    fn transcribe_file(
        &self,
        wav_path: &Path,
        language: &str,
    ) -> Result<String, Box<dyn std::error::Error>> {
        let samples = wav_file::read_mono_f32(wav_path)?;
        if samples.is_empty() {
            return Ok(String::new());
        }

        let ctx = WhisperContext::new_with_params(
            self.model_path.to_str().ok_or("Invalid model path")?,
            WhisperContextParameters::default(),
        )
        .map_err(|e| format!("Failed to load Whisper model: {e}"))?;

        let mut state = ctx
            .create_state()
            .map_err(|e| format!("Failed to create Whisper state: {e}"))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 0 });
        params.set_language(Some(language));
        params.set_translate(false);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_n_threads(num_cpus().min(4) as i32);

        state
            .full(params, &samples)
            .map_err(|e| format!("Whisper inference failed: {e}"))?;

        let mut text = String::new();
        let num_segments = state.full_n_segments();

        for seg_idx in 0..num_segments {
            let segment = match state.get_segment(seg_idx) {
                Some(s) => s,
                None => continue,
            };

            let n_tokens = segment.n_tokens();
            for tok_idx in 0..n_tokens {
                let token = match segment.get_token(tok_idx) {
                    Some(t) => t,
                    None => continue,
                };

                let piece = match token.to_str() {
                    Ok(t) => t,
                    Err(_) => continue,
                };

                // Special tokens look like [_BEG_] or <|endoftext|>
                let trimmed = piece.trim();
                if trimmed.is_empty() || trimmed.starts_with('[') || trimmed.starts_with('<') {
                    continue;
                }

                text.push_str(piece);
            }
        }

        Ok(text.split_whitespace().collect::<Vec<_>>().join(" "))
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_nonexistent_path_returns_error() {
        let result = WhisperRsEngine::new(Path::new("/nonexistent/model.bin"));
        assert!(result.is_err());
    }

    #[test]
    fn test_new_nonexistent_path_error_message() {
        let result = WhisperRsEngine::new(Path::new("/nonexistent/model.bin"));
        let err = result.unwrap_err().to_string();
        assert!(
            err.contains("not found"),
            "Expected 'not found' in error, got: {err}"
        );
    }
}
