use std::path::Path;

/// Domain interface for speech-to-text transcription of a complete WAV file.
///
/// Implementations return the cleaned transcript text. Engine-level failures
/// (non-zero exit, timeout, no speech) surface as an empty string, not an
/// error, so a bad invocation degrades the session instead of aborting it.
/// `Err` is reserved for conditions the caller cannot continue past, such as
/// an unreadable input file.
pub trait TranscriptionEngine: Send {
    fn transcribe_file(
        &self,
        wav_path: &Path,
        language: &str,
    ) -> Result<String, Box<dyn std::error::Error>>;
}
