use std::path::Path;

use super::speaker_segment::SpeakerTurn;

/// Domain interface for speaker diarization of a complete WAV file.
///
/// Engines are heavyweight (model load measured in seconds), so the
/// lifecycle is explicit and two-phase: construct cheaply, then call
/// [`ensure_ready`](DiarizationEngine::ensure_ready) before the first
/// [`diarize`](DiarizationEngine::diarize). `ensure_ready` is idempotent;
/// calling it again after success is a no-op.
///
/// `diarize` returns raw engine turns. Label normalization is the caller's
/// job, via [`SpeakerSegment::normalize`](super::speaker_segment::SpeakerSegment::normalize).
pub trait DiarizationEngine: Send {
    fn ensure_ready(&mut self) -> Result<(), Box<dyn std::error::Error>>;

    fn diarize(&mut self, wav_path: &Path) -> Result<Vec<SpeakerTurn>, Box<dyn std::error::Error>>;
}
