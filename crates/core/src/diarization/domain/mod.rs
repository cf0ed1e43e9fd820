pub mod diarization_engine;
pub mod labeled_line;
pub mod speaker_aligner;
pub mod speaker_segment;
