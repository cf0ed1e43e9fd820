pub mod audio;
pub mod diarization;
pub mod session;
pub mod shared;
pub mod summarization;
pub mod transcription;
