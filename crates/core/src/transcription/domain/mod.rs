pub mod timed_segment;
pub mod timestamp_parser;
pub mod transcription_engine;
