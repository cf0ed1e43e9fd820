pub mod recording_session;
pub mod session_observer;
pub mod transcript_artifact;
pub mod transcript_assembler;
