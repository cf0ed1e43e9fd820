pub mod whisper_cli_engine;
pub mod whisper_rs_engine;
