pub const WHISPER_MODEL_NAME: &str = "ggml-tiny.en.bin";
pub const WHISPER_MODEL_URL: &str =
    "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-tiny.en.bin";

/// Whisper expects 16 kHz mono input.
pub const SAMPLE_RATE: u32 = 16000;
pub const CHANNELS: u16 = 1;

/// Length of one real-time transcription window. The point-format timestamp
/// parser uses the same value as the nominal segment duration, so the two
/// stay in sync if the window size changes.
pub const CHUNK_DURATION_SECS: f64 = 10.0;

pub const OLLAMA_API_URL: &str = "http://localhost:11434/api/generate";
pub const OLLAMA_TAGS_URL: &str = "http://localhost:11434/api/tags";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:latest";

pub const TRANSCRIPT_HEADER_TITLE: &str = "Meeting Transcript";
pub const TRANSCRIPT_HEADER_RULE_LEN: usize = 60;
