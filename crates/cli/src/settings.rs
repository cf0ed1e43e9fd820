use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use meetscribe_core::shared::constants::DEFAULT_OLLAMA_MODEL;
use meetscribe_core::summarization::domain::summary_format::SummaryFormat;

/// Persistent CLI configuration.
///
/// Resolution order: compiled defaults, then `settings.json` under the
/// platform config directory, then `MEETSCRIBE_*` environment variables.
/// Later layers win. Flags parsed by clap override all of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub language: String,
    pub summary_format: SummaryFormat,
    pub ollama_model: String,
    pub summarize: bool,
    pub diarize: bool,
    /// External diarizer executable; required when `diarize` is on.
    pub diarizer_command: Option<PathBuf>,
    pub hf_token: Option<String>,
    /// External whisper-cli executable. When unset, transcription runs
    /// in-process.
    pub whisper_cli: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            summary_format: SummaryFormat::default(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            summarize: true,
            diarize: false,
            diarizer_command: None,
            hf_token: None,
            whisper_cli: None,
            output_dir: None,
        }
    }
}

impl Settings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("MeetScribe").join("settings.json"))
    }

    pub fn load() -> Self {
        let mut settings: Self = Self::config_path()
            .and_then(|path| fs::read_to_string(path).ok())
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default();
        settings.apply_env(|name| std::env::var(name).ok());
        settings
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            if let Ok(json) = serde_json::to_string_pretty(self) {
                let _ = fs::write(path, json);
            }
        }
    }

    /// Applies `MEETSCRIBE_*` overrides through an injectable lookup.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("MEETSCRIBE_LANGUAGE") {
            self.language = v;
        }
        if let Some(v) = lookup("MEETSCRIBE_SUMMARY_FORMAT") {
            self.summary_format = SummaryFormat::parse(&v);
        }
        if let Some(v) = lookup("MEETSCRIBE_OLLAMA_MODEL") {
            self.ollama_model = v;
        }
        if let Some(v) = lookup("MEETSCRIBE_HF_TOKEN") {
            self.hf_token = Some(v);
        }
        if let Some(v) = lookup("MEETSCRIBE_DIARIZER") {
            self.diarizer_command = Some(PathBuf::from(v));
            self.diarize = true;
        }
        if let Some(v) = lookup("MEETSCRIBE_WHISPER_CLI") {
            self.whisper_cli = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("MEETSCRIBE_OUTPUT_DIR") {
            self.output_dir = Some(PathBuf::from(v));
        }
    }
}
