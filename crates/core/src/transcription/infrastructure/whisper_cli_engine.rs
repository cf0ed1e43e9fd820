use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::transcription::domain::transcription_engine::TranscriptionEngine;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Lines of whisper-cli stderr/stdout that are diagnostics, not transcript.
const DIAGNOSTIC_MARKERS: &[&str] = &[
    "whisper_init",
    "processing",
    "system info",
    "load time",
    "sample time",
    "encode time",
];

/// Speech-to-text engine driving the external `whisper-cli` binary.
///
/// The subprocess runs under a hard timeout; a timed-out or failed invocation
/// yields an empty transcript rather than an error, so the session continues.
pub struct WhisperCliEngine {
    executable: PathBuf,
    model_path: PathBuf,
    timeout: Duration,
}

impl WhisperCliEngine {
    pub fn new(executable: &Path, model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if !executable.exists() {
            return Err(format!("whisper executable not found at: {}", executable.display()).into());
        }
        if !model_path.exists() {
            return Err(format!("whisper model not found at: {}", model_path.display()).into());
        }
        Ok(Self {
            executable: executable.to_path_buf(),
            model_path: model_path.to_path_buf(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs the child under `self.timeout`, killing it on expiry.
    /// Returns `(stdout, stderr, success)`; a timeout counts as failure.
    fn run_with_timeout(
        &self,
        mut cmd: Command,
    ) -> Result<(String, String, bool), Box<dyn std::error::Error>> {
        let mut child = cmd.stdout(Stdio::piped()).stderr(Stdio::piped()).spawn()?;

        // Drain pipes on their own threads so a chatty child can't block on
        // a full pipe buffer while we poll for exit.
        let mut stdout_pipe = child.stdout.take().expect("stdout was piped");
        let mut stderr_pipe = child.stderr.take().expect("stderr was piped");
        let stdout_handle = std::thread::spawn(move || {
            let mut buf = String::new();
            let _ = stdout_pipe.read_to_string(&mut buf);
            buf
        });
        let stderr_handle = std::thread::spawn(move || {
            let mut buf = String::new();
            let _ = stderr_pipe.read_to_string(&mut buf);
            buf
        });

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait()? {
                Some(status) => break Some(status),
                None if Instant::now() >= deadline => {
                    log::error!(
                        "whisper-cli exceeded {}s timeout, killing",
                        self.timeout.as_secs()
                    );
                    let _ = child.kill();
                    let _ = child.wait();
                    break None;
                }
                None => std::thread::sleep(POLL_INTERVAL),
            }
        };

        let stdout = stdout_handle.join().unwrap_or_default();
        let stderr = stderr_handle.join().unwrap_or_default();
        let success = status.map(|s| s.success()).unwrap_or(false);
        Ok((stdout, stderr, success))
    }
}

impl TranscriptionEngine for WhisperCliEngine {
    fn transcribe_file(
        &self,
        wav_path: &Path,
        language: &str,
    ) -> Result<String, Box<dyn std::error::Error>> {
        let mut cmd = Command::new(&self.executable);
        cmd.arg("-m")
            .arg(&self.model_path)
            .arg("-f")
            .arg(wav_path)
            .arg("-l")
            .arg(language)
            .arg("--output-txt")
            .arg("-t")
            .arg("4");

        log::info!("Transcribing: {}", wav_path.display());
        let started = Instant::now();

        let (stdout, stderr, success) = self.run_with_timeout(cmd)?;
        if !success {
            log::error!("whisper-cli failed: {}", stderr.trim());
            return Ok(String::new());
        }

        let transcript = clean_output(&stdout);
        log::info!(
            "Transcribed in {:.1}s ({} characters)",
            started.elapsed().as_secs_f64(),
            transcript.len()
        );
        Ok(transcript)
    }
}

/// Extracts transcript text from raw whisper-cli stdout.
///
/// Timestamped lines contribute their text portion; known diagnostic lines
/// are dropped; remaining free-form lines are kept as-is. All whitespace is
/// collapsed to single spaces.
fn clean_output(raw: &str) -> String {
    let mut parts: Vec<String> = Vec::new();

    for line in raw.trim().lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.contains("-->") {
            if let Some(bracket_end) = line.find(']') {
                let text = line[bracket_end + 1..].trim();
                if !text.is_empty() {
                    parts.push(text.to_string());
                }
            }
            continue;
        }

        let lower = line.to_lowercase();
        if DIAGNOSTIC_MARKERS.iter().any(|m| lower.contains(m)) {
            continue;
        }

        if line.len() > 1 {
            parts.push(line.to_string());
        }
    }

    parts
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
