use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::diarization::domain::diarization_engine::DiarizationEngine;
use crate::diarization::domain::speaker_segment::SpeakerTurn;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Diarization engine driving an external command (typically a small
/// pyannote wrapper script).
///
/// Contract: the command is invoked as `<command> <wav_path>` and prints one
/// turn per stdout line as `start end speaker_id` (whitespace-separated,
/// times in seconds). Malformed lines are skipped like parser noise.
///
/// The subprocess runs under a hard timeout; a wedged diarizer is killed and
/// reported as an error, which callers degrade to an unlabeled transcript.
pub struct ExternalDiarizer {
    command: PathBuf,
    hf_token: Option<String>,
    timeout: Duration,
    ready: bool,
}

impl ExternalDiarizer {
    pub fn new(command: &Path, hf_token: Option<String>) -> Self {
        Self {
            command: command.to_path_buf(),
            hf_token,
            timeout: DEFAULT_TIMEOUT,
            ready: false,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs the child under `self.timeout`, killing it on expiry.
    fn run_with_timeout(
        &self,
        mut cmd: Command,
    ) -> Result<(String, String), Box<dyn std::error::Error>> {
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
                Some(status) => break status,
                None if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    let _ = stdout_handle.join();
                    let _ = stderr_handle.join();
                    return Err(format!(
                        "diarizer timed out after {}s",
                        self.timeout.as_secs()
                    )
                    .into());
                }
                None => std::thread::sleep(POLL_INTERVAL),
            }
        };

        let stdout = stdout_handle.join().unwrap_or_default();
        let stderr = stderr_handle.join().unwrap_or_default();
        if !status.success() {
            return Err(format!("diarizer failed: {}", stderr.trim()).into());
        }
        Ok((stdout, stderr))
    }
}

impl DiarizationEngine for ExternalDiarizer {
    fn ensure_ready(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if self.ready {
            return Ok(());
        }
        if !self.command.exists() {
            return Err(format!(
                "diarizer command not found at: {}",
                self.command.display()
            )
            .into());
        }
        self.ready = true;
        Ok(())
    }

    fn diarize(&mut self, wav_path: &Path) -> Result<Vec<SpeakerTurn>, Box<dyn std::error::Error>> {
        self.ensure_ready()?;

        log::info!("Running diarization on {}", wav_path.display());

        let mut cmd = Command::new(&self.command);
        cmd.arg(wav_path);
        if let Some(ref token) = self.hf_token {
            cmd.env("HUGGINGFACE_TOKEN", token);
        }

        let (stdout, _stderr) = self.run_with_timeout(cmd)?;
        let turns = parse_turns(&stdout);
        log::info!("Diarization complete: {} segments", turns.len());
        Ok(turns)
    }
}

fn parse_turns(stdout: &str) -> Vec<SpeakerTurn> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let start: f64 = fields.next()?.parse().ok()?;
            let end: f64 = fields.next()?.parse().ok()?;
            let label = fields.next()?;
            if end < start {
                return None;
            }
            Some(SpeakerTurn::new(start, end, label))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn script(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("diarize.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[test]
    fn test_parse_turns_well_formed() {
        let turns = parse_turns("0.0 4.5 SPEAKER_00\n4.5 9.0 SPEAKER_01\n");
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0], SpeakerTurn::new(0.0, 4.5, "SPEAKER_00"));
        assert_eq!(turns[1], SpeakerTurn::new(4.5, 9.0, "SPEAKER_01"));
    }

    #[test]
    fn test_parse_turns_skips_malformed_lines() {
        let turns = parse_turns("not a turn\n1.0 2.0 SPEAKER_00\n3.0 oops SPEAKER_01\n");
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].label, "SPEAKER_00");
    }

    #[test]
    fn test_parse_turns_rejects_inverted_interval() {
        let turns = parse_turns("5.0 2.0 SPEAKER_00\n");
        assert!(turns.is_empty());
    }

    #[test]
    fn test_parse_turns_empty_input() {
        assert!(parse_turns("").is_empty());
    }

    #[test]
    fn test_ensure_ready_missing_command_fails() {
        let mut d = ExternalDiarizer::new(Path::new("/nonexistent/diarize"), None);
        assert!(d.ensure_ready().is_err());
    }

    #[test]
    fn test_ensure_ready_is_idempotent() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let mut d = ExternalDiarizer::new(tmp.path(), None);
        assert!(d.ensure_ready().is_ok());
        assert!(d.ensure_ready().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_diarize_runs_command_and_parses_output() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cmd = script(tmp.path(), "echo '0.0 2.0 SPEAKER_00'\necho '2.0 4.0 SPEAKER_01'");
        let mut d = ExternalDiarizer::new(&cmd, None);

        let turns = d.diarize(Path::new("session.wav")).unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].label, "SPEAKER_01");
    }

    #[cfg(unix)]
    #[test]
    fn test_diarize_kills_wedged_command_on_timeout() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cmd = script(tmp.path(), "sleep 30");
        let mut d =
            ExternalDiarizer::new(&cmd, None).with_timeout(Duration::from_millis(200));

        let started = Instant::now();
        let result = d.diarize(Path::new("session.wav"));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("timed out"), "unexpected error: {err}");
        // Returned promptly instead of waiting out the child
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    fn test_diarize_nonzero_exit_is_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cmd = script(tmp.path(), "echo 'model load failed' >&2\nexit 1");
        let mut d = ExternalDiarizer::new(&cmd, None);

        let err = d.diarize(Path::new("session.wav")).unwrap_err().to_string();
        assert!(err.contains("model load failed"), "unexpected error: {err}");
    }
}
