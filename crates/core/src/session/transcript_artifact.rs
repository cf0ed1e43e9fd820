use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::shared::constants::{TRANSCRIPT_HEADER_RULE_LEN, TRANSCRIPT_HEADER_TITLE};

/// Renders the persisted transcript file: a fixed two-line header
/// (title, rule of `=`), a blank line, the body, and a trailing newline.
pub fn render(body: &str) -> String {
    format!(
        "{}\n{}\n\n{}\n",
        TRANSCRIPT_HEADER_TITLE,
        "=".repeat(TRANSCRIPT_HEADER_RULE_LEN),
        body
    )
}

pub fn write(path: &Path, body: &str) -> io::Result<()> {
    fs::write(path, render(body))
}

pub fn transcript_path(dir: &Path, session_id: &str) -> PathBuf {
    dir.join(format!("meeting_{session_id}.txt"))
}

pub fn summary_path(dir: &Path, session_id: &str) -> PathBuf {
    dir.join(format!("meeting_{session_id}_summary.md"))
}

pub fn wav_path(dir: &Path, session_id: &str) -> PathBuf {
    dir.join(format!("meeting_{session_id}.wav"))
}
