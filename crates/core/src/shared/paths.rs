use std::fs;
use std::io;
use std::path::PathBuf;

/// Directory where session WAVs, transcripts, and summaries are written.
///
/// - macOS: `~/Library/Application Support/MeetScribe/transcripts/`
/// - Linux: `$XDG_DATA_HOME/MeetScribe/transcripts/` or `~/.local/share/...`
/// - Windows: `%APPDATA%/MeetScribe/transcripts/`
pub fn transcripts_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("MeetScribe").join("transcripts"))
}

/// Like [`transcripts_dir`] but creates the directory if missing.
pub fn ensure_transcripts_dir() -> io::Result<PathBuf> {
    let dir = transcripts_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no platform data directory"))?;
    fs::create_dir_all(&dir)?;
    Ok(dir)
}
