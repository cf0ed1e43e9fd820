use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::{WHISPER_MODEL_NAME, WHISPER_MODEL_URL};

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create model directory: {0}")]
    ModelDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("download stream interrupted: {0}")]
    Stream(#[source] std::io::Error),
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine model directory")]
    NoModelDir,
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Resolves the whisper GGML model, downloading it on first use.
///
/// The model is a fixed quantity of the application; there is exactly one
/// (`ggml-tiny.en.bin`) and it lives in the platform model directory. A
/// cached copy wins; otherwise the model is fetched from Hugging Face into
/// that directory.
pub fn resolve_whisper_model(progress: Option<ProgressFn>) -> Result<PathBuf, ModelResolveError> {
    let dir = model_dir()?;
    resolve_in(&dir, WHISPER_MODEL_URL, progress)
}

fn resolve_in(
    dir: &Path,
    url: &str,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    let model_path = dir.join(WHISPER_MODEL_NAME);
    if model_path.exists() {
        return Ok(model_path);
    }

    log::info!("Whisper model not cached, downloading from {url}");
    fs::create_dir_all(dir).map_err(ModelResolveError::ModelDir)?;
    download(url, &model_path, progress)?;
    Ok(model_path)
}

/// Platform-specific model directory.
///
/// - macOS: `~/Library/Application Support/MeetScribe/models/`
/// - Linux: `$XDG_CACHE_HOME/MeetScribe/models/` or `~/.cache/MeetScribe/models/`
/// - Windows: `%LOCALAPPDATA%/MeetScribe/models/`
pub fn model_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    let base = dirs::data_dir();
    #[cfg(not(target_os = "macos"))]
    let base = dirs::cache_dir();

    base.map(|d| d.join("MeetScribe").join("models"))
        .ok_or(ModelResolveError::NoModelDir)
}

/// Streams the model to `<dest>.part`, renaming into place only once the
/// body is fully written. A failed or interrupted download leaves no file
/// at `dest`.
fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let as_download_err = |e: reqwest::Error| ModelResolveError::Download {
        url: url.to_string(),
        source: e,
    };
    let mut response = reqwest::blocking::get(url)
        .and_then(reqwest::blocking::Response::error_for_status)
        .map_err(as_download_err)?;

    let total = response.content_length().unwrap_or(0);
    let temp_path = dest.with_extension("part");
    let mut file = fs::File::create(&temp_path).map_err(|e| ModelResolveError::Write {
        path: temp_path.clone(),
        source: e,
    })?;

    let mut buf = [0u8; 64 * 1024];
    let mut downloaded: u64 = 0;
    loop {
        let n = response.read(&mut buf).map_err(ModelResolveError::Stream)?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).map_err(|e| ModelResolveError::Write {
            path: temp_path.clone(),
            source: e,
        })?;
        downloaded += n as u64;
        if let Some(ref cb) = progress {
            cb(downloaded, total);
        }
    }

    file.flush().map_err(|e| ModelResolveError::Write {
        path: temp_path.clone(),
        source: e,
    })?;
    drop(file);

    fs::rename(&temp_path, dest).map_err(|e| ModelResolveError::Write {
        path: dest.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const UNREACHABLE_URL: &str = "http://invalid.nonexistent.example.com/model";

    #[test]
    fn test_resolve_returns_cached_model_without_downloading() {
        let tmp = TempDir::new().unwrap();
        let cached = tmp.path().join(WHISPER_MODEL_NAME);
        fs::write(&cached, b"cached model").unwrap();

        // The URL is unreachable, so an Ok result proves the cache was used.
        let resolved = resolve_in(tmp.path(), UNREACHABLE_URL, None).unwrap();
        assert_eq!(resolved, cached);
    }

    #[test]
    fn test_resolve_missing_model_attempts_download() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("models");

        let result = resolve_in(&dir, UNREACHABLE_URL, None);
        assert!(matches!(result, Err(ModelResolveError::Download { .. })));
        // The model directory is created before the fetch is attempted
        assert!(dir.exists());
    }

    #[test]
    fn test_model_dir_returns_path() {
        let path = model_dir().unwrap();
        assert!(path.to_string_lossy().contains("MeetScribe"));
        assert!(path.to_string_lossy().contains("models"));
    }

    #[test]
    fn test_download_atomic_no_partial_on_failure() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("model.bin");
        let _ = download(UNREACHABLE_URL, &dest, None);
        assert!(!dest.exists());
        assert!(!dest.with_extension("part").exists());
    }
}
