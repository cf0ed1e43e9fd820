use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::audio::domain::audio_source::{AudioSource, ChunkReceiver};
use crate::audio::infrastructure::wav_file;
use crate::diarization::domain::diarization_engine::DiarizationEngine;
use crate::session::session_observer::SessionObserver;
use crate::session::transcript_artifact;
use crate::session::transcript_assembler::{wall_clock_stamp, TranscriptAssembler};
use crate::shared::constants::CHUNK_DURATION_SECS;
use crate::summarization::domain::summarizer::Summarizer;
use crate::transcription::domain::transcription_engine::TranscriptionEngine;

const RECV_POLL_INTERVAL: Duration = Duration::from_millis(200);

type SendError = Box<dyn std::error::Error + Send + Sync>;

/// Artifact paths produced by a completed session.
#[derive(Debug)]
pub struct SessionOutcome {
    pub transcript_path: PathBuf,
    pub summary_path: Option<PathBuf>,
    pub wav_path: PathBuf,
}

/// Resources handed to the real-time worker and returned through its join,
/// so post-processing can take ownership after the live loop has exited.
type WorkerResult = (
    Vec<String>,
    Box<dyn TranscriptionEngine>,
    Box<dyn SessionObserver>,
);

/// Controls one recording session end to end.
///
/// `start` begins capture and spawns a worker thread that transcribes the
/// audio in fixed-length windows, stamping each result with the wall-clock
/// time. `stop` tears down capture, persists the session WAV, and hands the
/// remaining work (final transcription pass, diarization, summary) to a
/// detached post-processing thread so the caller is not blocked on model
/// inference. The returned handle can be joined for the artifact paths or
/// dropped to let processing finish in the background.
pub struct RecordingSession {
    session_id: String,
    language: String,
    output_dir: PathBuf,
    audio: Box<dyn AudioSource>,
    engine: Option<Box<dyn TranscriptionEngine>>,
    observer: Option<Box<dyn SessionObserver>>,
    summarizer: Option<Summarizer>,
    diarizer: Option<Box<dyn DiarizationEngine>>,
    cancelled: Arc<AtomicBool>,
    worker: Option<JoinHandle<WorkerResult>>,
    started_at: Option<Instant>,
}

impl RecordingSession {
    pub fn new(
        audio: Box<dyn AudioSource>,
        engine: Box<dyn TranscriptionEngine>,
        observer: Box<dyn SessionObserver>,
        summarizer: Option<Summarizer>,
        diarizer: Option<Box<dyn DiarizationEngine>>,
        language: impl Into<String>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            // Artifact names are meeting_<id>.{wav,txt} / meeting_<id>_summary.md
            session_id: chrono::Local::now().format("%Y%m%d_%H%M%S").to_string(),
            language: language.into(),
            output_dir: output_dir.into(),
            audio,
            engine: Some(engine),
            observer: Some(observer),
            summarizer,
            diarizer,
            cancelled: Arc::new(AtomicBool::new(false)),
            worker: None,
            started_at: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn start(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if self.worker.is_some() {
            return Err("Recording session already running".into());
        }
        let engine = self
            .engine
            .take()
            .ok_or("Recording session cannot be restarted")?;
        let mut observer = self.observer.take().ok_or("Session observer missing")?;

        let chunk_rx = self.audio.start()?;
        let window_samples =
            (self.audio.sample_rate() as f64 * CHUNK_DURATION_SECS).round() as usize;

        self.cancelled.store(false, Ordering::Relaxed);
        self.started_at = Some(Instant::now());
        observer.status("Recording started");

        self.worker = Some(spawn_realtime_worker(
            chunk_rx,
            engine,
            observer,
            self.language.clone(),
            window_samples,
            self.cancelled.clone(),
        ));
        Ok(())
    }

    /// Stops capture and kicks off post-processing.
    ///
    /// Consumes the session: the live loop is joined without starting any
    /// further engine calls, the full session WAV is written, and a thread
    /// handle for the post-processing work is returned.
    pub fn stop(
        mut self,
    ) -> Result<JoinHandle<Result<SessionOutcome, SendError>>, Box<dyn std::error::Error>> {
        let worker = self.worker.take().ok_or("Recording session not running")?;

        self.cancelled.store(true, Ordering::Relaxed);
        let samples = self.audio.stop()?;

        let (entries, engine, mut observer) = worker
            .join()
            .map_err(|_| "Real-time transcription thread panicked")?;

        std::fs::create_dir_all(&self.output_dir)?;
        let wav_path = transcript_artifact::wav_path(&self.output_dir, &self.session_id);
        wav_file::write_mono_i16(&wav_path, &samples)?;

        observer.status("Recording stopped, processing transcript");

        let duration_minutes = self
            .started_at
            .map(|t| t.elapsed().as_secs() / 60);
        let transcript_path =
            transcript_artifact::transcript_path(&self.output_dir, &self.session_id);
        let summary_path = transcript_artifact::summary_path(&self.output_dir, &self.session_id);
        let language = self.language;
        let summarizer = self.summarizer;
        let diarizer = self.diarizer;

        Ok(std::thread::spawn(move || {
            run_post_processing(
                entries,
                engine,
                observer,
                diarizer,
                summarizer,
                &language,
                wav_path,
                transcript_path,
                summary_path,
                duration_minutes,
            )
        }))
    }
}

fn spawn_realtime_worker(
    chunk_rx: ChunkReceiver,
    engine: Box<dyn TranscriptionEngine>,
    mut observer: Box<dyn SessionObserver>,
    language: String,
    window_samples: usize,
    cancelled: Arc<AtomicBool>,
) -> JoinHandle<WorkerResult> {
    std::thread::spawn(move || {
        let mut buffer: Vec<i16> = Vec::with_capacity(window_samples);
        let mut entries: Vec<String> = Vec::new();

        loop {
            match chunk_rx.recv_timeout(RECV_POLL_INTERVAL) {
                Ok(chunk) => buffer.extend_from_slice(&chunk),
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                    if cancelled.load(Ordering::Relaxed) {
                        break;
                    }
                    continue;
                }
                // Capture side hung up; drain is complete.
                Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
            }

            while buffer.len() >= window_samples {
                // Once stop has flagged the session, no new engine call
                // starts; queued audio is covered by the final pass.
                if cancelled.load(Ordering::Relaxed) {
                    buffer.clear();
                    break;
                }
                let window: Vec<i16> = buffer.drain(..window_samples).collect();
                if let Some(text) = transcribe_window(&*engine, &window, &language) {
                    let entry = format!("{} {}", wall_clock_stamp(), text);
                    observer.partial_transcript(&entry);
                    entries.push(entry);
                }
            }
        }

        // A trailing partial window is left to the final pass over the
        // complete session WAV.
        (entries, engine, observer)
    })
}

/// Transcribes one window of samples through a temp WAV. Any failure is
/// logged and skipped; the live loop must outlive individual bad windows.
fn transcribe_window(
    engine: &dyn TranscriptionEngine,
    samples: &[i16],
    language: &str,
) -> Option<String> {
    let tmp = match tempfile::Builder::new().suffix(".wav").tempfile() {
        Ok(tmp) => tmp,
        Err(e) => {
            log::warn!("Failed to create temp WAV for window: {e}");
            return None;
        }
    };
    if let Err(e) = wav_file::write_mono_i16(tmp.path(), samples) {
        log::warn!("Failed to write window WAV: {e}");
        return None;
    }
    match engine.transcribe_file(tmp.path(), language) {
        Ok(text) => {
            let text = text.trim();
            if text.is_empty() {
                None
            } else {
                Some(text.to_string())
            }
        }
        Err(e) => {
            log::warn!("Window transcription failed: {e}");
            None
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_post_processing(
    entries: Vec<String>,
    engine: Box<dyn TranscriptionEngine>,
    mut observer: Box<dyn SessionObserver>,
    mut diarizer: Option<Box<dyn DiarizationEngine>>,
    summarizer: Option<Summarizer>,
    language: &str,
    wav_path: PathBuf,
    transcript_path: PathBuf,
    summary_path: PathBuf,
    duration_minutes: Option<u64>,
) -> Result<SessionOutcome, SendError> {
    // Streamed entries are authoritative; the full-file pass only runs when
    // the live loop produced nothing.
    let final_pass_text = if entries.is_empty() {
        transcribe_full_session(&*engine, &wav_path, language)
    } else {
        String::new()
    };

    if let Some(d) = diarizer.as_deref_mut() {
        if let Err(e) = d.ensure_ready() {
            log::warn!("Diarization unavailable: {e}");
            diarizer = None;
        }
    }

    // The unlabeled transcript goes to disk before diarization runs, so a
    // stuck or crashing diarizer can never cost the session its transcript.
    let body = TranscriptAssembler::assemble(&entries, &final_pass_text, None, &wav_path);
    transcript_artifact::write(&transcript_path, &body)?;

    let body = match diarizer.as_deref_mut() {
        Some(d) => {
            let labeled = TranscriptAssembler::label_speakers(d, &wav_path, &body);
            if labeled != body {
                transcript_artifact::write(&transcript_path, &labeled)?;
            }
            labeled
        }
        None => body,
    };
    observer.status(&format!("Transcript saved to {}", transcript_path.display()));

    let summary_path = match summarizer {
        Some(summarizer) => {
            observer.status("Generating summary");
            let summary = summarizer.generate_summary(&body, duration_minutes);
            std::fs::write(&summary_path, summary)?;
            observer.status(&format!("Summary saved to {}", summary_path.display()));
            Some(summary_path)
        }
        None => None,
    };

    Ok(SessionOutcome {
        transcript_path,
        summary_path,
        wav_path,
    })
}

fn transcribe_full_session(
    engine: &dyn TranscriptionEngine,
    wav_path: &Path,
    language: &str,
) -> String {
    match engine.transcribe_file(wav_path, language) {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            log::warn!("Final transcription pass failed: {e}");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::session_observer::NullSessionObserver;
    use crate::shared::constants::SAMPLE_RATE;
    use crate::summarization::domain::summarizer::SummaryEngine;
    use crate::summarization::domain::summary_format::SummaryFormat;
    use crossbeam_channel::Sender;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct ScriptedSource {
        chunks: Vec<Vec<i16>>,
        tx: Option<Sender<Vec<i16>>>,
        all: Vec<i16>,
    }

    impl ScriptedSource {
        fn new(chunks: Vec<Vec<i16>>) -> Self {
            Self {
                chunks,
                tx: None,
                all: Vec::new(),
            }
        }
    }

    impl AudioSource for ScriptedSource {
        fn start(&mut self) -> Result<ChunkReceiver, Box<dyn std::error::Error>> {
            let (tx, rx) = crossbeam_channel::bounded(self.chunks.len().max(1));
            for chunk in self.chunks.drain(..) {
                self.all.extend_from_slice(&chunk);
                tx.send(chunk).unwrap();
            }
            self.tx = Some(tx);
            Ok(rx)
        }

        fn stop(&mut self) -> Result<Vec<i16>, Box<dyn std::error::Error>> {
            self.tx = None;
            Ok(std::mem::take(&mut self.all))
        }

        fn sample_rate(&self) -> u32 {
            SAMPLE_RATE
        }
    }

    struct FixedEngine {
        text: String,
    }

    impl TranscriptionEngine for FixedEngine {
        fn transcribe_file(
            &self,
            _wav_path: &Path,
            _language: &str,
        ) -> Result<String, Box<dyn std::error::Error>> {
            Ok(self.text.clone())
        }
    }

    struct CountingEngine {
        calls: Arc<AtomicUsize>,
        text: String,
    }

    impl TranscriptionEngine for CountingEngine {
        fn transcribe_file(
            &self,
            _wav_path: &Path,
            _language: &str,
        ) -> Result<String, Box<dyn std::error::Error>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(self.text.clone())
        }
    }

    /// Delivers its chunks only during `stop`, after the session has already
    /// been flagged as cancelled.
    struct LateChunkSource {
        pending: Vec<Vec<i16>>,
        tx: Option<Sender<Vec<i16>>>,
        all: Vec<i16>,
    }

    impl LateChunkSource {
        fn new(pending: Vec<Vec<i16>>) -> Self {
            Self {
                pending,
                tx: None,
                all: Vec::new(),
            }
        }
    }

    impl AudioSource for LateChunkSource {
        fn start(&mut self) -> Result<ChunkReceiver, Box<dyn std::error::Error>> {
            let (tx, rx) = crossbeam_channel::bounded(self.pending.len().max(1));
            self.tx = Some(tx);
            Ok(rx)
        }

        fn stop(&mut self) -> Result<Vec<i16>, Box<dyn std::error::Error>> {
            if let Some(tx) = self.tx.take() {
                for chunk in self.pending.drain(..) {
                    self.all.extend_from_slice(&chunk);
                    tx.send(chunk).unwrap();
                }
            }
            Ok(std::mem::take(&mut self.all))
        }

        fn sample_rate(&self) -> u32 {
            SAMPLE_RATE
        }
    }

    struct RecordingObserver {
        statuses: Arc<Mutex<Vec<String>>>,
        partials: Arc<Mutex<Vec<String>>>,
    }

    impl SessionObserver for RecordingObserver {
        fn partial_transcript(&mut self, entry: &str) {
            self.partials.lock().unwrap().push(entry.to_string());
        }

        fn status(&mut self, message: &str) {
            self.statuses.lock().unwrap().push(message.to_string());
        }
    }

    fn full_window() -> Vec<i16> {
        vec![100; (SAMPLE_RATE as f64 * CHUNK_DURATION_SECS) as usize]
    }

    fn session(
        source: ScriptedSource,
        engine_text: &str,
        dir: &Path,
    ) -> RecordingSession {
        RecordingSession::new(
            Box::new(source),
            Box::new(FixedEngine {
                text: engine_text.to_string(),
            }),
            Box::new(NullSessionObserver),
            None,
            None,
            "en",
            dir,
        )
    }

    #[test]
    fn test_streamed_window_becomes_timestamped_entry() {
        let dir = TempDir::new().unwrap();
        let partials = Arc::new(Mutex::new(Vec::new()));
        let statuses = Arc::new(Mutex::new(Vec::new()));

        let mut session = RecordingSession::new(
            Box::new(ScriptedSource::new(vec![full_window()])),
            Box::new(FixedEngine {
                text: "hello everyone".to_string(),
            }),
            Box::new(RecordingObserver {
                statuses: statuses.clone(),
                partials: partials.clone(),
            }),
            None,
            None,
            "en",
            dir.path(),
        );

        session.start().unwrap();
        // Live transcription happens on the worker thread; wait for the
        // partial before stopping so the streamed path is what we observe.
        let deadline = Instant::now() + Duration::from_secs(5);
        while partials.lock().unwrap().is_empty() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        let outcome = session.stop().unwrap().join().unwrap().unwrap();

        let transcript = std::fs::read_to_string(&outcome.transcript_path).unwrap();
        assert!(transcript.starts_with("Meeting Transcript\n"));
        assert!(transcript.contains("hello everyone"));

        let partials = partials.lock().unwrap();
        assert_eq!(partials.len(), 1);
        // [HH:MM:SS] prefix then the text
        assert!(partials[0].ends_with("] hello everyone") || partials[0].contains("] hello"));
        assert!(partials[0].starts_with('['));
        assert!(!statuses.lock().unwrap().is_empty());
    }

    #[test]
    fn test_stop_starts_no_new_transcriptions_for_queued_audio() {
        let dir = TempDir::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let partials = Arc::new(Mutex::new(Vec::new()));
        let statuses = Arc::new(Mutex::new(Vec::new()));

        let mut session = RecordingSession::new(
            Box::new(LateChunkSource::new(vec![full_window()])),
            Box::new(CountingEngine {
                calls: calls.clone(),
                text: "caught by the final pass".to_string(),
            }),
            Box::new(RecordingObserver {
                statuses,
                partials: partials.clone(),
            }),
            None,
            None,
            "en",
            dir.path(),
        );

        session.start().unwrap();
        let outcome = session.stop().unwrap().join().unwrap().unwrap();

        // The window that arrived after stop is not live-transcribed; the
        // only engine call is the final pass over the session WAV.
        assert!(partials.lock().unwrap().is_empty());
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        let transcript = std::fs::read_to_string(&outcome.transcript_path).unwrap();
        assert!(transcript.contains("caught by the final pass"));
    }

    #[test]
    fn test_transcript_on_disk_before_diarizer_runs() {
        struct CrashingDiarizer {
            dir: PathBuf,
            saw_transcript: Arc<AtomicBool>,
        }

        impl DiarizationEngine for CrashingDiarizer {
            fn ensure_ready(&mut self) -> Result<(), Box<dyn std::error::Error>> {
                Ok(())
            }

            fn diarize(
                &mut self,
                _: &Path,
            ) -> Result<Vec<crate::diarization::domain::speaker_segment::SpeakerTurn>, Box<dyn std::error::Error>>
            {
                let exists = std::fs::read_dir(&self.dir)
                    .map(|it| {
                        it.filter_map(Result::ok)
                            .any(|e| e.file_name().to_string_lossy().ends_with(".txt"))
                    })
                    .unwrap_or(false);
                self.saw_transcript.store(exists, Ordering::Relaxed);
                Err("inference crashed".into())
            }
        }

        let dir = TempDir::new().unwrap();
        let saw_transcript = Arc::new(AtomicBool::new(false));
        let mut session = RecordingSession::new(
            Box::new(ScriptedSource::new(vec![])),
            Box::new(FixedEngine {
                text: "survives a crashing diarizer".to_string(),
            }),
            Box::new(NullSessionObserver),
            None,
            Some(Box::new(CrashingDiarizer {
                dir: dir.path().to_path_buf(),
                saw_transcript: saw_transcript.clone(),
            })),
            "en",
            dir.path(),
        );

        session.start().unwrap();
        let outcome = session.stop().unwrap().join().unwrap().unwrap();

        assert!(saw_transcript.load(Ordering::Relaxed));
        let transcript = std::fs::read_to_string(&outcome.transcript_path).unwrap();
        assert!(transcript.contains("survives a crashing diarizer"));
    }

    #[test]
    fn test_empty_session_falls_back_to_final_pass() {
        let dir = TempDir::new().unwrap();
        let mut session = session(
            ScriptedSource::new(vec![]),
            "this came from the final pass",
            dir.path(),
        );

        session.start().unwrap();
        let outcome = session.stop().unwrap().join().unwrap().unwrap();

        let transcript = std::fs::read_to_string(&outcome.transcript_path).unwrap();
        assert!(transcript.contains("this came from the final pass"));
    }

    #[test]
    fn test_session_wav_holds_all_captured_samples() {
        let dir = TempDir::new().unwrap();
        let window = full_window();
        let expected = window.len();
        let mut session = session(ScriptedSource::new(vec![window]), "x", dir.path());

        session.start().unwrap();
        let outcome = session.stop().unwrap().join().unwrap().unwrap();

        let samples = wav_file::read_mono_f32(&outcome.wav_path).unwrap();
        assert_eq!(samples.len(), expected);
    }

    #[test]
    fn test_summary_written_when_summarizer_present() {
        struct StubSummary;
        impl SummaryEngine for StubSummary {
            fn generate(&self, _prompt: &str) -> Option<String> {
                Some("## Overview\nshort meeting".to_string())
            }
        }

        let dir = TempDir::new().unwrap();
        let mut session = RecordingSession::new(
            Box::new(ScriptedSource::new(vec![full_window()])),
            Box::new(FixedEngine {
                text: "we discussed the roadmap in detail".to_string(),
            }),
            Box::new(NullSessionObserver),
            Some(Summarizer::new(Box::new(StubSummary), SummaryFormat::Detailed)),
            None,
            "en",
            dir.path(),
        );

        session.start().unwrap();
        let outcome = session.stop().unwrap().join().unwrap().unwrap();

        let summary_path = outcome.summary_path.expect("summary should be written");
        let summary = std::fs::read_to_string(summary_path).unwrap();
        assert!(summary.contains("short meeting"));
    }

    #[test]
    fn test_start_twice_errors() {
        let dir = TempDir::new().unwrap();
        let mut session = session(ScriptedSource::new(vec![]), "x", dir.path());
        session.start().unwrap();
        assert!(session.start().is_err());
        // drain cleanly
        let _ = session.stop().unwrap().join();
    }

    #[test]
    fn test_stop_without_start_errors() {
        let dir = TempDir::new().unwrap();
        let session = session(ScriptedSource::new(vec![]), "x", dir.path());
        assert!(session.stop().is_err());
    }

    #[test]
    fn test_artifact_paths_share_session_id() {
        let dir = TempDir::new().unwrap();
        let mut session = session(ScriptedSource::new(vec![full_window()]), "x", dir.path());
        let id = session.session_id().to_string();
        // <YYYYmmdd>_<HHMMSS>
        assert_eq!(id.len(), 15);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c == '_'));

        session.start().unwrap();
        let outcome = session.stop().unwrap().join().unwrap().unwrap();
        assert!(outcome
            .transcript_path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .contains(&id));
        assert!(outcome
            .wav_path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .contains(&id));
    }
}
