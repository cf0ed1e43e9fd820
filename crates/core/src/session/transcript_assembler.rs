use std::path::Path;

use crate::diarization::domain::diarization_engine::DiarizationEngine;
use crate::diarization::domain::speaker_aligner::SpeakerAligner;
use crate::diarization::domain::speaker_segment::SpeakerSegment;
use crate::transcription::domain::timestamp_parser::TimestampParser;

/// Produces the final transcript body for a session.
///
/// Policy:
/// 1. Streamed entries captured during the live session are the
///    authoritative body (newline-joined; each already carries a wall-clock
///    `[HH:MM:SS]` prefix from capture time). The final-pass transcription is
///    a fallback for sessions where streaming produced nothing, wrapped with
///    a single current-time prefix.
/// 2. Diarization, when enabled, relabels the body line by line. Every
///    diarization failure mode degrades to the unlabeled body: an engine
///    error is caught and logged, and a body with no parseable timestamps is
///    returned unchanged. A transcript is never lost to diarization.
pub struct TranscriptAssembler;

impl TranscriptAssembler {
    pub fn assemble(
        streamed_entries: &[String],
        final_pass_text: &str,
        diarizer: Option<&mut dyn DiarizationEngine>,
        wav_path: &Path,
    ) -> String {
        let body = choose_body(streamed_entries, final_pass_text);

        match diarizer {
            Some(engine) => Self::label_speakers(engine, wav_path, &body),
            None => body,
        }
    }

    /// Relabels an already-assembled body with speaker names. Exposed so the
    /// session can persist the unlabeled body first and relabel afterwards.
    pub fn label_speakers(
        engine: &mut dyn DiarizationEngine,
        wav_path: &Path,
        body: &str,
    ) -> String {
        let turns = match engine.diarize(wav_path) {
            Ok(turns) => turns,
            Err(e) => {
                log::warn!("Diarization failed, keeping unlabeled transcript: {e}");
                return body.to_string();
            }
        };

        let transcript_segments = TimestampParser::parse(body);
        if transcript_segments.is_empty() {
            log::warn!("No timestamped segments found; returning unlabeled transcript");
            return body.to_string();
        }

        let speaker_segments = SpeakerSegment::normalize(&turns);
        let labeled = SpeakerAligner::align(&speaker_segments, &transcript_segments);

        labeled
            .iter()
            .map(|line| line.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn choose_body(streamed_entries: &[String], final_pass_text: &str) -> String {
    if !streamed_entries.is_empty() {
        return streamed_entries.join("\n");
    }

    let final_pass = final_pass_text.trim();
    if final_pass.is_empty() {
        return String::new();
    }
    format!("{} {}", wall_clock_stamp(), final_pass)
}

/// Current wall-clock time as a `[HH:MM:SS]` prefix, the same format the
/// real-time loop stamps streamed entries with.
pub fn wall_clock_stamp() -> String {
    chrono::Local::now().format("[%H:%M:%S]").to_string()
}
