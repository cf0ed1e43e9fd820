use std::sync::OnceLock;

use regex::Regex;

use super::timed_segment::TimedSegment;
use crate::shared::constants::CHUNK_DURATION_SECS;

/// Parses raw speech-recognition output into timed segments.
///
/// Two line formats are recognized, higher-precision first:
///
/// - interval: `[HH:MM:SS.mmm --> HH:MM:SS.mmm] text` (whisper-cli output)
/// - point:    `[HH:MM:SS] text` (real-time chunk entries, stamped with
///   wall-clock time at capture; modeled as a fixed-duration interval since
///   no true end timestamp exists)
///
/// Anything else is expected engine noise and dropped silently. Lines whose
/// text portion is empty after trimming are dropped as well.
pub struct TimestampParser;

fn interval_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\[(\d{2}):(\d{2}):(\d{2})\.(\d{3})\s*-->\s*(\d{2}):(\d{2}):(\d{2})\.(\d{3})\]\s*(.*)$",
        )
        .expect("invalid interval pattern")
    })
}

fn point_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\[(\d{2}):(\d{2}):(\d{2})\]\s*(.*)$").expect("invalid point pattern")
    })
}

impl TimestampParser {
    pub fn parse(raw_text: &str) -> Vec<TimedSegment> {
        let mut segments = Vec::new();

        for line in raw_text.trim().lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(caps) = interval_pattern().captures(line) {
                let start = to_seconds(&caps[1], &caps[2], &caps[3]) + millis(&caps[4]);
                let end = to_seconds(&caps[5], &caps[6], &caps[7]) + millis(&caps[8]);
                let text = caps[9].trim();
                if !text.is_empty() {
                    segments.push(TimedSegment::new(start, end, text));
                }
                continue;
            }

            if let Some(caps) = point_pattern().captures(line) {
                let start = to_seconds(&caps[1], &caps[2], &caps[3]);
                let text = caps[4].trim();
                if !text.is_empty() {
                    segments.push(TimedSegment::new(start, start + CHUNK_DURATION_SECS, text));
                }
            }
        }

        segments
    }
}

fn to_seconds(hours: &str, minutes: &str, seconds: &str) -> f64 {
    // Captures are \d{2}, so parsing cannot fail
    let h: f64 = hours.parse().unwrap_or(0.0);
    let m: f64 = minutes.parse().unwrap_or(0.0);
    let s: f64 = seconds.parse().unwrap_or(0.0);
    h * 3600.0 + m * 60.0 + s
}

fn millis(field: &str) -> f64 {
    field.parse::<f64>().unwrap_or(0.0) / 1000.0
}
