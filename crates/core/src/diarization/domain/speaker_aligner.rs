use super::labeled_line::{LabeledLine, UNKNOWN_SPEAKER};
use super::speaker_segment::SpeakerSegment;
use crate::transcription::domain::timed_segment::TimedSegment;

/// Assigns speaker labels to transcript segments by maximal temporal overlap.
pub struct SpeakerAligner;

impl SpeakerAligner {
    /// For each transcript segment, picks the speaker segment with the
    /// greatest overlap duration. Comparison is strict, so exact ties keep
    /// the first speaker segment in input order. Segments with no positive
    /// overlap get the `"Unknown"` label.
    ///
    /// The result always has one line per transcript segment, in input
    /// order; alignment never drops a transcribed segment.
    pub fn align(
        speaker_segments: &[SpeakerSegment],
        transcript_segments: &[TimedSegment],
    ) -> Vec<LabeledLine> {
        transcript_segments
            .iter()
            .map(|t| {
                let mut best_speaker = UNKNOWN_SPEAKER;
                let mut best_overlap = 0.0;

                for s in speaker_segments {
                    let overlap_start = t.start_time.max(s.start_time);
                    let overlap_end = t.end_time.min(s.end_time);
                    let overlap = (overlap_end - overlap_start).max(0.0);

                    if overlap > best_overlap {
                        best_overlap = overlap;
                        best_speaker = &s.speaker;
                    }
                }

                LabeledLine::new(best_speaker, t.text.clone())
            })
            .collect()
    }
}
