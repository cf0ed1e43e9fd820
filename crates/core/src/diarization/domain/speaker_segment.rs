/// One raw turn as reported by a diarization engine, label untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeakerTurn {
    pub start_time: f64,
    pub end_time: f64,
    pub label: String,
}

impl SpeakerTurn {
    pub fn new(start_time: f64, end_time: f64, label: impl Into<String>) -> Self {
        Self {
            start_time,
            end_time,
            label: label.into(),
        }
    }
}

/// A diarized interval with a normalized speaker label.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeakerSegment {
    pub start_time: f64,
    pub end_time: f64,
    pub speaker: String,
}

impl SpeakerSegment {
    pub fn new(start_time: f64, end_time: f64, speaker: impl Into<String>) -> Self {
        Self {
            start_time,
            end_time,
            speaker: speaker.into(),
        }
    }

    /// Maps raw engine labels to `"Speaker 1"`, `"Speaker 2"`, ... assigned
    /// in order of first appearance. Raw diarizer ids (e.g. `SPEAKER_00`)
    /// are an engine detail and never reach the transcript.
    pub fn normalize(turns: &[SpeakerTurn]) -> Vec<SpeakerSegment> {
        let mut label_map: Vec<(String, String)> = Vec::new();
        let mut normalized = Vec::with_capacity(turns.len());

        for turn in turns {
            let speaker = match label_map.iter().find(|(raw, _)| *raw == turn.label) {
                Some((_, mapped)) => mapped.clone(),
                None => {
                    let mapped = format!("Speaker {}", label_map.len() + 1);
                    label_map.push((turn.label.clone(), mapped.clone()));
                    mapped
                }
            };
            normalized.push(SpeakerSegment::new(turn.start_time, turn.end_time, speaker));
        }

        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_assigns_labels_in_first_appearance_order() {
        let turns = vec![
            SpeakerTurn::new(0.0, 4.0, "SPEAKER_01"),
            SpeakerTurn::new(4.0, 8.0, "SPEAKER_00"),
            SpeakerTurn::new(8.0, 12.0, "SPEAKER_01"),
        ];
        let segments = SpeakerSegment::normalize(&turns);
        assert_eq!(segments[0].speaker, "Speaker 1");
        assert_eq!(segments[1].speaker, "Speaker 2");
        assert_eq!(segments[2].speaker, "Speaker 1");
    }

    #[test]
    fn test_normalize_preserves_times() {
        let turns = vec![SpeakerTurn::new(1.5, 3.25, "A")];
        let segments = SpeakerSegment::normalize(&turns);
        assert_eq!(segments[0].start_time, 1.5);
        assert_eq!(segments[0].end_time, 3.25);
    }

    #[test]
    fn test_normalize_empty_input() {
        assert!(SpeakerSegment::normalize(&[]).is_empty());
    }
}
