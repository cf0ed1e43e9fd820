/// Label used when no speaker interval overlaps a transcript segment.
pub const UNKNOWN_SPEAKER: &str = "Unknown";

/// One speaker-attributed transcript line.
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledLine {
    pub speaker: String,
    pub text: String,
}

impl LabeledLine {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }
}

impl std::fmt::Display for LabeledLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.speaker, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_format() {
        let line = LabeledLine::new("Speaker 1", "Hello everyone");
        assert_eq!(line.to_string(), "Speaker 1: Hello everyone");
    }
}
