/// One timed utterance from speech recognition.
///
/// Sequence order follows input line order; callers must not assume segments
/// are globally sorted by start time.
#[derive(Clone, Debug, PartialEq)]
pub struct TimedSegment {
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
}

impl TimedSegment {
    pub fn new(start_time: f64, end_time: f64, text: impl Into<String>) -> Self {
        Self {
            start_time,
            end_time,
            text: text.into(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}
