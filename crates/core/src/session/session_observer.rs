/// Cross-cutting observer for recording-session events.
///
/// Decouples the session controller from specific output mechanisms
/// (stdout, GUI signals) so callers can surface live progress without the
/// core knowing about their UI.
pub trait SessionObserver: Send {
    /// A real-time chunk was transcribed; `entry` carries its wall-clock
    /// timestamp prefix, e.g. `[10:00:23] Hello everyone`.
    fn partial_transcript(&mut self, entry: &str);

    /// Human-readable status message (session started, processing, done).
    fn status(&mut self, message: &str);
}

/// Silent observer that discards all events. Used by tests and headless runs.
pub struct NullSessionObserver;

impl SessionObserver for NullSessionObserver {
    fn partial_transcript(&mut self, _entry: &str) {}
    fn status(&mut self, _message: &str) {}
}
