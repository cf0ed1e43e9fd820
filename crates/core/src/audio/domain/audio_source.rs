use crossbeam_channel::Receiver;

/// Stream of capture buffers, consumed by the real-time transcription loop.
pub type ChunkReceiver = Receiver<Vec<i16>>;

/// Domain interface for microphone capture.
///
/// `start` returns the receiving end of a bounded buffer queue; the capture
/// backend is the only producer, the real-time loop the only consumer.
/// `stop` tears down the stream and returns every sample captured during the
/// session, in order, for WAV persistence.
///
/// Implementations are driven from the controlling thread only; the returned
/// receiver is what crosses into the worker thread.
pub trait AudioSource {
    fn start(&mut self) -> Result<ChunkReceiver, Box<dyn std::error::Error>>;

    fn stop(&mut self) -> Result<Vec<i16>, Box<dyn std::error::Error>>;

    /// Sample rate of the produced buffers, in Hz.
    fn sample_rate(&self) -> u32;
}
