use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;

use crate::audio::domain::audio_source::{AudioSource, ChunkReceiver};
use crate::shared::constants::{CHANNELS, SAMPLE_RATE};

const CHANNEL_CAPACITY: usize = 64;

/// Microphone capture through cpal.
///
/// Buffers are fanned out two ways, mirroring the capture callback contract:
/// appended to the session recording (saved as a WAV at stop) and sent into
/// the bounded chunk channel for the real-time transcription loop. If the
/// loop falls behind and the channel fills, buffers are dropped from the
/// channel only; the session recording always stays complete.
pub struct CpalAudioSource {
    stream: Option<cpal::Stream>,
    frames: Arc<Mutex<Vec<i16>>>,
}

impl CpalAudioSource {
    pub fn new() -> Self {
        Self {
            stream: None,
            frames: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Default for CpalAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for CpalAudioSource {
    fn start(&mut self) -> Result<ChunkReceiver, Box<dyn std::error::Error>> {
        if self.stream.is_some() {
            return Err("already recording".into());
        }

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or("no audio input device available")?;
        log::info!(
            "Using input device: {}",
            device.name().unwrap_or_else(|_| "unknown".into())
        );

        let sample_format = device.default_input_config()?.sample_format();
        let config = cpal::StreamConfig {
            channels: CHANNELS,
            sample_rate: cpal::SampleRate(SAMPLE_RATE),
            buffer_size: cpal::BufferSize::Default,
        };

        let (tx, rx) = crossbeam_channel::bounded::<Vec<i16>>(CHANNEL_CAPACITY);
        self.frames
            .lock()
            .map_err(|_| "capture state poisoned")?
            .clear();

        let frames = self.frames.clone();
        let err_fn = |err| log::error!("audio stream error: {err}");

        let stream = match sample_format {
            cpal::SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    fan_out(data.to_vec(), &frames, &tx);
                },
                err_fn,
                None,
            )?,
            cpal::SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let converted: Vec<i16> = data
                        .iter()
                        .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
                        .collect();
                    fan_out(converted, &frames, &tx);
                },
                err_fn,
                None,
            )?,
            cpal::SampleFormat::U16 => device.build_input_stream(
                &config,
                move |data: &[u16], _: &cpal::InputCallbackInfo| {
                    let converted: Vec<i16> = data.iter().map(|&s| (s as i32 - 32768) as i16).collect();
                    fan_out(converted, &frames, &tx);
                },
                err_fn,
                None,
            )?,
            other => return Err(format!("unsupported sample format: {other:?}").into()),
        };

        stream.play()?;
        self.stream = Some(stream);
        Ok(rx)
    }

    fn stop(&mut self) -> Result<Vec<i16>, Box<dyn std::error::Error>> {
        // Dropping the stream stops capture and closes the channel sender.
        match self.stream.take() {
            Some(stream) => drop(stream),
            None => return Err("not recording".into()),
        }

        let mut frames = self.frames.lock().map_err(|_| "capture state poisoned")?;
        Ok(std::mem::take(&mut *frames))
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }
}

fn fan_out(buffer: Vec<i16>, frames: &Arc<Mutex<Vec<i16>>>, tx: &Sender<Vec<i16>>) {
    if let Ok(mut f) = frames.lock() {
        f.extend_from_slice(&buffer);
    }
    if tx.try_send(buffer).is_err() {
        // Transcription loop is behind; the session recording keeps the data.
        log::debug!("chunk channel full, dropping real-time buffer");
    }
}
