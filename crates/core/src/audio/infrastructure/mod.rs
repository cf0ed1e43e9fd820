pub mod cpal_audio_source;
pub mod wav_file;
