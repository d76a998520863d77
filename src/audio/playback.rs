//! Blocking playback of synthesized audio on the default output device.

use std::io::Cursor;

use rodio::{Decoder, OutputStream, Sink};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("no output device: {0}")]
    Stream(#[from] rodio::StreamError),

    #[error("cannot open output sink: {0}")]
    Sink(#[from] rodio::PlayError),

    #[error("cannot decode synthesized audio: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
}

/// Play an encoded clip (WAV/MP3) and block until it has finished.
///
/// `OutputStream` is not `Send`; call this from a blocking thread.
pub fn play_blocking(audio: Vec<u8>) -> Result<(), PlaybackError> {
    let (_stream, handle) = OutputStream::try_default()?;
    let sink = Sink::try_new(&handle)?;
    let source = Decoder::new(Cursor::new(audio))?;
    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}
