//! Decoding compressed audio into [`PcmBuffer`]s with symphonia.
//!
//! Decoding runs synchronously on the calling thread and either returns a
//! complete buffer or an error; no partial clip state is ever produced.
//! Corrupted packets are skipped with a warning, matching how lossy streams
//! degrade elsewhere in the ecosystem.

use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use log::warn;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::AudioError;
use crate::pcm::PcmBuffer;

/// Decode an audio file, using its extension as a format hint.
pub fn decode_file(path: impl AsRef<Path>) -> Result<PcmBuffer, AudioError> {
    let path = path.as_ref();
    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }
    let file = File::open(path)?;
    decode_source(Box::new(file), hint)
}

/// Decode audio data already held in memory.
pub fn decode_bytes(bytes: Vec<u8>) -> Result<PcmBuffer, AudioError> {
    decode_source(Box::new(Cursor::new(bytes)), Hint::new())
}

/// Decode audio from any seekable reader.
pub fn decode_reader(source: impl MediaSource + 'static) -> Result<PcmBuffer, AudioError> {
    decode_source(Box::new(source), Hint::new())
}

fn decode_source(source: Box<dyn MediaSource>, hint: Hint) -> Result<PcmBuffer, AudioError> {
    let stream = MediaSourceStream::new(source, Default::default());
    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|err| AudioError::Decode(format!("unrecognized format: {}", err)))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::Decode("no decodable track".to_string()))?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|err| AudioError::Decode(format!("unsupported codec: {}", err)))?;

    let mut samples: Vec<f32> = Vec::new();
    let mut channels: u16 = 0;
    let mut sample_rate: u32 = 0;
    let mut staging: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(Error::IoError(err)) if err.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(Error::ResetRequired) => break,
            Err(err) => return Err(AudioError::Decode(format!("demux failed: {}", err))),
        };
        if packet.track_id() != track_id {
            continue;
        }
        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                if channels == 0 {
                    channels = spec.channels.count() as u16;
                    sample_rate = spec.rate;
                }
                // The decoder's frame capacity is fixed, so one staging
                // buffer sized to it fits every packet.
                let staging = staging.get_or_insert_with(|| {
                    SampleBuffer::<f32>::new(decoded.capacity() as u64, spec)
                });
                staging.copy_interleaved_ref(decoded);
                samples.extend_from_slice(staging.samples());
            }
            Err(Error::DecodeError(err)) => {
                warn!("skipping corrupted packet: {}", err);
            }
            Err(err) => return Err(AudioError::Decode(format!("decode failed: {}", err))),
        }
    }

    if samples.is_empty() || channels == 0 {
        return Err(AudioError::Decode(
            "stream contained no audio frames".to_string(),
        ));
    }
    Ok(PcmBuffer::new(channels, sample_rate, samples))
}
