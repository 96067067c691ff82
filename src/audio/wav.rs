//! WAV decoding with a default-parameter fallback for damaged headers.
//!
//! Well-formed files are parsed with `hound`. When the header cannot be
//! parsed the decoder can assume 16-bit stereo at 44.1 kHz behind a
//! canonical 44-byte header and read the rest of the buffer as sample data.
//! Strict callers turn that fallback off.

use crate::audio::pcm::PcmBuffer;
use crate::defaults::{
    FALLBACK_BITS_PER_SAMPLE, FALLBACK_CHANNELS, FALLBACK_SAMPLE_RATE, WAV_HEADER_BYTES,
};
use crate::error::{LipcookError, Result};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;

/// Decoder behaviour for damaged input.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WavOptions {
    /// Fail with `MalformedHeader` instead of assuming default parameters.
    pub strict_header: bool,
}

/// Result of decoding a WAV byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedWav {
    pub buffer: PcmBuffer,
    /// True when the header was unreadable and default parameters were used.
    pub header_fallback: bool,
}

/// Decode a complete WAV file held in memory.
///
/// # Errors
/// * `InvalidInput` when the buffer is no longer than a bare header
/// * `MalformedHeader` when the header is unreadable and `strict_header` is set
/// * `InvalidAudioFormat` for sample formats other than integer PCM up to 16 bits
pub fn decode_wav(bytes: &[u8], options: &WavOptions) -> Result<DecodedWav> {
    if bytes.len() <= WAV_HEADER_BYTES {
        return Err(LipcookError::InvalidInput {
            message: format!(
                "{} bytes is too short to be a WAV file (need more than {})",
                bytes.len(),
                WAV_HEADER_BYTES
            ),
        });
    }

    match hound::WavReader::new(Cursor::new(bytes)) {
        Ok(reader) => decode_with_header(reader).map(|buffer| DecodedWav {
            buffer,
            header_fallback: false,
        }),
        Err(e) => {
            let header_error = LipcookError::MalformedHeader {
                message: e.to_string(),
            };
            if options.strict_header {
                return Err(header_error);
            }
            tracing::warn!(
                error = %header_error,
                sample_rate = FALLBACK_SAMPLE_RATE,
                channels = FALLBACK_CHANNELS,
                "WAV header unreadable, assuming default parameters"
            );
            Ok(DecodedWav {
                buffer: decode_headerless(bytes),
                header_fallback: true,
            })
        }
    }
}

/// Read a WAV file from disk and decode it.
pub fn load_wav_file(path: &Path, options: &WavOptions) -> Result<DecodedWav> {
    let bytes = std::fs::read(path)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "loaded WAV file");
    decode_wav(&bytes, options)
}

fn decode_with_header(mut reader: hound::WavReader<Cursor<&[u8]>>) -> Result<PcmBuffer> {
    let spec = reader.spec();
    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample > 16 {
        return Err(LipcookError::InvalidAudioFormat {
            message: format!(
                "unsupported sample format {:?} at {} bits (need integer PCM up to 16 bits)",
                spec.sample_format, spec.bits_per_sample
            ),
        });
    }

    let mut samples = Vec::with_capacity(reader.len() as usize);
    for sample in reader.samples::<i16>() {
        match sample {
            Ok(s) => samples.push(s),
            Err(e) => {
                // Truncated data chunk: keep what was read.
                tracing::warn!(error = %e, read = samples.len(), "WAV data ended early");
                break;
            }
        }
    }

    tracing::debug!(
        sample_rate = spec.sample_rate,
        channels = spec.channels,
        bits = spec.bits_per_sample,
        samples = samples.len(),
        "decoded WAV header"
    );

    Ok(PcmBuffer::new(
        samples,
        spec.sample_rate,
        spec.channels,
        spec.bits_per_sample,
    ))
}

/// Everything past the canonical header as little-endian 16-bit samples.
fn decode_headerless(bytes: &[u8]) -> PcmBuffer {
    let samples = bytes[WAV_HEADER_BYTES..]
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    PcmBuffer::new(
        samples,
        FALLBACK_SAMPLE_RATE,
        FALLBACK_CHANNELS,
        FALLBACK_BITS_PER_SAMPLE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_wav_data(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn decodes_mono_header_and_samples() {
        let input = vec![100i16, 200, 300, 400, 500];
        let wav = make_wav_data(16000, 1, &input);

        let decoded = decode_wav(&wav, &WavOptions::default()).unwrap();

        assert!(!decoded.header_fallback);
        assert_eq!(decoded.buffer.samples(), input.as_slice());
        assert_eq!(decoded.buffer.sample_rate(), 16000);
        assert_eq!(decoded.buffer.channels(), 1);
        assert_eq!(decoded.buffer.bits_per_sample(), 16);
    }

    #[test]
    fn keeps_stereo_interleaved() {
        let input = vec![1i16, -1, 2, -2, 3, -3];
        let wav = make_wav_data(48000, 2, &input);

        let decoded = decode_wav(&wav, &WavOptions::default()).unwrap();

        assert_eq!(decoded.buffer.channels(), 2);
        assert_eq!(decoded.buffer.samples(), input.as_slice());
    }

    #[test]
    fn header_only_buffer_is_invalid_input() {
        let result = decode_wav(&[0u8; 44], &WavOptions::default());
        assert!(matches!(result, Err(LipcookError::InvalidInput { .. })));

        let result = decode_wav(&[], &WavOptions::default());
        assert!(matches!(result, Err(LipcookError::InvalidInput { .. })));
    }

    #[test]
    fn garbage_header_falls_back_to_defaults() {
        let mut bytes = vec![0xABu8; 100];
        bytes[44] = 0x34;
        bytes[45] = 0x12;

        let decoded = decode_wav(&bytes, &WavOptions::default()).unwrap();

        assert!(decoded.header_fallback);
        assert_eq!(decoded.buffer.sample_rate(), 44100);
        assert_eq!(decoded.buffer.channels(), 2);
        assert_eq!(decoded.buffer.bits_per_sample(), 16);
        assert_eq!(decoded.buffer.len(), 28);
        assert_eq!(decoded.buffer.samples()[0], 0x1234);
    }

    #[test]
    fn fallback_ignores_trailing_odd_byte() {
        let bytes = vec![0u8; 49];
        let decoded = decode_wav(&bytes, &WavOptions::default()).unwrap();
        assert_eq!(decoded.buffer.len(), 2);
    }

    #[test]
    fn strict_header_rejects_garbage() {
        let bytes = vec![0u8; 100];
        let options = WavOptions {
            strict_header: true,
        };

        match decode_wav(&bytes, &options) {
            Err(LipcookError::MalformedHeader { message }) => assert!(!message.is_empty()),
            other => panic!("Expected MalformedHeader, got {:?}", other),
        }
    }

    #[test]
    fn strict_header_accepts_valid_files() {
        let wav = make_wav_data(16000, 1, &[0i16; 64]);
        let options = WavOptions {
            strict_header: true,
        };
        assert!(decode_wav(&wav, &options).is_ok());
    }

    #[test]
    fn float_samples_are_invalid_format() {
        let mut cursor = Cursor::new(Vec::new());
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for _ in 0..32 {
            writer.write_sample(0.25f32).unwrap();
        }
        writer.finalize().unwrap();

        let result = decode_wav(&cursor.into_inner(), &WavOptions::default());
        assert!(matches!(
            result,
            Err(LipcookError::InvalidAudioFormat { .. })
        ));
    }

    #[test]
    fn truncated_data_keeps_complete_samples() {
        let mut wav = make_wav_data(16000, 1, &[7i16; 40]);
        wav.truncate(wav.len() - 21);

        let decoded = decode_wav(&wav, &WavOptions::default()).unwrap();
        assert!(!decoded.header_fallback);
        assert!(decoded.buffer.len() < 40);
        assert!(decoded.buffer.samples().iter().all(|&s| s == 7));
    }

    #[test]
    fn load_wav_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("speech.wav");
        std::fs::write(&path, make_wav_data(22050, 1, &[5i16; 300])).unwrap();

        let decoded = load_wav_file(&path, &WavOptions::default()).unwrap();
        assert_eq!(decoded.buffer.sample_rate(), 22050);
        assert_eq!(decoded.buffer.len(), 300);
    }

    #[test]
    fn load_wav_file_missing_is_io_error() {
        let result = load_wav_file(Path::new("/nonexistent/speech.wav"), &WavOptions::default());
        assert!(matches!(result, Err(LipcookError::Io(_))));
    }
}
