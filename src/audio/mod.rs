//! Audio input: PCM buffers, 10 ms chunking and WAV decoding.

pub mod chunker;
pub mod pcm;
pub mod wav;

pub use chunker::{AudioChunk, ChunkSegmenter, Chunks};
pub use pcm::PcmBuffer;
pub use wav::{DecodedWav, WavOptions, decode_wav, load_wav_file};
