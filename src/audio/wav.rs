//! WAV file sample source for pipe mode.

use crate::audio::source::SampleSource;
use crate::error::{Result, SlatewireError};
use std::io::Read;

/// Chunk duration handed out per read, in milliseconds.
///
/// Roughly matches the cadence of a live capture callback so the framing
/// path behaves the same in pipe mode.
const CHUNK_MS: usize = 100;

/// Sample source that reads from WAV file data.
///
/// Keeps the file's native sample rate; multi-channel audio is mixed down
/// to mono. Samples are normalized to f32 in [-1, 1].
pub struct WavSampleSource {
    samples: Vec<f32>,
    position: usize,
    chunk_size: usize,
    sample_rate: u32,
}

impl WavSampleSource {
    /// Create from any reader (for testing/flexibility).
    pub fn from_reader(reader: Box<dyn Read + Send>) -> Result<Self> {
        let mut wav_reader =
            hound::WavReader::new(reader).map_err(|e| SlatewireError::AudioCapture {
                message: format!("Failed to parse WAV file: {}", e),
            })?;

        let spec = wav_reader.spec();
        let sample_rate = spec.sample_rate;
        let channels = spec.channels as usize;

        let raw_samples: Vec<i16> = wav_reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| SlatewireError::AudioCapture {
                message: format!("Failed to read WAV samples: {}", e),
            })?;

        // Normalize and mix down to mono in one pass
        let samples: Vec<f32> = if channels > 1 {
            raw_samples
                .chunks_exact(channels)
                .map(|frame| {
                    frame.iter().map(|&s| s as f32 / 32768.0).sum::<f32>() / channels as f32
                })
                .collect()
        } else {
            raw_samples.iter().map(|&s| s as f32 / 32768.0).collect()
        };

        let chunk_size = (sample_rate as usize * CHUNK_MS) / 1000;

        Ok(Self {
            samples,
            position: 0,
            chunk_size: chunk_size.max(1),
            sample_rate,
        })
    }

    /// Create from stdin.
    pub fn from_stdin() -> Result<Self> {
        use std::io::Cursor;

        // Read all data from stdin into memory first (StdinLock is not Send)
        let mut buffer = Vec::new();
        std::io::stdin()
            .lock()
            .read_to_end(&mut buffer)
            .map_err(|e| SlatewireError::AudioCapture {
                message: format!("Failed to read from stdin: {}", e),
            })?;

        Self::from_reader(Box::new(Cursor::new(buffer)))
    }
}

impl SampleSource for WavSampleSource {
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_chunk(&mut self) -> Result<Vec<f32>> {
        if self.position >= self.samples.len() {
            return Ok(Vec::new());
        }
        let end = (self.position + self.chunk_size).min(self.samples.len());
        let chunk = self.samples[self.position..end].to_vec();
        self.position = end;
        Ok(chunk)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn is_finite(&self) -> bool {
        true
    }
}
