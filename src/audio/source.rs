use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Pull-based source of decoded audio.
///
/// Implementations own their decoding state; the player drains them block by
/// block on the decoder thread. Nothing here runs on the audio callback.
pub trait SampleSource: Send {
    fn sample_rate(&self) -> u32;
    fn channels(&self) -> u16;

    /// Fills `out` with interleaved f32 samples in [-1, 1]. Returns the
    /// number of samples written; 0 signals end of stream.
    fn pull(&mut self, out: &mut [f32]) -> usize;
}

/// WAV decoding collaborator backed by hound.
pub struct WavSource {
    reader: hound::WavReader<BufReader<File>>,
    spec: hound::WavSpec,
}

impl WavSource {
    pub fn open(path: &Path) -> Result<Self> {
        let reader = hound::WavReader::open(path)
            .with_context(|| format!("opening {}", path.display()))?;
        let spec = reader.spec();

        log::info!(
            "WAV: {} ch @ {}Hz, {}-bit {:?}",
            spec.channels,
            spec.sample_rate,
            spec.bits_per_sample,
            spec.sample_format
        );

        Ok(Self { reader, spec })
    }
}

impl SampleSource for WavSource {
    fn sample_rate(&self) -> u32 {
        self.spec.sample_rate
    }

    fn channels(&self) -> u16 {
        self.spec.channels
    }

    fn pull(&mut self, out: &mut [f32]) -> usize {
        let mut written = 0;

        match self.spec.sample_format {
            hound::SampleFormat::Float => {
                let mut samples = self.reader.samples::<f32>();
                while written < out.len() {
                    match samples.next() {
                        Some(Ok(sample)) => {
                            out[written] = sample;
                            written += 1;
                        }
                        Some(Err(err)) => {
                            log::warn!("decode error, stopping: {}", err);
                            break;
                        }
                        None => break,
                    }
                }
            }
            hound::SampleFormat::Int => {
                //
                // Scale integer PCM to [-1, 1] by the sample's own bit depth.
                //
                let scale = 1.0 / (1u32 << (self.spec.bits_per_sample - 1)) as f32;
                let mut samples = self.reader.samples::<i32>();
                while written < out.len() {
                    match samples.next() {
                        Some(Ok(sample)) => {
                            out[written] = sample as f32 * scale;
                            written += 1;
                        }
                        Some(Err(err)) => {
                            log::warn!("decode error, stopping: {}", err);
                            break;
                        }
                        None => break,
                    }
                }
            }
        }

        written
    }
}
