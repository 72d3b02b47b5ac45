//! RIFF/WAVE codec backed by `hound`.

use std::io::Cursor;
use std::time::Duration;

use bytes::Bytes;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use super::{AudioClip, AudioCodec, AudioError, AudioFormat, AudioResult};

/// Interleaved PCM samples in their native representation.
#[derive(Debug, Clone, PartialEq)]
pub enum PcmSamples {
    Int(Vec<i32>),
    Float(Vec<f32>),
}

impl PcmSamples {
    pub fn len(&self) -> usize {
        match self {
            Self::Int(s) => s.len(),
            Self::Float(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn truncate(&mut self, len: usize) {
        match self {
            Self::Int(s) => s.truncate(len),
            Self::Float(s) => s.truncate(len),
        }
    }
}

/// Decoded WAV audio.
#[derive(Debug, Clone)]
pub struct PcmClip {
    spec: WavSpec,
    samples: PcmSamples,
}

impl PcmClip {
    pub fn new(spec: WavSpec, samples: PcmSamples) -> Self {
        Self { spec, samples }
    }

    pub fn spec(&self) -> WavSpec {
        self.spec
    }

    pub fn samples(&self) -> &PcmSamples {
        &self.samples
    }

    /// Number of frames (one sample per channel).
    pub fn frame_count(&self) -> usize {
        self.samples.len() / usize::from(self.spec.channels.max(1))
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frame_count() as f64 / f64::from(self.spec.sample_rate))
    }

    /// Drop `round(amount * sample_rate)` frames from the end, or all of them
    /// if the clip is shorter.
    pub fn trim_end(&mut self, amount: Duration) {
        let frames = (amount.as_secs_f64() * f64::from(self.spec.sample_rate)).round() as usize;
        let drop = frames.saturating_mul(usize::from(self.spec.channels));
        let keep = self.samples.len().saturating_sub(drop);
        self.samples.truncate(keep);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WavCodec;

impl WavCodec {
    pub fn decode_clip(&self, data: Bytes) -> AudioResult<PcmClip> {
        let reader = WavReader::new(Cursor::new(data))?;
        let spec = reader.spec();
        if spec.channels == 0 || spec.sample_rate == 0 {
            return Err(AudioError::Decode {
                format: AudioFormat::Wav,
                reason: format!(
                    "invalid header: {} channels at {} Hz",
                    spec.channels, spec.sample_rate
                ),
            });
        }

        let samples = match spec.sample_format {
            SampleFormat::Int => PcmSamples::Int(
                reader
                    .into_samples::<i32>()
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            SampleFormat::Float => PcmSamples::Float(
                reader
                    .into_samples::<f32>()
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        };

        Ok(PcmClip { spec, samples })
    }

    pub fn encode_clip(&self, clip: &PcmClip) -> AudioResult<Bytes> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, clip.spec)?;
            match &clip.samples {
                PcmSamples::Int(samples) => {
                    for &sample in samples {
                        writer.write_sample(sample)?;
                    }
                }
                PcmSamples::Float(samples) => {
                    for &sample in samples {
                        writer.write_sample(sample)?;
                    }
                }
            }
            writer.finalize()?;
        }
        Ok(Bytes::from(cursor.into_inner()))
    }
}

impl AudioCodec for WavCodec {
    fn format(&self) -> AudioFormat {
        AudioFormat::Wav
    }

    fn decode(&self, data: Bytes) -> AudioResult<AudioClip> {
        self.decode_clip(data).map(AudioClip::Pcm)
    }

    fn encode(&self, clip: &AudioClip) -> AudioResult<Bytes> {
        match clip {
            AudioClip::Pcm(clip) => self.encode_clip(clip),
            AudioClip::Mp3(_) => Err(AudioError::Encode {
                format: AudioFormat::Wav,
                reason: "cannot write MPEG frames as WAV".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono_16k() -> WavSpec {
        WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        }
    }

    fn wav_bytes(spec: WavSpec, frames: usize) -> Bytes {
        let samples = (0..frames * usize::from(spec.channels))
            .map(|i| (i % 100) as i32)
            .collect();
        WavCodec
            .encode_clip(&PcmClip::new(spec, PcmSamples::Int(samples)))
            .unwrap()
    }

    #[test]
    fn test_decode_reports_spec_and_duration() {
        let clip = WavCodec.decode_clip(wav_bytes(mono_16k(), 16_000)).unwrap();
        assert_eq!(clip.spec().sample_rate, 16_000);
        assert_eq!(clip.frame_count(), 16_000);
        assert_eq!(clip.duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_trim_end_mono() {
        let mut clip = WavCodec.decode_clip(wav_bytes(mono_16k(), 8_000)).unwrap();
        clip.trim_end(Duration::from_millis(100));
        assert_eq!(clip.frame_count(), 8_000 - 1_600);

        let encoded = WavCodec.encode_clip(&clip).unwrap();
        let reread = WavCodec.decode_clip(encoded).unwrap();
        assert_eq!(reread.frame_count(), 6_400);
        assert_eq!(reread.samples(), clip.samples());
    }

    #[test]
    fn test_trim_end_stereo_removes_whole_frames() {
        let spec = WavSpec {
            channels: 2,
            sample_rate: 24_000,
            ..mono_16k()
        };
        let mut clip = WavCodec.decode_clip(wav_bytes(spec, 4_800)).unwrap();
        clip.trim_end(Duration::from_millis(100));
        assert_eq!(clip.frame_count(), 2_400);
        assert_eq!(clip.samples().len(), 4_800);
    }

    #[test]
    fn test_trim_longer_than_clip_empties_it() {
        let mut clip = WavCodec.decode_clip(wav_bytes(mono_16k(), 800)).unwrap();
        clip.trim_end(Duration::from_millis(100));
        assert!(clip.samples().is_empty());
        assert!(WavCodec.encode_clip(&clip).is_ok());
    }

    #[test]
    fn test_float_samples_survive() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8_000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let clip = PcmClip::new(spec, PcmSamples::Float(vec![0.25; 800]));
        let encoded = WavCodec.encode_clip(&clip).unwrap();
        let mut decoded = WavCodec.decode_clip(encoded).unwrap();
        decoded.trim_end(Duration::from_millis(50));
        assert_eq!(decoded.samples(), &PcmSamples::Float(vec![0.25; 400]));
    }

    #[test]
    fn test_decode_rejects_non_wav() {
        let result = WavCodec.decode_clip(Bytes::from_static(b"ID3 not a riff file"));
        assert!(matches!(result, Err(AudioError::Wav(_))));
    }
}
