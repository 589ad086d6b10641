use serde::{Deserialize, Serialize};

pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AudioError {
    #[error("pcm payload has odd length {0}")]
    OddLength(usize),
    #[error("channel count must be > 0")]
    NoChannels,
    #[error("{samples} samples do not split into {channels} channels")]
    RaggedFrames { samples: usize, channels: u16 },
}

/// Decoded speech, one normalized sample vector per channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioClip {
    pub sample_rate: u32,
    pub channels: Vec<Vec<f32>>,
}

impl AudioClip {
    /// Decode little-endian signed 16-bit interleaved PCM into samples in `[-1, 1)`.
    pub fn from_pcm16_le(bytes: &[u8], sample_rate: u32, channels: u16) -> Result<Self, AudioError> {
        if channels == 0 {
            return Err(AudioError::NoChannels);
        }
        if bytes.len() % 2 != 0 {
            return Err(AudioError::OddLength(bytes.len()));
        }
        let samples: Vec<f32> = bytes
            .chunks_exact(2)
            .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32768.0)
            .collect();
        let width = usize::from(channels);
        if samples.len() % width != 0 {
            return Err(AudioError::RaggedFrames {
                samples: samples.len(),
                channels,
            });
        }

        let frames = samples.len() / width;
        let mut split = vec![Vec::with_capacity(frames); width];
        for frame in samples.chunks_exact(width) {
            for (channel, sample) in split.iter_mut().zip(frame) {
                channel.push(*sample);
            }
        }
        Ok(Self {
            sample_rate,
            channels: split,
        })
    }

    /// Speech provider default: 24 kHz mono.
    pub fn from_speech_pcm(bytes: &[u8]) -> Result<Self, AudioError> {
        Self::from_pcm16_le(bytes, DEFAULT_SAMPLE_RATE, 1)
    }

    pub fn frames(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcm(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn test_decode_mono() {
        let clip = AudioClip::from_speech_pcm(&pcm(&[0, 16384, -32768, 32767])).unwrap();
        assert_eq!(clip.sample_rate, 24_000);
        assert_eq!(clip.channels.len(), 1);
        let s = &clip.channels[0];
        assert_eq!(s[0], 0.0);
        assert_eq!(s[1], 0.5);
        assert_eq!(s[2], -1.0);
        assert!(s[3] < 1.0 && s[3] > 0.999);
    }

    #[test]
    fn test_decode_stereo_deinterleaves() {
        let clip = AudioClip::from_pcm16_le(&pcm(&[100, -100, 200, -200]), 48_000, 2).unwrap();
        assert_eq!(clip.frames(), 2);
        assert!(clip.channels[0].iter().all(|s| *s > 0.0));
        assert!(clip.channels[1].iter().all(|s| *s < 0.0));
    }

    #[test]
    fn test_duration() {
        let clip = AudioClip::from_speech_pcm(&vec![0u8; 48_000]).unwrap();
        assert!((clip.duration_secs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_bad_payloads() {
        assert_eq!(
            AudioClip::from_speech_pcm(&[0, 0, 0]),
            Err(AudioError::OddLength(3))
        );
        assert_eq!(
            AudioClip::from_pcm16_le(&pcm(&[1, 2, 3]), 24_000, 2),
            Err(AudioError::RaggedFrames {
                samples: 3,
                channels: 2
            })
        );
        assert_eq!(AudioClip::from_pcm16_le(&[], 24_000, 0), Err(AudioError::NoChannels));
    }
}
