use cadence_domain::SampleRange;

use crate::error::AudioError;

/// A fully decoded PCM clip: one equal-length sample buffer per channel.
///
/// This is the seekable sample source the analysis pipeline works from; it
/// never holds a live device or decoder handle.
#[derive(Clone, Debug)]
pub struct PcmClip {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl PcmClip {
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self, AudioError> {
        if sample_rate == 0 {
            return Err(AudioError::InvalidClip("sample rate is zero".into()));
        }
        let Some(first) = channels.first() else {
            return Err(AudioError::InvalidClip("no channels".into()));
        };
        let frames = first.len();
        if channels.iter().any(|ch| ch.len() != frames) {
            return Err(AudioError::InvalidClip(
                "channels have unequal lengths".into(),
            ));
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel.
    pub fn frames(&self) -> usize {
        self.channels[0].len()
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Downmix the selected range to mono by averaging all channels.
    ///
    /// The range is clamped into the clip first; a selection that rounds to
    /// zero samples yields an empty buffer. The returned buffer is owned by
    /// the caller and shared with nothing.
    pub fn mono_range(&self, range: &SampleRange) -> Vec<f32> {
        let clamped = range.clamped(self.duration_secs());
        let start = (clamped.start_secs * self.sample_rate as f64).floor() as usize;
        let end = (clamped.end_secs * self.sample_rate as f64).floor() as usize;
        let end = end.min(self.frames());
        if end <= start {
            return Vec::new();
        }

        if self.channels.len() == 1 {
            return self.channels[0][start..end].to_vec();
        }

        let scale = 1.0 / self.channels.len() as f32;
        let mut mono = vec![0.0f32; end - start];
        for channel in &self.channels {
            for (out, sample) in mono.iter_mut().zip(&channel[start..end]) {
                *out += sample;
            }
        }
        for sample in &mut mono {
            *sample *= scale;
        }
        mono
    }
}
