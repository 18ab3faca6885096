//! Short-time energy and onset-strength envelopes.
//!
//! The onset envelope is the half-wave-rectified first difference of the
//! frame RMS sequence: it keeps energy *increases* (attacks, hits) and
//! suppresses sustained or decaying energy, which is what periodicity
//! analysis for percussive material wants to see.

/// Analysis window in samples.
pub const ENERGY_WINDOW: usize = 1024;
/// Hop between analysis frames in samples (75% overlap).
pub const ENERGY_HOP: usize = 256;
/// Minimum number of onset frames for a meaningful autocorrelation.
pub const MIN_ONSET_FRAMES: usize = 8;
/// Envelope maxima at or below this are treated as silence.
pub const SILENCE_EPSILON: f32 = 1e-6;

/// Root-mean-square amplitude per analysis frame.
///
/// Frame count is `(len - window) / hop + 1`; a buffer shorter than one
/// window produces no frames.
pub fn rms_envelope(mono: &[f32]) -> Vec<f32> {
    if mono.len() < ENERGY_WINDOW {
        return Vec::new();
    }
    let frames = (mono.len() - ENERGY_WINDOW) / ENERGY_HOP + 1;
    let mut envelope = Vec::with_capacity(frames);
    for frame in 0..frames {
        let off = frame * ENERGY_HOP;
        let window = &mono[off..(off + ENERGY_WINDOW).min(mono.len())];
        let energy: f32 = window.iter().map(|&x| x * x).sum();
        envelope.push((energy / window.len() as f32).sqrt());
    }
    envelope
}

/// Half-wave-rectified first difference of the RMS sequence, normalized so
/// its maximum is 1.0. Returns `None` when the envelope is degenerate
/// (near-silence, no detectable onsets); the caller maps that to the tempo
/// sentinel.
pub fn onset_envelope(rms: &[f32]) -> Option<Vec<f32>> {
    let mut prev = 0.0f32;
    let mut onsets = Vec::with_capacity(rms.len());
    for &level in rms {
        onsets.push((level - prev).max(0.0));
        prev = level;
    }

    let max = onsets.iter().copied().fold(0.0f32, f32::max);
    if max <= SILENCE_EPSILON {
        return None;
    }
    for value in &mut onsets {
        *value /= max;
    }
    Some(onsets)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn frame_count_matches_formula() {
        let mono = vec![0.1f32; ENERGY_WINDOW + 7 * ENERGY_HOP];
        assert_eq!(rms_envelope(&mono).len(), 8);

        let short = vec![0.1f32; ENERGY_WINDOW - 1];
        assert!(rms_envelope(&short).is_empty());
    }

    #[test]
    fn rms_of_constant_signal() {
        let mono = vec![0.5f32; ENERGY_WINDOW * 2];
        let envelope = rms_envelope(&mono);
        for level in envelope {
            assert_relative_eq!(level, 0.5, epsilon = 1e-6);
        }
    }

    #[test]
    fn onset_rectifies_and_normalizes() {
        let rms = vec![0.0, 0.4, 0.2, 0.8, 0.8];
        let onsets = onset_envelope(&rms).unwrap();
        // Rises at frames 1 and 3; falls are zeroed.
        assert_relative_eq!(onsets[1], 0.4 / 0.6, epsilon = 1e-6);
        assert_eq!(onsets[2], 0.0);
        assert_relative_eq!(onsets[3], 1.0, epsilon = 1e-6);
        assert_eq!(onsets[4], 0.0);
    }

    #[test]
    fn silence_yields_none() {
        let rms = vec![0.0f32; 32];
        assert!(onset_envelope(&rms).is_none());
    }
}
