//! Autocorrelation tempo estimation over the onset envelope.
//!
//! Autocorrelating an onset-strength envelope (rather than the raw waveform)
//! is the standard approach for percussive material: it is insensitive to
//! timbre and sensitive to rhythmic attacks. The search band and the single
//! octave-correction step are tuned for dance mixes with strong, regular
//! sub-beats; sustained syncopation can still pull the estimate to the wrong
//! octave (known limitation, not silently corrected here).

use cadence_domain::{SampleRange, TempoEstimate};
use tracing::debug;

use crate::clip::PcmClip;
use crate::envelope::{onset_envelope, rms_envelope, ENERGY_HOP, MIN_ONSET_FRAMES};

/// Slowest tempo the lag search will consider.
pub const MIN_BPM: f32 = 80.0;
/// Fastest tempo the lag search will consider.
pub const MAX_BPM: f32 = 200.0;
/// Raw estimates below this are assumed to be half-tempo and doubled.
pub const OCTAVE_LOW_BPM: f32 = 90.0;
/// Raw estimates above this are assumed to be double-tempo and halved.
pub const OCTAVE_HIGH_BPM: f32 = 190.0;

/// Estimate the tempo of the selected range of a clip.
///
/// Never fails: every degenerate input (near-zero-length range, too few
/// analysis frames, silent segment, empty lag band) converges to
/// [`TempoEstimate::NONE`]. Callers must treat `bpm == 0` as "detection
/// failed", never as a literal tempo. Deterministic for identical inputs.
pub fn estimate_tempo(clip: &PcmClip, range: &SampleRange) -> TempoEstimate {
    let mono = clip.mono_range(range);
    if mono.is_empty() {
        debug!(?range, "selection rounds to zero samples");
        return TempoEstimate::NONE;
    }

    let rms = rms_envelope(&mono);
    if rms.len() < MIN_ONSET_FRAMES {
        debug!(frames = rms.len(), "too few analysis frames");
        return TempoEstimate::NONE;
    }

    let Some(onsets) = onset_envelope(&rms) else {
        debug!("segment is silent or has no detectable onsets");
        return TempoEstimate::NONE;
    };

    let frames_per_sec = clip.sample_rate() as f32 / ENERGY_HOP as f32;
    let estimate = estimate_from_envelope(&onsets, frames_per_sec);
    debug!(
        bpm = estimate.bpm,
        confidence = estimate.confidence,
        "tempo estimation finished"
    );
    estimate
}

fn estimate_from_envelope(onsets: &[f32], frames_per_sec: f32) -> TempoEstimate {
    let min_lag = ((60.0 * frames_per_sec / MAX_BPM).floor() as usize).max(1);
    let max_lag = ((60.0 * frames_per_sec / MIN_BPM).floor() as usize)
        .min(onsets.len().saturating_sub(1));
    if max_lag <= min_lag {
        debug!(min_lag, max_lag, "degenerate lag band");
        return TempoEstimate::NONE;
    }

    // Unnormalized autocorrelation at every candidate lag, tracking the best
    // and the globally second-best score (not necessarily adjacent peaks).
    let mut best_lag = min_lag;
    let mut best_score = -1.0f32;
    let mut second_score = f32::NEG_INFINITY;
    for lag in min_lag..=max_lag {
        let score: f32 = onsets[..onsets.len() - lag]
            .iter()
            .zip(&onsets[lag..])
            .map(|(a, b)| a * b)
            .sum();
        if score > best_score {
            second_score = best_score;
            best_score = score;
            best_lag = lag;
        } else if score > second_score {
            second_score = score;
        }
    }

    let bpm = octave_corrected(60.0 * frames_per_sec / best_lag as f32);

    // Peakiness: a sharply dominant lag means unambiguous periodicity; a flat
    // or multi-peaked correlogram means a weak beat. The square root spreads
    // the mid-range of an otherwise front-loaded ratio.
    let confidence = if best_score > 0.0 && second_score.is_finite() {
        ((best_score - second_score) / best_score)
            .clamp(0.0, 1.0)
            .sqrt()
    } else {
        0.0
    };

    TempoEstimate::new(bpm.round() as u32, confidence)
}

/// Apply exactly one half/double-time correction. Dance-music mixes often
/// lock the autocorrelation onto a half- or double-tempo subdivision.
pub fn octave_corrected(bpm: f32) -> f32 {
    if bpm < OCTAVE_LOW_BPM {
        bpm * 2.0
    } else if bpm > OCTAVE_HIGH_BPM {
        bpm / 2.0
    } else {
        bpm
    }
}
