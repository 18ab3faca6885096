//! Timing accuracy against the beat grid.
//!
//! Every tap snaps to its *nearest* grid instant, not the next upcoming
//! beat: the error stays well-defined when a tap lands slightly before its
//! intended beat, and no beat-index bookkeeping is needed. There is no
//! outlier rejection. Drift regresses the signed error against elapsed
//! session time (not tap index), so unevenly spaced taps and skipped beats
//! are measured correctly.

use cadence_domain::TimingStats;

use crate::session::TapSession;

/// Compute timing stats for the session, or `None` when the session has no
/// anchor, no taps, or a non-positive tempo.
pub fn score(session: &TapSession) -> Option<TimingStats> {
    let anchor = session.anchor_ms()?;
    let taps = session.taps_ms();
    if taps.is_empty() || session.bpm() <= 0.0 {
        return None;
    }

    let period_ms = 60_000.0 / session.bpm();

    // Signed error to the nearest grid instant; positive = late.
    let errors: Vec<f64> = taps
        .iter()
        .map(|&tap| {
            let k = ((tap - anchor) / period_ms).round();
            tap - (anchor + k * period_ms)
        })
        .collect();

    let mean_abs_ms = errors.iter().map(|e| e.abs()).sum::<f64>() / errors.len() as f64;
    let std_ms = population_std(&errors);
    let drift_ms_per_min = regression_slope(taps, &errors) * 60_000.0;

    Some(TimingStats {
        mean_abs_ms,
        std_ms,
        drift_ms_per_min,
    })
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; zero for fewer than two values.
fn population_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Least-squares slope of `y` against `x`; zero for fewer than two points or
/// when `x` has no variance (all taps coincide in time).
fn regression_slope(x: &[f64], y: &[f64]) -> f64 {
    if x.len() < 2 {
        return 0.0;
    }
    let x_bar = mean(x);
    let y_bar = mean(y);
    let mut num = 0.0;
    let mut den = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        num += (xi - x_bar) * (yi - y_bar);
        den += (xi - x_bar).powi(2);
    }
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}
