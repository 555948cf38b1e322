//! Numeric primitives shared by the planners.

/// Values with magnitude below this are treated as exactly zero.
pub const EPSILON: f64 = 1e-12;

/// Lowest steepness accepted by the curve builders.
pub const MIN_STEEPNESS: f64 = 0.1;

/// Logistic sigmoid `1 / (1 + e^-x)`.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Normalized logistic at `t` in [0, 1]: 0 at `t = 0`, 1 at `t = 1`.
pub fn sigmoid_norm(t: f64, steepness: f64) -> f64 {
    let k = steepness.max(MIN_STEEPNESS);
    let lo = sigmoid(-0.5 * k);
    let hi = sigmoid(0.5 * k);
    (sigmoid(k * (t - 0.5)) - lo) / (hi - lo)
}

/// `n` strictly increasing samples of the logistic curve, normalized to [0, 1].
///
/// The first sample is exactly 0 and the last exactly 1. A single level sits at 1.
pub fn sigmoid_norm_n(n: usize, steepness: f64) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let last = (n - 1) as f64;
            let mut out: Vec<f64> = (0..n)
                .map(|i| sigmoid_norm(i as f64 / last, steepness))
                .collect();
            out[0] = 0.0;
            out[n - 1] = 1.0;
            out
        }
    }
}

#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Clamp to [0, 1]; NaN maps to 0.
#[inline]
pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Snap near-zero values (e.g. `price - range` artifacts) to exactly 0.
#[inline]
pub fn floor_eps(x: f64) -> f64 {
    if x.abs() < EPSILON {
        0.0
    } else {
        x
    }
}

/// Funding/TP weights warped by a risk coefficient.
///
/// `risk = 0` keeps the curve, `0.5` flattens it, `1` inverts it.
pub fn risk_weights(norm: &[f64], risk: f64) -> Vec<f64> {
    let r = clamp01(risk);
    norm.iter().map(|&w| (1.0 - r) * w + r * (1.0 - w)).collect()
}
