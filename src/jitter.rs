//! Bell-curve timing jitter.
//!
//! Offsets are zero-mean and approximately Gaussian: a standard normal
//! sample (Box–Muller) scaled by `amplitude / 3`, so ~99.7% of offsets fall
//! within `±amplitude` without a hard clamp. The rare tail beyond the
//! amplitude is kept deliberately.

use std::f64::consts::TAU;

use rand::Rng;

/// Draw one timing offset in milliseconds for the given amplitude.
///
/// Safe to call from any thread; each call uses the thread-local RNG.
/// Non-positive amplitudes yield zero.
pub fn sample(amplitude_ms: i64) -> i64 {
    sample_with(&mut rand::thread_rng(), amplitude_ms)
}

fn sample_with<R: Rng>(rng: &mut R, amplitude_ms: i64) -> i64 {
    if amplitude_ms <= 0 {
        return 0;
    }
    // A zero uniform sample would send ln() to -inf; redraw until open.
    let mut u1: f64 = rng.gen_range(0.0..1.0);
    while u1 <= 0.0 {
        u1 = rng.gen_range(0.0..1.0);
    }
    let u2: f64 = rng.gen_range(0.0..1.0);
    let z = (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos();
    (z * amplitude_ms as f64 / 3.0) as i64
}
