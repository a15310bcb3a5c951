//! Bounded quadrature rules.
//!
//! Both rules have a hard cap on the number of integrand evaluations so the
//! cost of a device evaluation stays independent of bias.

use crate::scalar::Scalar;

/// Maximum Romberg refinement levels.
pub const ROMBERG_MAX_LEVELS: usize = 7;

/// Composite trapezoid rule with `n` panels (at least one).
pub fn trapezoid<S, F>(f: F, a: S, b: S, n: usize) -> S
where
    S: Scalar,
    F: Fn(S) -> S,
{
    let n = n.max(1);
    let h = (b - a) / n as f64;
    let mut sum = (f(a) + f(b)) * 0.5;
    for k in 1..n {
        sum += f(a + h * k as f64);
    }
    sum * h
}

/// Result of a Romberg integration.
#[derive(Debug, Clone, Copy)]
pub struct RombergOutcome<S> {
    /// Best (highest-order) estimate of the integral.
    pub value: S,
    /// Refinement levels performed.
    pub levels: usize,
    /// Whether the relative tolerance was met before the level cap.
    pub converged: bool,
}

/// Romberg integration: successive trapezoid halving with Richardson
/// extrapolation, at most `max_levels` (capped at 7) refinements.
///
/// Stops once two successive diagonal estimates agree to `rel_tol`
/// (checked from the third level on).
pub fn romberg<S, F>(f: F, a: S, b: S, max_levels: usize, rel_tol: f64) -> RombergOutcome<S>
where
    S: Scalar,
    F: Fn(S) -> S,
{
    let max_levels = max_levels.clamp(1, ROMBERG_MAX_LEVELS);
    let width = b - a;

    let mut prev = [S::zero(); ROMBERG_MAX_LEVELS + 1];
    let mut cur = [S::zero(); ROMBERG_MAX_LEVELS + 1];
    prev[0] = (f(a) + f(b)) * width * 0.5;

    for level in 1..=max_levels {
        let panels = 1usize << level;
        let h = width / panels as f64;
        let mut midpoints = S::zero();
        for i in 0..panels / 2 {
            midpoints += f(a + h * (2 * i + 1) as f64);
        }
        cur[0] = prev[0] * 0.5 + midpoints * h;

        let mut factor = 1.0;
        for j in 1..=level {
            factor *= 4.0;
            cur[j] = cur[j - 1] + (cur[j - 1] - prev[j - 1]) / (factor - 1.0);
        }

        let estimate = cur[level];
        let change = (estimate - prev[level - 1]).re().abs();
        if level >= 3 && change <= rel_tol * estimate.re().abs() {
            return RombergOutcome {
                value: estimate,
                levels: level,
                converged: true,
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    RombergOutcome {
        value: prev[max_levels],
        levels: max_levels,
        converged: false,
    }
}
