//! Series voltage across the lightly doped drain and source extensions.
//!
//! Each extension drops `x = R(I) I`, where the channel current `I` itself
//! depends on `x` through the intrinsic bias `(vds - 2x, vgfs - x, vbs - x,
//! vgbs - x)`. The drop is found in `f64` by a fixed-point step followed by
//! secant iterations; one Newton polish on the caller's scalar type then
//! carries the bias derivatives through the solution.

use soispice_core::scalar::Scalar;
use soispice_core::smooth::floor_denominator;

use super::evaluate::EvalContext;

/// Convergence tolerance on the residual (V).
pub const LDD_TOLERANCE: f64 = 1e-6;
/// Iteration cap of the secant solve.
pub const LDD_MAX_ITERATIONS: usize = 30;
/// Difference step of the polish slope (V).
const POLISH_STEP: f64 = 1e-7;

/// Outcome of the `f64` solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LddSolution {
    /// Voltage across one extension (V).
    pub drop: f64,
    /// Residual evaluations after the initial one.
    pub iterations: usize,
    /// Whether the residual met [`LDD_TOLERANCE`].
    pub converged: bool,
}

/// Current-dependent extension resistance `R0 sqrt(1 + (I/Isat)^2)`.
#[inline]
pub fn resistance<S: Scalar>(ctx: &EvalContext, current: S) -> S {
    (((current / ctx.t.ldd_isat).sq() + 1.0).sqrt()) * ctx.t.ldd_r0
}

/// Solve `R(I(x)) I(x) = x` for `x` in `[0, vds/2]`.
pub fn solve<F>(ctx: &EvalContext, vds: f64, current: F) -> LddSolution
where
    F: Fn(f64) -> f64,
{
    let upper = 0.5 * vds.max(0.0);
    let residual = |x: f64| {
        let i = current(x);
        resistance(ctx, i) * i - x
    };

    let mut x0 = 0.0;
    let mut r0 = residual(x0);
    if r0.abs() < LDD_TOLERANCE {
        return LddSolution {
            drop: x0,
            iterations: 0,
            converged: true,
        };
    }

    // Fixed-point step.
    let mut x1 = (x0 + r0).clamp(0.0, upper);
    let mut r1 = residual(x1);
    let mut iterations = 1;

    while r1.abs() >= LDD_TOLERANCE && iterations < LDD_MAX_ITERATIONS {
        let slope = (r1 - r0) / floor_denominator(x1 - x0);
        let next = if slope.abs() > 0.0 && slope.is_finite() {
            x1 - r1 / slope
        } else {
            x1 + r1
        };
        x0 = x1;
        r0 = r1;
        x1 = next.clamp(0.0, upper);
        if x1 == x0 {
            break;
        }
        r1 = residual(x1);
        iterations += 1;
    }

    let converged = r1.abs() < LDD_TOLERANCE;
    if !converged && ctx.config.diagnostics_enabled() {
        log::debug!(
            "{}: LDD series solve stopped after {iterations} iterations, residual {r1:.3e} V",
            ctx.config.name
        );
    }
    LddSolution {
        drop: x1,
        iterations,
        converged,
    }
}

/// Series drop on scalar type `S`: the `f64` solution `x*` refined by one
/// Newton step on the `S` residual, so `S` carries the implicit derivative.
pub fn series_drop<S, F64, FS>(ctx: &EvalContext, vds: S, current_f64: F64, current: FS) -> S
where
    S: Scalar,
    F64: Fn(f64) -> f64,
    FS: Fn(S) -> S,
{
    if ctx.t.ldd_r0 <= 0.0 {
        return S::zero();
    }
    let solution = solve(ctx, vds.re(), &current_f64);
    let x = solution.drop;

    let residual_f64 = |x: f64| {
        let i = current_f64(x);
        resistance(ctx, i) * i - x
    };
    let slope = (residual_f64(x + POLISH_STEP) - residual_f64(x)) / POLISH_STEP;

    let i = current(S::cst(x));
    let r = resistance(ctx, i) * i - x;
    -(r / floor_denominator(S::cst(slope))) + x
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mosfet::soi::evaluate::tests::fixture;
    use crate::mosfet::soi::params::ModelCard;
    use soispice_core::scalar::{Dual, Partials};

    fn ldd_card() -> ModelCard {
        ModelCard::default()
            .with_param("lldd", 1e-7)
            .unwrap()
            .with_param("nldd", 1e18)
            .unwrap()
    }

    #[test]
    fn test_linear_resistor_divider() {
        let f = fixture(ldd_card());
        let ctx = f.ctx();
        // Intrinsic channel as a 1 kohm resistor.
        let g = 1e-3;
        let vds = 1.0;
        let sol = solve(&ctx, vds, |x| g * (vds - 2.0 * x));
        assert!(sol.converged, "{sol:?}");
        let r0 = f.temp.ldd_r0;
        let i = g * (vds - 2.0 * sol.drop);
        let expected = resistance(&ctx, i) * i;
        assert!((sol.drop - expected).abs() < LDD_TOLERANCE);
        assert!(sol.drop > 0.0 && sol.drop < 0.5 * vds);
        assert!(r0 > 0.0);
    }

    #[test]
    fn test_drop_bounded_by_half_vds() {
        let f = fixture(ldd_card());
        let ctx = f.ctx();
        let sol = solve(&ctx, 0.2, |_| 10.0);
        assert!(sol.drop <= 0.1);
    }

    #[test]
    fn test_zero_current_no_drop() {
        let f = fixture(ldd_card());
        let sol = solve(&f.ctx(), 1.0, |_| 0.0);
        assert_eq!(sol.drop, 0.0);
        assert_eq!(sol.iterations, 0);
    }

    #[test]
    fn test_disabled_without_resistance() {
        let f = fixture(ModelCard::default());
        let x = series_drop(&f.ctx(), 1.0, |_| 1e-3, |_: f64| 1e-3);
        assert_eq!(x, 0.0);
    }

    #[test]
    fn test_polish_carries_derivative() {
        let f = fixture(ldd_card());
        let ctx = f.ctx();
        let g = 1e-3;
        let vds = Dual::<1>::variable(1.0, 0);
        let x = series_drop(&ctx, vds, |x| g * (1.0 - 2.0 * x), |x: Dual<1>| (vds - x * 2.0) * g);
        // Finite-difference reference of dx/dvds.
        let h = 1e-3;
        let xp = solve(&ctx, 1.0 + h, |x| g * (1.0 + h - 2.0 * x)).drop;
        let xm = solve(&ctx, 1.0 - h, |x| g * (1.0 - h - 2.0 * x)).drop;
        let fd = (xp - xm) / (2.0 * h);
        let dx = x.partial(0);
        assert!((dx - fd).abs() < 1e-3 * fd.abs().max(1e-6), "{dx} vs {fd}");
    }
}
