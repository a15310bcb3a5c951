//! Overflow-safe smoothing primitives.
//!
//! Compact-model equations must never produce a hard branch in the value or
//! first derivative, so clamps and switches are expressed with smooth
//! functions. The constants below are part of the model definition and must
//! not be retuned.

use crate::scalar::Scalar;

/// Exponent clamp for [`safe_exp`].
pub const EXP_LIMIT: f64 = 80.0;
/// Floor for denominators that may approach zero.
pub const DENOM_FLOOR: f64 = 1e-30;
/// Floor for quantities that must stay strictly positive.
pub const TINY: f64 = 1e-50;

/// `exp(x)` with the argument clamped to `[-80, 80]`.
///
/// Above the limit the exponential is continued linearly so the value stays
/// monotone and differentiable; below it the result is the constant
/// `exp(-80)`.
#[inline]
pub fn safe_exp<S: Scalar>(x: S) -> S {
    let r = x.re();
    if r > EXP_LIMIT {
        (x - EXP_LIMIT + 1.0) * EXP_LIMIT.exp()
    } else if r < -EXP_LIMIT {
        S::cst((-EXP_LIMIT).exp())
    } else {
        x.exp()
    }
}

/// Softplus `w * ln(1 + exp(x / w))`, a smooth `max(x, 0)` of width `w`.
#[inline]
pub fn softplus<S: Scalar>(x: S, w: f64) -> S {
    let u = x / w;
    if u.re() > 40.0 {
        x + safe_exp(-u).ln_1p() * w
    } else {
        safe_exp(u).ln_1p() * w
    }
}

/// Smooth maximum of `a` and `b` with transition width `w`.
#[inline]
pub fn smooth_max<S: Scalar>(a: S, b: S, w: f64) -> S {
    b + softplus(a - b, w)
}

/// Smooth minimum of `a` and `b` with transition width `w`.
#[inline]
pub fn smooth_min<S: Scalar>(a: S, b: S, w: f64) -> S {
    a - softplus(a - b, w)
}

/// Smoothly keep `x` above `floor`.
#[inline]
pub fn soft_floor<S: Scalar>(x: S, floor: f64, w: f64) -> S {
    smooth_max(x, S::cst(floor), w)
}

/// Replace a denominator whose magnitude is below [`DENOM_FLOOR`].
#[inline]
pub fn floor_denominator<S: Scalar>(d: S) -> S {
    let r = d.re();
    if r.abs() < DENOM_FLOOR {
        S::cst(if r < 0.0 { -DENOM_FLOOR } else { DENOM_FLOOR })
    } else {
        d
    }
}

/// Square root of an argument floored at [`TINY`].
#[inline]
pub fn sqrt_pos<S: Scalar>(x: S) -> S {
    if x.re() > TINY { x.sqrt() } else { S::cst(TINY.sqrt()) }
}

/// Natural log of an argument floored at [`TINY`].
#[inline]
pub fn ln_pos<S: Scalar>(x: S) -> S {
    if x.re() > TINY { x.ln() } else { S::cst(TINY.ln()) }
}

/// Soft step limiter: behaves like `x` for `|x| << limit` and saturates
/// smoothly at `±limit`.
#[inline]
pub fn soft_limit<S: Scalar>(x: S, limit: f64) -> S {
    x / ((x / limit).sq() + 1.0).sqrt()
}

/// Junction exponential `i0 * exp(v / nvt)` continued linearly above the
/// voltage at which it reaches a maximum current.
///
/// The breakpoint and its slope are temperature dependent and are cached in
/// the instance temperature record; the continuation is C1 at the breakpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimitedExp {
    /// Saturation current (A).
    pub i0: f64,
    /// Ideality times thermal voltage (V).
    pub nvt: f64,
    /// Breakpoint voltage (V).
    pub vbp: f64,
    /// Current at the breakpoint (A).
    pub ibp: f64,
}

impl LimitedExp {
    /// Build the exponential with its breakpoint placed where the current
    /// reaches `imax`.
    pub fn new(i0: f64, nvt: f64, imax: f64) -> Self {
        let nvt = nvt.max(TINY);
        if i0 <= 0.0 {
            return Self {
                i0: 0.0,
                nvt,
                vbp: f64::INFINITY,
                ibp: 0.0,
            };
        }
        let ratio = (imax / i0).max(1.0);
        let vbp = nvt * ratio.ln().min(EXP_LIMIT);
        let ibp = i0 * (vbp / nvt).exp();
        Self { i0, nvt, vbp, ibp }
    }

    /// Slope of the linear continuation (S).
    #[inline]
    pub fn breakpoint_slope(&self) -> f64 {
        self.ibp / self.nvt
    }

    /// Evaluate `i0 * exp(v / nvt)` (limited).
    #[inline]
    pub fn eval<S: Scalar>(&self, v: S) -> S {
        if self.i0 == 0.0 {
            return S::zero();
        }
        if v.re() > self.vbp {
            ((v - self.vbp) / self.nvt + 1.0) * self.ibp
        } else {
            safe_exp(v / self.nvt) * self.i0
        }
    }

    /// Evaluate `i0 * (exp(v / nvt) - 1)` (limited).
    #[inline]
    pub fn eval_minus_one<S: Scalar>(&self, v: S) -> S {
        self.eval(v) - self.i0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::{Dual, Partials};

    #[test]
    fn test_safe_exp_is_finite_and_monotone() {
        let xs = [-1e6, -200.0, -80.0, 0.0, 79.9, 80.0, 80.1, 500.0, 1e6];
        let mut last = 0.0;
        for x in xs {
            let y = safe_exp(x);
            assert!(y.is_finite());
            assert!(y >= last);
            last = y;
        }
    }

    #[test]
    fn test_safe_exp_continuous_at_limit() {
        let below = safe_exp(EXP_LIMIT - 1e-9);
        let above = safe_exp(EXP_LIMIT + 1e-9);
        assert!(((above - below) / below).abs() < 1e-8);
    }

    #[test]
    fn test_softplus_asymptotes() {
        assert!((softplus(10.0, 0.01) - 10.0).abs() < 1e-12);
        assert!(softplus(-10.0, 0.01) >= 0.0);
        assert!(softplus(-10.0, 0.01) < 1e-30);
        assert!((softplus(0.0, 1.0) - 2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_smooth_min_max_bracket() {
        let a = 1.0;
        let b = 1.2;
        assert!(smooth_max(a, b, 0.01) >= b);
        assert!(smooth_min(a, b, 0.01) <= a);
        assert!((smooth_max(a, b, 0.01) - b).abs() < 1e-6);
        assert!((smooth_min(a, b, 0.01) - a).abs() < 1e-6);
    }

    #[test]
    fn test_soft_limit_saturates() {
        assert!((soft_limit(1e-3, 0.5) - 1e-3).abs() < 1e-8);
        assert!(soft_limit(100.0, 0.5) < 0.5);
        assert!(soft_limit(-100.0, 0.5) > -0.5);
    }

    #[test]
    fn test_limited_exp_c1_at_breakpoint() {
        let le = LimitedExp::new(1e-15, 0.0259, 1e-3);
        let h = 1e-9;
        let below = le.eval(le.vbp - h);
        let above = le.eval(le.vbp + h);
        assert!(((above - below) / le.ibp).abs() < 1e-6);

        let d_below = le.eval(Dual::<1>::variable(le.vbp - h, 0)).partial(0);
        let d_above = le.eval(Dual::<1>::variable(le.vbp + h, 0)).partial(0);
        assert!(((d_above - d_below) / le.breakpoint_slope()).abs() < 1e-6);
        assert!((le.ibp - 1e-3).abs() < 1e-9);
    }

    #[test]
    fn test_limited_exp_disabled() {
        let le = LimitedExp::new(0.0, 0.0259, 1.0);
        assert_eq!(le.eval(5.0), 0.0);
        assert_eq!(le.eval_minus_one(-5.0), 0.0);
    }

    #[test]
    fn test_sqrt_pos_and_ln_pos_floor() {
        assert!(sqrt_pos(-1.0).is_finite());
        assert!(ln_pos(0.0).is_finite());
        assert!(sqrt_pos(Dual::<1>::variable(-1.0, 0)).is_finite());
    }
}
