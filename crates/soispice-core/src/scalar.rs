//! Scalar abstraction over plain `f64` and forward-mode dual numbers.
//!
//! Every device sub-model is written once, generic over [`Scalar`]. Evaluated
//! with `f64` it produces plain values; evaluated with [`Dual<N>`], a
//! `num_dual` dual vector seeded on the bias inputs, it produces the values
//! together with their exact partial derivatives. The analytic derivative
//! provider relies on this.
//!
//! Branch decisions (region selection, clamps, iteration exits) are taken on
//! [`Scalar::re`], so both evaluations follow identical control flow.

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use nalgebra::{Const, U1};
use num_dual::{Derivative, DualNum, DualSVec64};
use num_traits::{One, Zero};

/// Numeric type the device equations are generic over.
pub trait Scalar:
    Copy
    + Debug
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Add<f64, Output = Self>
    + Sub<f64, Output = Self>
    + Mul<f64, Output = Self>
    + Div<f64, Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
{
    /// Lift a constant (zero derivative).
    fn cst(value: f64) -> Self;
    /// Real (value) part.
    fn re(self) -> f64;

    fn exp(self) -> Self;
    fn ln(self) -> Self;
    fn ln_1p(self) -> Self;
    fn sqrt(self) -> Self;
    fn powf(self, n: f64) -> Self;
    fn sinh(self) -> Self;
    fn cosh(self) -> Self;
    fn tanh(self) -> Self;
    fn asinh(self) -> Self;
    fn abs(self) -> Self;

    /// True when the value and every derivative component are finite.
    fn is_finite(self) -> bool;

    /// Square of the value.
    #[inline]
    fn sq(self) -> Self {
        self * self
    }

    /// Larger of two values, selected on the real part.
    #[inline]
    fn max_re(self, other: Self) -> Self {
        if self.re() >= other.re() { self } else { other }
    }

    /// Smaller of two values, selected on the real part.
    #[inline]
    fn min_re(self, other: Self) -> Self {
        if self.re() <= other.re() { self } else { other }
    }
}

impl Scalar for f64 {
    #[inline]
    fn cst(value: f64) -> Self {
        value
    }
    #[inline]
    fn re(self) -> f64 {
        self
    }
    #[inline]
    fn exp(self) -> Self {
        f64::exp(self)
    }
    #[inline]
    fn ln(self) -> Self {
        f64::ln(self)
    }
    #[inline]
    fn ln_1p(self) -> Self {
        f64::ln_1p(self)
    }
    #[inline]
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }
    #[inline]
    fn powf(self, n: f64) -> Self {
        f64::powf(self, n)
    }
    #[inline]
    fn sinh(self) -> Self {
        f64::sinh(self)
    }
    #[inline]
    fn cosh(self) -> Self {
        f64::cosh(self)
    }
    #[inline]
    fn tanh(self) -> Self {
        f64::tanh(self)
    }
    #[inline]
    fn asinh(self) -> Self {
        f64::asinh(self)
    }
    #[inline]
    fn abs(self) -> Self {
        f64::abs(self)
    }
    #[inline]
    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }
}

/// Forward-mode dual number carrying `N` directional derivatives.
pub type Dual<const N: usize> = DualSVec64<N>;

/// Seeding and read-back of the directional derivatives of a [`Dual`].
pub trait Partials {
    /// A constant with zero derivatives.
    fn constant(re: f64) -> Self;
    /// An independent variable seeded in direction `index`.
    fn variable(re: f64, index: usize) -> Self;
    /// Partial derivative in direction `index`.
    fn partial(&self, index: usize) -> f64;
}

impl<const N: usize> Partials for Dual<N> {
    #[inline]
    fn constant(re: f64) -> Self {
        Self::from(re)
    }

    #[inline]
    fn variable(re: f64, index: usize) -> Self {
        Self::new(re, Derivative::derivative_generic(Const::<N>, U1, index))
    }

    #[inline]
    fn partial(&self, index: usize) -> f64 {
        self.eps.unwrap_generic(Const::<N>, U1)[index]
    }
}

impl<const N: usize> Scalar for Dual<N> {
    #[inline]
    fn cst(value: f64) -> Self {
        Self::from(value)
    }

    #[inline]
    fn re(self) -> f64 {
        self.re
    }

    #[inline]
    fn exp(self) -> Self {
        DualNum::exp(&self)
    }

    #[inline]
    fn ln(self) -> Self {
        DualNum::ln(&self)
    }

    #[inline]
    fn ln_1p(self) -> Self {
        DualNum::ln_1p(&self)
    }

    #[inline]
    fn sqrt(self) -> Self {
        // Zero slope at the origin keeps floored arguments finite.
        if self.re > 0.0 {
            DualNum::sqrt(&self)
        } else {
            Self::from(self.re.sqrt())
        }
    }

    #[inline]
    fn powf(self, n: f64) -> Self {
        if self.re != 0.0 {
            DualNum::powf(&self, n)
        } else {
            Self::from(self.re.powf(n))
        }
    }

    #[inline]
    fn sinh(self) -> Self {
        DualNum::sinh(&self)
    }

    #[inline]
    fn cosh(self) -> Self {
        DualNum::cosh(&self)
    }

    #[inline]
    fn tanh(self) -> Self {
        DualNum::tanh(&self)
    }

    #[inline]
    fn asinh(self) -> Self {
        DualNum::asinh(&self)
    }

    #[inline]
    fn abs(self) -> Self {
        if self.re >= 0.0 { self } else { -self }
    }

    #[inline]
    fn is_finite(self) -> bool {
        self.re.is_finite() && (0..N).all(|i| self.partial(i).is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type D2 = Dual<2>;

    fn numeric<F: Fn(f64) -> f64>(f: F, x: f64) -> f64 {
        let h = 1e-6;
        (f(x + h) - f(x - h)) / (2.0 * h)
    }

    #[test]
    fn test_product_rule() {
        let x = D2::variable(3.0, 0);
        let y = D2::variable(4.0, 1);
        let z = x * y + x / y;
        assert!((z.re - 12.75).abs() < 1e-12);
        assert!((z.partial(0) - (4.0 + 0.25)).abs() < 1e-12);
        assert!((z.partial(1) - (3.0 - 3.0 / 16.0)).abs() < 1e-12);
    }

    #[test]
    fn test_transcendentals_match_numeric() {
        let cases: [(fn(D2) -> D2, fn(f64) -> f64); 7] = [
            (|x| x.exp(), f64::exp),
            (|x| x.ln(), f64::ln),
            (|x| x.sqrt(), f64::sqrt),
            (|x| x.powf(1.5), |x| x.powf(1.5)),
            (|x| x.sinh() / x.cosh(), |x| x.tanh()),
            (|x| x.asinh(), f64::asinh),
            (|x| x.ln_1p(), f64::ln_1p),
        ];
        for (dual_fn, real_fn) in cases {
            let x = D2::variable(0.7, 0);
            let y = dual_fn(x);
            assert!((y.re - real_fn(0.7)).abs() < 1e-12);
            assert!((y.partial(0) - numeric(real_fn, 0.7)).abs() < 1e-6);
            assert_eq!(y.partial(1), 0.0);
        }
    }

    #[test]
    fn test_sqrt_at_zero_is_finite() {
        let x = D2::variable(0.0, 0);
        let y = x.sqrt();
        assert!(y.is_finite());
        assert_eq!(y.re, 0.0);
    }

    #[test]
    fn test_f64_is_a_scalar() {
        fn square_plus_one<S: Scalar>(x: S) -> S {
            x.sq() + 1.0
        }
        assert_eq!(square_plus_one(3.0_f64), 10.0);
        let d = square_plus_one(D2::variable(3.0, 1));
        assert_eq!(d.partial(1), 6.0);
    }

    #[test]
    fn test_min_max_select_on_value() {
        let a = D2::variable(1.0, 0);
        let b = D2::variable(2.0, 1);
        assert_eq!(a.max_re(b).partial(1), 1.0);
        assert_eq!(a.min_re(b).partial(0), 1.0);
    }
}
