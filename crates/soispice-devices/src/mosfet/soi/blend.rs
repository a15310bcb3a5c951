//! Region selection and the C1 transition blend.
//!
//! Between the weak-inversion threshold `Vthw` and the strong-inversion
//! threshold `Vths` neither branch is valid. Each branch is sampled at its
//! own threshold (value plus central slope, step [`BLEND_STEP`]) and the
//! gap is bridged by two quadratic pieces joined at the midpoint, matching
//! value and slope at both ends. Positive quantities are blended in log
//! space, sign-indefinite ones linearly.

use serde::{Deserialize, Serialize};
use soispice_core::scalar::Scalar;
use soispice_core::smooth::{floor_denominator, ln_pos};

use super::channel::{self, BranchPoint};
use super::evaluate::EvalContext;
use super::threshold::Threshold;

/// Step of the central slopes at the blend anchors (V).
pub const BLEND_STEP: f64 = 1e-3;

/// Conduction regime of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Region {
    /// Vgfs at or above the strong-inversion threshold.
    #[default]
    Strong,
    /// Between the two thresholds.
    Transition,
    /// At or below the weak-inversion threshold.
    Subthreshold,
}

impl Region {
    /// Classify gate voltage `vg` against the two thresholds.
    pub fn classify(vg: f64, vthw: f64, vths: f64) -> Self {
        if vg >= vths {
            Region::Strong
        } else if vg <= vthw {
            Region::Subthreshold
        } else {
            Region::Transition
        }
    }
}

/// Channel quantities after blending.
#[derive(Debug, Clone, Copy)]
pub struct Blended<S> {
    /// Channel current over `phi(vds)` (A/V).
    pub g: S,
    /// Total inversion charge (C).
    pub qi_tot: S,
    /// Drain share of the inversion charge (C).
    pub qi_d: S,
    /// Channel-potential depletion increment (C).
    pub dqdep: S,
    /// Impact multiplication factor.
    pub sigma: S,
    /// Which regime produced the values.
    pub region: Region,
    /// Saturation voltage, interpolated linearly in the transition (V).
    pub vdsat: f64,
    /// Effective mobility, interpolated linearly in the transition.
    pub mu: f64,
    /// Shortened channel length, interpolated linearly in the transition (m).
    pub lch: f64,
}

impl<S: Scalar> From<(BranchPoint<S>, Region)> for Blended<S> {
    fn from((b, region): (BranchPoint<S>, Region)) -> Self {
        Self {
            g: b.g,
            qi_tot: b.qi_tot,
            qi_d: b.qi_d,
            dqdep: b.dqdep,
            sigma: b.sigma,
            region,
            vdsat: b.vdsat.re(),
            mu: b.mu.re(),
            lch: b.lch.re(),
        }
    }
}

/// Value and slope of one quantity at one blend anchor.
#[derive(Debug, Clone, Copy)]
struct Anchor<S> {
    y: S,
    s: S,
}

impl<S: Scalar> Anchor<S> {
    fn new(lo: S, mid: S, hi: S) -> Self {
        Self {
            y: mid,
            s: (hi - lo) / (2.0 * BLEND_STEP),
        }
    }
}

/// Two-piece C1 quadratic through (`a`, `left`) and (`b`, `right`) at `v`.
fn spline<S: Scalar>(v: S, a: S, b: S, left: Anchor<S>, right: Anchor<S>) -> S {
    let h = floor_denominator(b - a);
    let c1 = ((right.y - left.y) - h * (left.s * 3.0 + right.s) * 0.25) * 2.0 / h.sq();
    let c2 = (right.s - left.s) / h - c1;
    let t = v - a;
    if t.re() <= 0.5 * h.re() {
        left.y + left.s * t + c1 * t.sq()
    } else {
        let u = v - b;
        right.y + right.s * u + c2 * u.sq()
    }
}

/// Spline a positive quantity through log space.
fn spline_log<S: Scalar>(v: S, a: S, b: S, weak: [S; 3], strong: [S; 3]) -> S {
    let ln = |x: [S; 3]| Anchor::new(ln_pos(x[0]), ln_pos(x[1]), ln_pos(x[2]));
    spline(v, a, b, ln(weak), ln(strong)).exp()
}

/// Spline a sign-indefinite quantity linearly.
fn spline_lin<S: Scalar>(v: S, a: S, b: S, weak: [S; 3], strong: [S; 3]) -> S {
    let lin = |x: [S; 3]| Anchor::new(x[0], x[1], x[2]);
    spline(v, a, b, lin(weak), lin(strong))
}

/// Evaluate the channel at gate voltage `vg`, blending across the
/// transition region.
pub fn blend<S: Scalar>(
    ctx: &EvalContext,
    th: &Threshold<S>,
    vg: S,
    vds: S,
    ldd_drop: S,
) -> Blended<S> {
    let region = Region::classify(vg.re(), th.vthw.re(), th.vths.re());
    match region {
        Region::Strong => (channel::strong(ctx, th, vg, vds, ldd_drop), region).into(),
        Region::Subthreshold => (channel::weak(ctx, th, vg, vds, ldd_drop), region).into(),
        Region::Transition => {
            let (a, b) = (th.vthw, th.vths);
            let weak = [
                channel::weak(ctx, th, a - BLEND_STEP, vds, ldd_drop),
                channel::weak(ctx, th, a, vds, ldd_drop),
                channel::weak(ctx, th, a + BLEND_STEP, vds, ldd_drop),
            ];
            let strong = [
                channel::strong(ctx, th, b - BLEND_STEP, vds, ldd_drop),
                channel::strong(ctx, th, b, vds, ldd_drop),
                channel::strong(ctx, th, b + BLEND_STEP, vds, ldd_drop),
            ];
            let pick = |pts: &[BranchPoint<S>; 3], f: fn(&BranchPoint<S>) -> S| {
                [f(&pts[0]), f(&pts[1]), f(&pts[2])]
            };

            let w = ((vg.re() - a.re()) / (b.re() - a.re())).clamp(0.0, 1.0);
            let lerp = |x: S, y: S| x.re() + w * (y.re() - x.re());

            Blended {
                g: spline_log(vg, a, b, pick(&weak, |p| p.g), pick(&strong, |p| p.g)),
                qi_tot: spline_log(
                    vg,
                    a,
                    b,
                    pick(&weak, |p| p.qi_tot),
                    pick(&strong, |p| p.qi_tot),
                ),
                qi_d: spline_log(vg, a, b, pick(&weak, |p| p.qi_d), pick(&strong, |p| p.qi_d)),
                dqdep: spline_lin(
                    vg,
                    a,
                    b,
                    pick(&weak, |p| p.dqdep),
                    pick(&strong, |p| p.dqdep),
                ),
                sigma: spline_log(
                    vg,
                    a,
                    b,
                    pick(&weak, |p| p.sigma),
                    pick(&strong, |p| p.sigma),
                ),
                region,
                vdsat: lerp(weak[1].vdsat, strong[1].vdsat),
                mu: lerp(weak[1].mu, strong[1].mu),
                lch: lerp(weak[1].lch, strong[1].lch),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mosfet::soi::evaluate::tests::fixture;
    use crate::mosfet::soi::params::ModelCard;
    use crate::mosfet::soi::threshold::{FullyDepleted, solve};
    use soispice_core::scalar::{Dual, Partials};

    #[test]
    fn test_classify() {
        assert_eq!(Region::classify(1.0, 0.2, 0.4), Region::Strong);
        assert_eq!(Region::classify(0.4, 0.2, 0.4), Region::Strong);
        assert_eq!(Region::classify(0.3, 0.2, 0.4), Region::Transition);
        assert_eq!(Region::classify(0.2, 0.2, 0.4), Region::Subthreshold);
    }

    #[test]
    fn test_spline_matches_anchors() {
        let left = Anchor { y: 1.0, s: 2.0 };
        let right = Anchor { y: 3.0, s: 0.5 };
        let at = |v: f64| spline(v, 0.0, 1.0, left, right);
        assert!((at(0.0) - 1.0).abs() < 1e-12);
        assert!((at(1.0) - 3.0).abs() < 1e-12);
        let h = 1e-6;
        assert!(((at(h) - at(0.0)) / h - 2.0).abs() < 1e-4);
        assert!(((at(1.0) - at(1.0 - h)) / h - 0.5).abs() < 1e-4);
        // Value and slope continuous at the joint.
        assert!((at(0.5 + h) - at(0.5 - h)).abs() < 1e-5);
        let dl = (at(0.5) - at(0.5 - h)) / h;
        let dr = (at(0.5 + 2.0 * h) - at(0.5 + h)) / h;
        assert!((dl - dr).abs() < 1e-4);
    }

    #[test]
    fn test_blend_continuous_at_thresholds() {
        let f = fixture(ModelCard::default());
        let ctx = f.ctx();
        let th = solve(&FullyDepleted, &ctx, 0.1, 0.0, 0.0);
        let eps = 1e-9;
        for edge in [th.vthw, th.vths] {
            let lo = blend(&ctx, &th, edge - eps, 0.1, 0.0);
            let hi = blend(&ctx, &th, edge + eps, 0.1, 0.0);
            assert_ne!(lo.region, hi.region);
            assert!((lo.g.ln() - hi.g.ln()).abs() < 1e-5);
            assert!(((lo.qi_tot - hi.qi_tot) / hi.qi_tot).abs() < 1e-5);
        }
    }

    #[test]
    fn test_blend_monotone_in_gate() {
        let f = fixture(ModelCard::default());
        let ctx = f.ctx();
        let th = solve(&FullyDepleted, &ctx, 0.1, 0.0, 0.0);
        let mut last = 0.0;
        for k in 0..=100 {
            let vg = th.vthw - 0.05 + (th.vths - th.vthw + 0.1) * k as f64 / 100.0;
            let b = blend(&ctx, &th, vg, 0.1, 0.0);
            assert!(b.g > last, "not increasing at vg = {vg}");
            last = b.g;
        }
    }

    #[test]
    fn test_transition_derivative_finite() {
        let f = fixture(ModelCard::default());
        let ctx = f.ctx();
        let th = solve(&FullyDepleted, &ctx, 0.1, 0.0, 0.0);
        let vg = Dual::<4>::variable(0.5 * (th.vthw + th.vths), 1);
        let th_d = solve(
            &FullyDepleted,
            &ctx,
            Dual::<4>::variable(0.1, 0),
            Dual::constant(0.0),
            Dual::constant(0.0),
        );
        let b = blend(&ctx, &th_d, vg, Dual::variable(0.1, 0), Dual::constant(0.0));
        assert_eq!(b.region, Region::Transition);
        assert!(b.g.is_finite() && b.g.partial(1) > 0.0);
    }
}
