//! Nonlocal impact ionization.
//!
//! The multiplication factor is the integral of the ionization coefficient
//! along the high-field part of the drain: the velocity-saturated channel
//! segment, the depleted LDD segment and the quasi-neutral remainder of the
//! LDD. The coefficient follows the carrier temperature, not the local field.

use soispice_core::constants::{EPS_SI, KB, Q};
use soispice_core::quadrature::romberg;
use soispice_core::scalar::Scalar;
use soispice_core::smooth::{floor_denominator, safe_exp};

use super::evaluate::EvalContext;

/// Relative tolerance of each segment integral.
pub const ROMBERG_TOLERANCE: f64 = 1e-9;
/// Refinement levels per segment integral.
const ROMBERG_LEVELS: usize = 7;

/// Ionization coefficient at field `field` (1/m).
pub fn ionization_coefficient<S: Scalar>(ctx: &EvalContext, field: S) -> S {
    let heating = 2.0 * Q * ctx.p.tauw * ctx.t.vsat / (3.0 * KB);
    let tc = field.abs() * heating + ctx.t.temp;
    safe_exp(S::cst(-(ctx.p.eii * Q / KB)) / tc) * ctx.p.aii
}

fn integrate<S, F>(ctx: &EvalContext, segment: &str, f: F, length: S) -> S
where
    S: Scalar,
    F: Fn(S) -> S,
{
    let out = romberg(f, S::zero(), length, ROMBERG_LEVELS, ROMBERG_TOLERANCE);
    if !out.converged && ctx.config.diagnostics_enabled() {
        log::debug!(
            "{}: impact ionization {segment} integral stopped after {} levels",
            ctx.config.name,
            out.levels
        );
    }
    out.value
}

/// Multiplication factor: the ratio of impact-ionization current to channel
/// current.
///
/// `esat` and `delta_l` describe the saturated channel segment, `ldd_drop`
/// is the voltage across one LDD extension.
pub fn multiplication<S: Scalar>(ctx: &EvalContext, esat: S, delta_l: S, ldd_drop: S) -> S {
    if !ctx.p.impact {
        return S::zero();
    }
    let lc = ctx.md.lc;

    let channel = integrate(
        ctx,
        "channel",
        |x: S| ionization_coefficient(ctx, esat * (x / lc).cosh()),
        delta_l,
    );

    let lldd = ctx.p.lldd;
    if lldd <= 0.0 {
        return channel;
    }

    // Depleted part of the LDD: linear decay from the peak field.
    let peak = esat * (delta_l / lc).cosh();
    let ld_raw = peak * (EPS_SI / (Q * ctx.md.nldd));
    let ld = ld_raw * lldd / (ld_raw + lldd);
    let depleted = integrate(
        ctx,
        "depleted LDD",
        |x: S| {
            let e = peak * (S::one() - x / floor_denominator(ld_raw));
            ionization_coefficient(ctx, e)
        },
        ld,
    );

    // Ohmic remainder at the average LDD field.
    let neutral = ionization_coefficient(ctx, ldd_drop / lldd) * (-ld + lldd);

    channel + depleted + neutral
}
