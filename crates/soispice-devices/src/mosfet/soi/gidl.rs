//! Gate-induced drain and source leakage.

use soispice_core::scalar::Scalar;
use soispice_core::smooth::{safe_exp, soft_floor, softplus};

use super::evaluate::EvalContext;

/// Smoothing width of the band-bending onset (V).
const ONSET_WIDTH: f64 = 0.05;
/// Lowest tunneling field considered (V/m).
const FIELD_FLOOR: f64 = 1e3;

/// Band-to-band current for a diffusion-to-gate voltage `v`.
pub fn leakage<S: Scalar>(ctx: &EvalContext, v: S) -> S {
    if !ctx.p.gidl {
        return S::zero();
    }
    let drive = softplus(v - ctx.p.egidl, ONSET_WIDTH);
    let field = soft_floor(drive / (3.0 * ctx.p.toxf), FIELD_FLOOR, 0.1 * FIELD_FLOOR);
    field.sq() * safe_exp(-S::cst(ctx.t.bgidl) / field) * (ctx.p.agidl * ctx.inst.weff)
}

/// GIDL at the drain and GISL at the source for gate-source `vgs` and
/// drain-source `vds`.
pub fn currents<S: Scalar>(ctx: &EvalContext, vgs: S, vds: S) -> (S, S) {
    (leakage(ctx, vds - vgs), leakage(ctx, -vgs))
}
