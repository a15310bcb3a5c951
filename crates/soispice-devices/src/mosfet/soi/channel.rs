//! Strong-inversion and subthreshold channel branches.
//!
//! Both branches return the channel current divided by
//! `phi(vds) = Vt (1 - exp(-vds/Vt))`. That quotient stays finite and
//! positive at zero drain bias, which keeps the log-space blend well defined
//! there; the current itself is recovered as `phi * g`.

use soispice_core::scalar::Scalar;
use soispice_core::smooth::{safe_exp, smooth_max, smooth_min, soft_limit};

use super::evaluate::EvalContext;
use super::impact;
use super::mobility::{effective_field, mobility, saturation, saturation_field};
use super::threshold::{Threshold, inversion_charge};

/// Floor of the strong-inversion gate overdrive (V).
const VGT_FLOOR: f64 = 1e-4;
/// Smoothing width of the overdrive floor (V).
const VGT_WIDTH: f64 = 1e-5;
/// Drain bias below which `vdse / phi` uses its zero-bias limit (V).
const SMALL_VDS: f64 = 1e-9;
/// Subthreshold drain saturation, in thermal voltages.
const WEAK_VDSAT_VT: f64 = 4.0;

/// One branch evaluated at one gate voltage.
#[derive(Debug, Clone, Copy)]
pub struct BranchPoint<S> {
    /// Channel current over `phi(vds)` (A/V).
    pub g: S,
    /// Total inversion charge magnitude (C).
    pub qi_tot: S,
    /// Drain share of the inversion charge (C).
    pub qi_d: S,
    /// Depletion charge added by the channel potential (C).
    pub dqdep: S,
    /// Impact multiplication factor.
    pub sigma: S,
    /// Drain saturation voltage (V).
    pub vdsat: S,
    /// Effective mobility (m^2/V-s).
    pub mu: S,
    /// Channel length after saturation-region shortening (m).
    pub lch: S,
}

/// `Vt (1 - exp(-vds/Vt))`, zero at zero drain bias.
#[inline]
pub fn drain_factor<S: Scalar>(ctx: &EvalContext, vds: S) -> S {
    (S::one() - safe_exp(-vds / ctx.t.vt)) * ctx.t.vt
}

/// Strong-inversion branch at gate voltage `vg`.
pub fn strong<S: Scalar>(
    ctx: &EvalContext,
    th: &Threshold<S>,
    vg: S,
    vds: S,
    ldd_drop: S,
) -> BranchPoint<S> {
    let (p, md, inst) = (ctx.p, ctx.md, ctx.inst);
    let alpha = th.n;
    let vgt = smooth_max(
        vg - th.vths + th.qi_th / md.coxf,
        S::cst(VGT_FLOOR),
        VGT_WIDTH,
    );
    let field = effective_field(th.qdep_th, vgt * md.coxf);
    let mu = mobility(ctx.t.u0, p.ua, p.ub, field);
    let esat = saturation_field(ctx.t.vsat_eff, mu);
    let sat = saturation(vgt, alpha, esat, inst.leff, vds, p.delta, md.lc, p.clm);

    let lch = -sat.delta_l + inst.leff;
    let beta = mu * (inst.weff * md.coxf) / (lch * (sat.vdse / (esat * lch) + 1.0));
    let drive = beta * (vgt - alpha * sat.vdse * 0.5);
    let ratio = if vds.re() < SMALL_VDS {
        sat.vdsat / (sat.vdsat + p.delta)
    } else {
        sat.vdse / drain_factor(ctx, vds)
    };

    let wlc = inst.weff * inst.leff * md.coxf;
    let g = vgt;
    let a = alpha * sat.vdse;
    let mid = g - a * 0.5;
    let qi_tot = (g.sq() * 3.0 - g * a * 3.0 + a.sq()) / (mid * 3.0) * wlc;
    let qi_d = (g.sq() * g * 0.5 - g.sq() * a * (5.0 / 6.0) + g * a.sq() * 0.5
        - a.sq() * a * 0.1)
        / mid.sq()
        * wlc;
    let dqdep = (alpha - 1.0) * (a / alpha) * (g * 0.5 - a / 3.0) / mid * wlc;

    BranchPoint {
        g: drive * ratio,
        qi_tot,
        qi_d,
        dqdep,
        sigma: impact::multiplication(ctx, esat, sat.delta_l, ldd_drop),
        vdsat: sat.vdsat,
        mu,
        lch,
    }
}

/// Subthreshold (diffusion) branch at gate voltage `vg`.
pub fn weak<S: Scalar>(
    ctx: &EvalContext,
    th: &Threshold<S>,
    vg: S,
    vds: S,
    ldd_drop: S,
) -> BranchPoint<S> {
    let (p, md, inst) = (ctx.p, ctx.md, ctx.inst);
    let vt = ctx.t.vt;
    let psi_s = th.psi_wk + (vg - th.vthw) / th.n;
    let qs = inversion_charge(ctx, psi_s, th.psi_ref);
    let qd = qs * safe_exp(-vds / vt);

    let field = effective_field(th.qdep_th, qs);
    let mu = mobility(ctx.t.u0, p.ua, p.ub, field);

    let esat = saturation_field(ctx.t.vsat_eff, mu);
    let vdsat = S::cst(WEAK_VDSAT_VT * vt);
    let vdse = smooth_min(vds, vdsat, p.delta);
    let delta_l = soft_limit(
        ((vds - vdse) / (esat * md.lc)).asinh() * (md.lc * p.clm),
        0.5 * inst.leff,
    );

    let area = inst.weff * inst.leff;
    BranchPoint {
        g: mu * qs * (inst.weff / inst.leff),
        qi_tot: (qs + qd) * (0.5 * area),
        qi_d: (qs / 6.0 + qd / 3.0) * area,
        dqdep: S::zero(),
        sigma: impact::multiplication(ctx, esat, delta_l, ldd_drop),
        vdsat,
        mu,
        lch: -delta_l + inst.leff,
    }
}
