//! Terminal charges.
//!
//! The intrinsic part follows the channel (inversion charge and its
//! drain/source partition) and the film electrostatics at an effective
//! front potential that tracks the gate below threshold and pins at the
//! strong-inversion target above it. Overlap, back-gate fringe and junction
//! depletion charges are added at the external bias. The source charge
//! closes the balance, so the five charges always sum to zero.

use soispice_core::scalar::Scalar;
use soispice_core::smooth::{smooth_min, soft_floor};

use super::blend::Blended;
use super::evaluate::{EvalContext, Terminals};
use super::instance::SideCaps;
use super::junction::depletion_charge;
use super::threshold::{BodyElectrostatics, Threshold, surface_state};

/// Accumulation floor of the effective front potential, in thermal voltages.
const ACCUMULATION_VT: f64 = 4.0;

/// The five terminal charges (C).
#[derive(Debug, Clone, Copy, Default)]
pub struct Charges<S> {
    pub qgf: S,
    pub qd: S,
    pub qb: S,
    pub qgb: S,
    pub qs: S,
}

impl<S: Scalar> Charges<S> {
    /// All-zero charges, used when charges are not requested.
    pub fn zero() -> Self {
        Self {
            qgf: S::zero(),
            qd: S::zero(),
            qb: S::zero(),
            qgb: S::zero(),
            qs: S::zero(),
        }
    }
}

/// Effective front potential for charge evaluation.
pub fn effective_front_potential<S: Scalar>(ctx: &EvalContext, th: &Threshold<S>, vg: S) -> S {
    let vt = ctx.t.vt;
    let linear = th.psi_wk + (vg - th.vthw) / th.n;
    let pinned = smooth_min(linear, th.psi_st, 2.0 * vt);
    soft_floor(pinned, -ACCUMULATION_VT * vt, vt)
}

/// Terminal charges.
///
/// `inner` is the intrinsic bias after the LDD drops, `outer` the external
/// bias; `source` and `drain` are the extrinsic capacitances of the
/// electrical source and drain.
#[allow(clippy::too_many_arguments)]
pub fn terminal_charges<B: BodyElectrostatics, S: Scalar>(
    body: &B,
    ctx: &EvalContext,
    th: &Threshold<S>,
    channel: &Blended<S>,
    inner: Terminals<S>,
    outer: Terminals<S>,
    source: SideCaps,
    drain: SideCaps,
) -> Charges<S> {
    let inst = ctx.inst;
    let area = inst.weff * inst.leff;

    let psi_f = effective_front_potential(ctx, th, inner.vgfs);
    let state = surface_state(body, ctx, psi_f, th.vgb, th.psi_ref);
    let qdep = state.qdep * area;
    let qgb_int = (th.vgb - state.psi_b) * (ctx.md.coxb * area);

    let vgd = outer.vgfs - outer.vds;
    let vgb_front = outer.vgfs - outer.vbs;
    let vbd = outer.vbs - outer.vds;
    let back_s = outer.vgbs * source.cbg;
    let back_d = (outer.vgbs - outer.vds) * drain.cbg;
    let body_overlap = vgb_front * inst.cgbov;
    let qj_s = depletion_charge(ctx, outer.vbs);
    let qj_d = depletion_charge(ctx, vbd);

    let qgf = channel.qi_tot
        + qdep
        + channel.dqdep
        + outer.vgfs * source.cgov
        + vgd * drain.cgov
        + body_overlap;
    let qgb = qgb_int + back_s + back_d;
    let qd = -channel.qi_d - vgd * drain.cgov - back_d - qj_d;
    let qb = -qdep - channel.dqdep - qgb_int - body_overlap + qj_s + qj_d;
    let qs = -(qgf + qd + qb + qgb);

    Charges {
        qgf,
        qd,
        qb,
        qgb,
        qs,
    }
}
