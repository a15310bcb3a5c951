//! Threshold voltages and surface potentials.
//!
//! The front surface potential is prescribed at two targets, the onset of
//! weak inversion `psi_wk` and of strong inversion `psi_st = psi_wk + 8 Vt`.
//! At each target the back-surface potential follows from the back-interface
//! charge balance, solved with a fixed number of damped Newton updates; the
//! front charge balance then gives the gate voltage, i.e. the threshold.
//!
//! The two body variants differ only in how the film charge couples the two
//! interfaces, which is what [`BodyElectrostatics`] captures.

use soispice_core::constants::{EPS_SI, HBAR, M0, Q};
use soispice_core::scalar::Scalar;
use soispice_core::smooth::{
    floor_denominator, safe_exp, smooth_max, smooth_min, soft_floor, soft_limit, softplus,
    sqrt_pos,
};

use super::evaluate::EvalContext;
use super::mobility::FIELD_FLOOR;

/// Newton updates of the back-surface potential per threshold.
pub const NEWTON_UPDATES: usize = 3;
/// Outer quantization iterations.
pub const QM_ITERATIONS: usize = 3;
/// Soft limit on a single Newton step (V).
const STEP_LIMIT: f64 = 0.5;
/// Weak-inversion target below the classical threshold, in thermal voltages.
const WEAK_OFFSET_VT: f64 = 4.0;
/// Strong-inversion target above the weak one, in thermal voltages.
pub const STRONG_OFFSET_VT: f64 = 8.0;

/// Film charge model of one body variant.
pub trait BodyElectrostatics {
    /// Front-interface depletion and coupling charge per area (C/m^2) at
    /// front potential `psi_f` and back potential `psi_b`.
    fn front_charge<S: Scalar>(&self, ctx: &EvalContext, psi_f: S, psi_b: S) -> S;

    /// Back charge balance residual and its slope in `psi_b`; `vgb` is the
    /// back gate drive Vgbs - Vbs - Vfbb.
    fn back_residual<S: Scalar>(
        &self,
        ctx: &EvalContext,
        psi_f: S,
        psi_b: S,
        vgb: S,
        psi_ref: S,
    ) -> (S, S);

    /// Starting point of the back-surface Newton updates.
    fn back_guess<S: Scalar>(&self, ctx: &EvalContext, psi_f: S, vgb: S) -> S;
}

/// Thin film, depleted through at threshold.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullyDepleted;

/// Thick film with a neutral region below the front depletion layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearBulk;

/// Back-surface carrier charge (inversion minus accumulation) and slope.
fn back_carriers<S: Scalar>(ctx: &EvalContext, psi_b: S, psi_ref: S) -> (S, S) {
    let two_vt = 2.0 * ctx.t.vt;
    let inv = safe_exp((psi_b - psi_ref) / two_vt);
    let acc = safe_exp(-psi_b / two_vt);
    let q = (inv - acc) * ctx.t.qa0;
    let dq = (inv + acc) * (ctx.t.qa0 / two_vt);
    (q, dq)
}

impl BodyElectrostatics for FullyDepleted {
    fn front_charge<S: Scalar>(&self, ctx: &EvalContext, psi_f: S, psi_b: S) -> S {
        (psi_f - psi_b) * ctx.md.cb + psi_f * ctx.md.cit + 0.5 * ctx.md.qntb
    }

    fn back_residual<S: Scalar>(
        &self,
        ctx: &EvalContext,
        psi_f: S,
        psi_b: S,
        vgb: S,
        psi_ref: S,
    ) -> (S, S) {
        let md = ctx.md;
        let (qc, dqc) = back_carriers(ctx, psi_b, psi_ref);
        let charge = (psi_b - psi_f) * md.cb + qc + 0.5 * md.qntb;
        let f = psi_b + charge / md.coxb - vgb;
        let df = (dqc + md.cb) / md.coxb + 1.0;
        (f, df)
    }

    fn back_guess<S: Scalar>(&self, ctx: &EvalContext, psi_f: S, vgb: S) -> S {
        let md = ctx.md;
        (vgb + psi_f * md.beta - 0.5 * md.qntb / md.coxb) / (1.0 + md.beta)
    }
}

impl NearBulk {
    /// Bulk-like depletion charge sqrt(2 q eps Nb psi), smoothly zero in
    /// accumulation, with its slope.
    fn bulk_charge<S: Scalar>(ctx: &EvalContext, psi: S) -> (S, S) {
        let vt = ctx.t.vt;
        let sp = softplus(psi, vt);
        let q = sqrt_pos(sp * (2.0 * ctx.md.qeps_nb));
        let sigma = S::one() - safe_exp(-sp / vt);
        let dq = sigma * ctx.md.qeps_nb / floor_denominator(q);
        (q, dq)
    }

    /// Reach-through weight: 1 once the front depletion spans the film,
    /// decaying over a Debye length otherwise.
    fn reach_through<S: Scalar>(ctx: &EvalContext, psi_f: S) -> S {
        let tb = ctx.p.tb;
        let debye = ctx.t.debye;
        let xd = sqrt_pos(softplus(psi_f, ctx.t.vt) * (2.0 * EPS_SI / (Q * ctx.md.nb)));
        let xd = smooth_min(xd, S::cst(tb), 0.1 * debye);
        safe_exp((xd - tb) / debye)
    }
}

impl BodyElectrostatics for NearBulk {
    fn front_charge<S: Scalar>(&self, ctx: &EvalContext, psi_f: S, psi_b: S) -> S {
        let md = ctx.md;
        let (bulk, _) = Self::bulk_charge(ctx, psi_f);
        let depletion = smooth_min(bulk, S::cst(md.qntb), 0.01 * md.qntb);
        let kappa = Self::reach_through(ctx, psi_f);
        depletion + kappa * (psi_f - psi_b) * md.cb + psi_f * md.cit
    }

    fn back_residual<S: Scalar>(
        &self,
        ctx: &EvalContext,
        psi_f: S,
        psi_b: S,
        vgb: S,
        psi_ref: S,
    ) -> (S, S) {
        let md = ctx.md;
        let (qc, dqc) = back_carriers(ctx, psi_b, psi_ref);
        let (bulk, dbulk) = Self::bulk_charge(ctx, psi_b);
        let kappa = Self::reach_through(ctx, psi_f);
        let charge = bulk + qc + kappa * (psi_b - psi_f) * md.cb;
        let f = psi_b + charge / md.coxb - vgb;
        let df = (dbulk + dqc + kappa * md.cb) / md.coxb + 1.0;
        (f, df)
    }

    fn back_guess<S: Scalar>(&self, ctx: &EvalContext, psi_f: S, vgb: S) -> S {
        let kb = Self::reach_through(ctx, psi_f) * ctx.md.beta;
        (vgb + psi_f * kb) / (kb + 1.0)
    }
}

/// Back-surface potential for front potential `psi_f`: exactly
/// [`NEWTON_UPDATES`] soft-limited Newton updates.
pub fn solve_back<B: BodyElectrostatics, S: Scalar>(
    body: &B,
    ctx: &EvalContext,
    psi_f: S,
    vgb: S,
    psi_ref: S,
) -> S {
    let mut psi_b = body.back_guess(ctx, psi_f, vgb);
    for _ in 0..NEWTON_UPDATES {
        let (f, df) = body.back_residual(ctx, psi_f, psi_b, vgb, psi_ref);
        psi_b -= soft_limit(f / floor_denominator(df), STEP_LIMIT);
    }
    psi_b
}

/// Inversion charge per area at front potential `psi` (C/m^2).
#[inline]
pub fn inversion_charge<S: Scalar>(ctx: &EvalContext, psi: S, psi_ref: S) -> S {
    safe_exp((psi - psi_ref) / ctx.t.vt) * ctx.t.qw0
}

/// Ground-subband energy of the inversion layer at field `field` (eV).
pub fn quantization_shift<S: Scalar>(mass: f64, field: S) -> S {
    let kinetic = (HBAR * HBAR / (2.0 * mass * M0)).powf(1.0 / 3.0);
    let drive = soft_floor(field, FIELD_FLOOR, 1e3) * (9.0 * std::f64::consts::PI * Q / 8.0);
    drive.powf(2.0 / 3.0) * (kinetic / Q)
}

/// Surface state at one front potential.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceState<S> {
    /// Back-surface potential (V).
    pub psi_b: S,
    /// Front depletion charge (C/m^2).
    pub qdep: S,
    /// Gate-to-body voltage that holds this state (V).
    pub vgb_front: S,
}

/// Evaluate the back solve and front charge balance at `psi_f`.
pub fn surface_state<B: BodyElectrostatics, S: Scalar>(
    body: &B,
    ctx: &EvalContext,
    psi_f: S,
    vgb: S,
    psi_ref: S,
) -> SurfaceState<S> {
    let psi_b = solve_back(body, ctx, psi_f, vgb, psi_ref);
    let qdep = body.front_charge(ctx, psi_f, psi_b);
    SurfaceState {
        psi_b,
        qdep,
        vgb_front: psi_f + qdep / ctx.md.coxf + ctx.t.vfbf,
    }
}

/// Thresholds and the quantities the region models need from them.
#[derive(Debug, Clone, Copy)]
pub struct Threshold<S> {
    /// Strong-inversion threshold, referred to the source (V).
    pub vths: S,
    /// Weak-inversion threshold, referred to the source (V).
    pub vthw: S,
    /// Chord body factor (Vths - Vthw) / (psi_st - psi_wk).
    pub n: S,
    /// Weak-inversion target potential (V).
    pub psi_wk: S,
    /// Strong-inversion target potential (V).
    pub psi_st: S,
    /// Reference potential of the inversion charge (V).
    pub psi_ref: S,
    /// Inversion charge at the strong-inversion target (C/m^2).
    pub qi_th: S,
    /// Front depletion charge at the strong-inversion target (C/m^2).
    pub qdep_th: S,
    /// Back gate drive Vgbs - Vbs - Vfbb (V).
    pub vgb: S,
    /// Quantization shift applied to both targets (V).
    pub qm_shift: S,
}

/// Compute Vths and Vthw at bias (`vds`, `vbs`, `vgbs`).
pub fn solve<B: BodyElectrostatics, S: Scalar>(
    body: &B,
    ctx: &EvalContext,
    vds: S,
    vbs: S,
    vgbs: S,
) -> Threshold<S> {
    let vt = ctx.t.vt;
    let two_phi = 2.0 * ctx.t.phi_b;
    let vgb = vgbs - vbs - ctx.t.vfbb;

    let psi_wk = soft_floor(-vbs + (two_phi - WEAK_OFFSET_VT * vt), 2.0 * vt, vt);
    let psi_st = psi_wk + STRONG_OFFSET_VT * vt;
    let psi_ref = psi_wk + WEAK_OFFSET_VT * vt;
    let qi_th = inversion_charge(ctx, psi_st, psi_ref);

    let mut shift = S::zero();
    if ctx.p.quantum {
        for _ in 0..QM_ITERATIONS {
            let st = surface_state(body, ctx, psi_st + shift, vgb, psi_ref);
            let field = (st.qdep + qi_th * 0.5) / EPS_SI;
            shift = quantization_shift(ctx.p.mqm, field);
        }
    }

    let strong = surface_state(body, ctx, psi_st + shift, vgb, psi_ref);
    let weak = surface_state(body, ctx, psi_wk + shift, vgb, psi_ref);

    // Short-channel and drain-induced barrier lowering.
    let dvth = -((S::cst(ctx.t.vbi) - psi_st) * 2.0 + vds) * (ctx.p.sce * ctx.inst.sce_factor);

    let vths = vbs + strong.vgb_front + dvth;
    let vthw = vbs + weak.vgb_front + dvth;
    let n = smooth_max((vths - vthw) / (STRONG_OFFSET_VT * vt), S::one(), 1e-3);

    Threshold {
        vths,
        vthw,
        n,
        psi_wk: psi_wk + shift,
        psi_st: psi_st + shift,
        psi_ref: psi_ref + shift,
        qi_th,
        qdep_th: strong.qdep,
        vgb,
        qm_shift: shift,
    }
}
