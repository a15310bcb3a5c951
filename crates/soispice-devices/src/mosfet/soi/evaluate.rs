//! The raw bias evaluator.
//!
//! [`evaluate_raw`] maps the caller's terminal voltages into the canonical
//! frame (n-channel, `vds >= 0`), runs the LDD series solve and the
//! intrinsic channel, adds the parasitic currents and charges, and maps the
//! results back. It is generic over [`Scalar`], so the same body produces
//! plain values (`f64`) or values with exact bias partials (`Dual<4>`).

use soispice_core::config::ModelConfig;
use soispice_core::scalar::Scalar;

use super::blend::{self, Blended, Region};
use super::channel::drain_factor;
use super::charge::{self, Charges};
use super::derived::ModelDerived;
use super::instance::{InstanceDerived, SideCaps};
use super::params::{BodyVariant, ModelParams};
use super::temperature::TemperatureDerived;
use super::threshold::{self, BodyElectrostatics, FullyDepleted, NearBulk, Threshold};
use super::{bipolar, gidl, junction, ldd, tunneling};

/// Everything a raw evaluation reads. Borrowed, never mutated.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub p: &'a ModelParams,
    pub md: &'a ModelDerived,
    pub inst: &'a InstanceDerived,
    pub t: &'a TemperatureDerived,
    pub config: &'a ModelConfig,
}

/// Terminal voltages referred to the source (V).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Terminals<S> {
    pub vds: S,
    pub vgfs: S,
    pub vbs: S,
    pub vgbs: S,
}

impl<S: Scalar> Terminals<S> {
    /// Value parts.
    pub fn re(&self) -> Terminals<f64> {
        Terminals {
            vds: self.vds.re(),
            vgfs: self.vgfs.re(),
            vbs: self.vbs.re(),
            vgbs: self.vgbs.re(),
        }
    }

    fn scaled(self, k: f64) -> Self {
        Self {
            vds: self.vds * k,
            vgfs: self.vgfs * k,
            vbs: self.vbs * k,
            vgbs: self.vgbs * k,
        }
    }

    /// Same bias seen from the drain.
    fn swapped(self) -> Self {
        Self {
            vds: -self.vds,
            vgfs: self.vgfs - self.vds,
            vbs: self.vbs - self.vds,
            vgbs: self.vgbs - self.vds,
        }
    }

    /// Intrinsic bias behind LDD drops of `x` at each end.
    fn shifted(self, x: S) -> Self {
        Self {
            vds: self.vds - x * 2.0,
            vgfs: self.vgfs - x,
            vbs: self.vbs - x,
            vgbs: self.vgbs - x,
        }
    }
}

/// Scalar summary of one raw evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawInfo {
    pub vdsat: f64,
    pub vths: f64,
    pub vthw: f64,
    pub region: Region,
    /// Channel length after saturation-region shortening (m).
    pub leff: f64,
    pub ueff: f64,
    /// Inversion charge magnitude (C).
    pub qinv: f64,
    /// Voltage across one LDD extension (V).
    pub ldd_drop: f64,
    /// Source and drain were exchanged to make `vds` non-negative.
    pub reversed: bool,
}

/// Currents (A) and charges (C) of one raw evaluation.
///
/// Currents follow the device convention: `ich` and `ibjt` drain to
/// source, `irs`/`ird` body to source/drain, `igidl`/`igisl` drain/source
/// to body, `igi` high-field side to body, `igb` front gate to body.
#[derive(Debug, Clone, Copy)]
pub struct RawOutputs<S> {
    pub ich: S,
    pub ibjt: S,
    pub irs: S,
    pub ird: S,
    pub igidl: S,
    pub igisl: S,
    pub igi: S,
    pub igb: S,
    pub qgf: S,
    pub qd: S,
    pub qb: S,
    pub qgb: S,
    pub qs: S,
    pub info: RawInfo,
}

/// Number of scalar outputs of a raw evaluation.
pub const OUTPUTS: usize = 13;

impl<S: Scalar> RawOutputs<S> {
    /// Outputs in declaration order.
    pub fn to_array(&self) -> [S; OUTPUTS] {
        [
            self.ich, self.ibjt, self.irs, self.ird, self.igidl, self.igisl, self.igi, self.igb,
            self.qgf, self.qd, self.qb, self.qgb, self.qs,
        ]
    }

    fn scaled(mut self, k: f64) -> Self {
        for v in [
            &mut self.ich,
            &mut self.ibjt,
            &mut self.irs,
            &mut self.ird,
            &mut self.igidl,
            &mut self.igisl,
            &mut self.igi,
            &mut self.igb,
            &mut self.qgf,
            &mut self.qd,
            &mut self.qb,
            &mut self.qgb,
            &mut self.qs,
        ] {
            *v = *v * k;
        }
        self
    }
}

struct Intrinsic<S> {
    inner: Terminals<S>,
    th: Threshold<S>,
    channel: Blended<S>,
    ich: S,
    igi: S,
}

fn intrinsic<B: BodyElectrostatics, S: Scalar>(
    body: &B,
    ctx: &EvalContext,
    v: Terminals<S>,
    drop: S,
) -> Intrinsic<S> {
    let inner = v.shifted(drop);
    let th = threshold::solve(body, ctx, inner.vds, inner.vbs, inner.vgbs);
    let channel = blend::blend(ctx, &th, inner.vgfs, inner.vds, drop);
    let ich = drain_factor(ctx, inner.vds) * channel.g;
    let igi = if ctx.p.impact {
        ich * channel.sigma
    } else {
        S::zero()
    };
    Intrinsic {
        inner,
        th,
        channel,
        ich,
        igi,
    }
}

fn evaluate_canonical<B: BodyElectrostatics, S: Scalar>(
    body: &B,
    ctx: &EvalContext,
    v: Terminals<S>,
    with_charges: bool,
    source: SideCaps,
    drain: SideCaps,
) -> RawOutputs<S> {
    let v0 = v.re();
    let drop = ldd::series_drop(
        ctx,
        v.vds,
        |x: f64| intrinsic(body, ctx, v0, x).ich,
        |x: S| intrinsic(body, ctx, v, x).ich,
    );
    let core = intrinsic(body, ctx, v, drop);

    let vbd = v.vbs - v.vds;
    let (igidl, igisl) = gidl::currents(ctx, v.vgfs, v.vds);
    let q = if with_charges {
        charge::terminal_charges(
            body,
            ctx,
            &core.th,
            &core.channel,
            core.inner,
            v,
            source,
            drain,
        )
    } else {
        Charges::zero()
    };

    RawOutputs {
        ich: core.ich,
        ibjt: bipolar::collector_current(ctx, v.vbs, vbd),
        irs: junction::leakage(ctx, v.vbs),
        ird: junction::leakage(ctx, vbd),
        igidl,
        igisl,
        igi: core.igi,
        igb: tunneling::gate_current(ctx, v.vds, v.vgfs),
        qgf: q.qgf,
        qd: q.qd,
        qb: q.qb,
        qgb: q.qgb,
        qs: q.qs,
        info: RawInfo {
            vdsat: core.channel.vdsat,
            vths: core.th.vths.re(),
            vthw: core.th.vthw.re(),
            region: core.channel.region,
            leff: core.channel.lch,
            ueff: core.channel.mu,
            qinv: core.channel.qi_tot.re(),
            ldd_drop: drop.re(),
            reversed: false,
        },
    }
}

/// Currents and charges at `bias` for body electrostatics `body`.
///
/// Results are scaled by the parallel multiplier and carry the caller's
/// polarity. Charges are zero unless `with_charges` is set.
///
/// Negative `vds` is evaluated with source and drain exchanged. Currents and
/// charges are continuous through `vds = 0`, but the body is referenced to
/// the source, so charge partials with respect to `vds` can differ by a few
/// percent between the two orientations there.
pub fn evaluate_raw<B: BodyElectrostatics, S: Scalar>(
    body: &B,
    ctx: &EvalContext,
    bias: Terminals<S>,
    with_charges: bool,
) -> RawOutputs<S> {
    let sgn = ctx.p.polarity.sign();
    let v = bias.scaled(sgn);
    let reversed = v.vds.re() < 0.0;

    let mut out = if reversed {
        evaluate_canonical(
            body,
            ctx,
            v.swapped(),
            with_charges,
            ctx.inst.drain,
            ctx.inst.source,
        )
    } else {
        evaluate_canonical(
            body,
            ctx,
            v,
            with_charges,
            ctx.inst.source,
            ctx.inst.drain,
        )
    };

    if reversed {
        out.ich = -out.ich;
        out.ibjt = -out.ibjt;
        std::mem::swap(&mut out.irs, &mut out.ird);
        std::mem::swap(&mut out.igidl, &mut out.igisl);
        std::mem::swap(&mut out.qd, &mut out.qs);
    }
    out.info.reversed = reversed;
    out.info.vths *= sgn;
    out.info.vthw *= sgn;
    out.info.vdsat *= sgn;
    out.info.qinv *= sgn * ctx.inst.m;
    out.scaled(sgn * ctx.inst.m)
}

/// [`evaluate_raw`] with the body electrostatics of the model's variant.
pub fn evaluate_variant<S: Scalar>(
    ctx: &EvalContext,
    bias: Terminals<S>,
    with_charges: bool,
) -> RawOutputs<S> {
    match ctx.p.variant {
        BodyVariant::FullyDepleted => evaluate_raw(&FullyDepleted, ctx, bias, with_charges),
        BodyVariant::NearBulk => evaluate_raw(&NearBulk, ctx, bias, with_charges),
    }
}
