//! Gate-to-body direct tunneling.
//!
//! The oxide voltage varies along the channel with the channel potential, so
//! the current density is integrated over the channel with a fixed-node
//! trapezoid rule. The integral is evaluated in plain `f64`; its two bias
//! conductances come from forward differences and are relinearized onto the
//! caller's scalar type.

use soispice_core::quadrature::trapezoid;
use soispice_core::scalar::Scalar;
use soispice_core::smooth::{safe_exp, softplus};

use super::derived::TunnelBarrier;
use super::evaluate::EvalContext;

/// Forward-difference step of the conductances (V).
pub const TUNNEL_STEP: f64 = 1e-4;
/// Smoothing width of the oxide voltage (V).
const VOX_WIDTH: f64 = 0.05;
/// Lowest oxide field (V/m).
const EOX_FLOOR: f64 = 1e5;

/// Tunneling current density through `barrier` for oxide voltage `vox` (A/m^2).
pub fn current_density(barrier: &TunnelBarrier, toxf: f64, vox: f64) -> f64 {
    let vox = vox.max(EOX_FLOOR * toxf);
    let eox = vox / toxf;
    let shape = 1.0 - (1.0 - vox / barrier.phib).max(0.0).powf(1.5);
    barrier.a * eox * eox * safe_exp(-barrier.b * shape / eox)
}

/// Net gate tunneling current at canonical bias (`vds`, `vgfs`) in `f64`.
pub fn gate_current_f64(ctx: &EvalContext, vds: f64, vgfs: f64) -> f64 {
    let md = ctx.md;
    let toxf = ctx.p.toxf;
    let vox0 = vgfs - ctx.t.vfbf - 2.0 * ctx.t.phi_b;
    let density = |x: f64| {
        let vox = vox0 - vds * x;
        let ecb = current_density(&md.tunnel_ecb, toxf, softplus(vox, VOX_WIDTH));
        let evb = current_density(&md.tunnel_evb, toxf, softplus(-vox, VOX_WIDTH));
        ecb - evb
    };
    let mean = trapezoid(density, 0.0, 1.0, ctx.p.ntun - 1);
    ctx.p.aigb * ctx.inst.weff * ctx.inst.leff * mean
}

/// Net gate tunneling current with its `vds` and `vgfs` sensitivities
/// carried by `S`.
pub fn gate_current<S: Scalar>(ctx: &EvalContext, vds: S, vgfs: S) -> S {
    if !ctx.p.tunneling {
        return S::zero();
    }
    let (v0, g0) = (vds.re(), vgfs.re());
    let i0 = gate_current_f64(ctx, v0, g0);
    let g_ds = (gate_current_f64(ctx, v0 + TUNNEL_STEP, g0) - i0) / TUNNEL_STEP;
    let g_gs = (gate_current_f64(ctx, v0, g0 + TUNNEL_STEP) - i0) / TUNNEL_STEP;
    S::cst(i0) + (vds - v0) * g_ds + (vgfs - g0) * g_gs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mosfet::soi::evaluate::tests::fixture;
    use crate::mosfet::soi::params::ModelCard;
    use soispice_core::scalar::{Dual, Partials};

    #[test]
    fn test_density_grows_with_oxide_voltage() {
        let b = TunnelBarrier::new(3.1, 0.4);
        let lo = current_density(&b, 2e-9, 0.5);
        let hi = current_density(&b, 2e-9, 1.5);
        assert!(hi > lo && lo > 0.0);
    }

    #[test]
    fn test_polarity_follows_gate() {
        let card = ModelCard::default().with_param("toxf", 1.5e-9).unwrap();
        let f = fixture(card);
        let ctx = f.ctx();
        assert!(gate_current_f64(&ctx, 0.0, 2.0) > 0.0);
        assert!(gate_current_f64(&ctx, 0.0, -2.0) < 0.0);
    }

    #[test]
    fn test_relinearized_conductance() {
        let card = ModelCard::default().with_param("toxf", 1.5e-9).unwrap();
        let f = fixture(card);
        let ctx = f.ctx();
        let vgfs = Dual::<4>::variable(1.5, 1);
        let vds = Dual::<4>::variable(0.2, 0);
        let i = gate_current(&ctx, vds, vgfs);
        let plain = gate_current_f64(&ctx, 0.2, 1.5);
        assert!((i.re - plain).abs() <= 1e-12 * plain.abs());
        assert!(i.partial(1) > 0.0);
        assert!(i.partial(0) < 0.0);
        assert_eq!(i.partial(2), 0.0);
    }

    #[test]
    fn test_disabled() {
        let f = fixture(ModelCard::default().with_param("tunmod", 0.0).unwrap());
        assert_eq!(gate_current(&f.ctx(), 0.5, 2.0), 0.0);
    }
}
