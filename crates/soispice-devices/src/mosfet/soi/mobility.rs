//! Mobility, velocity overshoot and drain saturation.

use soispice_core::constants::EPS_SI;
use soispice_core::scalar::Scalar;
use soispice_core::smooth::{floor_denominator, smooth_max, soft_limit};

/// Lower bound of the effective transverse field (V/m).
pub const FIELD_FLOOR: f64 = 1e4;
/// Transition width of the field clamp (V/m).
const FIELD_WIDTH: f64 = 1e3;
/// Largest relaxation-length ratio used in the overshoot closed form.
const OVERSHOOT_ARG_MAX: f64 = 80.0;

/// Effective transverse field for depletion charge `qdep` and inversion
/// charge `qinv` (both C/m^2), kept above [`FIELD_FLOOR`].
#[inline]
pub fn effective_field<S: Scalar>(qdep: S, qinv: S) -> S {
    let e = (qdep + qinv * 0.5) / EPS_SI;
    smooth_max(e, S::cst(FIELD_FLOOR), FIELD_WIDTH)
}

/// Field-degraded mobility u0 / (1 + ua E + ub E^2).
#[inline]
pub fn mobility<S: Scalar>(u0: f64, ua: f64, ub: f64, field: S) -> S {
    S::cst(u0) / (field * ua + field.sq() * ub + 1.0)
}

/// Saturation velocity including the energy-relaxation overshoot.
///
/// The relaxation length is `vsat * tauw`; the enhancement is
/// `(lambda/L) (cosh(L/lambda) - 1) / sinh(L/lambda)`.
pub fn velocity_overshoot(vsat: f64, tauw: f64, kov: f64, leff: f64) -> f64 {
    let lambda = vsat * tauw;
    if lambda <= 0.0 || kov == 0.0 {
        return vsat;
    }
    let x = (leff / lambda).min(OVERSHOOT_ARG_MAX);
    let g = (lambda / leff) * (x.cosh() - 1.0) / x.sinh();
    vsat * (1.0 + kov * g)
}

/// Critical field for velocity saturation 2 vsat / mu (V/m).
#[inline]
pub fn saturation_field<S: Scalar>(vsat: f64, mu: S) -> S {
    S::cst(2.0 * vsat) / mu
}

/// Drain saturation quantities for one gate bias.
#[derive(Debug, Clone, Copy)]
pub struct Saturation<S> {
    /// Saturation voltage (V).
    pub vdsat: S,
    /// Smoothed min(Vds, Vdsat) (V).
    pub vdse: S,
    /// Length of the velocity-saturated region (m).
    pub delta_l: S,
}

/// Saturation voltage of `alpha v^2/(2 Esat L) + alpha v - vgt = 0`: a
/// closed-form seed followed by one Newton correction.
pub fn saturation_voltage<S: Scalar>(vgt: S, alpha: S, esat_l: S) -> S {
    let u = vgt / alpha;
    let seed = u / (u / esat_l + 1.0);
    let f = alpha * (seed.sq() / (esat_l * 2.0) + seed) - vgt;
    let df = alpha * (seed / esat_l + 1.0);
    seed - f / floor_denominator(df)
}

/// Smooth minimum of `vds` and `vdsat` with width `delta`; exact zero at
/// zero drain bias.
#[inline]
pub fn effective_vds<S: Scalar>(vds: S, vdsat: S, delta: f64) -> S {
    let v1 = vdsat - vds - delta;
    vdsat - (v1 + (v1.sq() + vdsat * (4.0 * delta)).sqrt()) * 0.5
}

/// Saturation voltage, effective drain voltage and the saturated-region
/// length (channel-length modulation, limited to half the channel).
#[allow(clippy::too_many_arguments)]
pub fn saturation<S: Scalar>(
    vgt: S,
    alpha: S,
    esat: S,
    leff: f64,
    vds: S,
    delta: f64,
    lc: f64,
    clm: f64,
) -> Saturation<S> {
    let vdsat = saturation_voltage(vgt, alpha, esat * leff);
    let vdse = effective_vds(vds, vdsat, delta);
    let excess = (vds - vdse) / (esat * lc);
    let delta_l = soft_limit(excess.asinh() * (lc * clm), 0.5 * leff);
    Saturation {
        vdsat,
        vdse,
        delta_l,
    }
}
