//! Model constants derived once from [`ModelParams`].
//!
//! Everything here is independent of temperature and geometry.

use soispice_core::constants::{EPS_OX, EPS_SI, HBAR, M0, PER_CM2, PER_CM3, Q};

use super::params::{BodyVariant, ModelParams};

/// Fowler-Nordheim style barrier constants for one tunneling path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TunnelBarrier {
    /// Barrier height (V).
    pub phib: f64,
    /// Current density prefactor (A/V^2).
    pub a: f64,
    /// Exponential field constant (V/m).
    pub b: f64,
}

impl TunnelBarrier {
    /// Barrier of height `phib` (eV) seen by a carrier of mass ratio `mass`.
    pub fn new(phib: f64, mass: f64) -> Self {
        let h = 2.0 * std::f64::consts::PI * HBAR;
        let a = Q * Q / (8.0 * std::f64::consts::PI * h * phib);
        let b = 8.0 * std::f64::consts::PI * (2.0 * mass * M0).sqrt() * (Q * phib).powf(1.5)
            / (3.0 * h * Q);
        Self { phib, a, b }
    }
}

/// Pre-calculated SOI model constants.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDerived {
    /// Front oxide capacitance (F/m^2)
    pub coxf: f64,
    /// Back oxide capacitance (F/m^2)
    pub coxb: f64,
    /// Film capacitance eps_si/tb (F/m^2)
    pub cb: f64,
    /// Front interface trap capacitance (F/m^2)
    pub cit: f64,
    /// Front coupling factor cb/coxf
    pub alpha: f64,
    /// Back coupling factor cb/coxb
    pub beta: f64,
    /// Body doping (m^-3)
    pub nb: f64,
    /// Substrate doping (m^-3)
    pub nsub: f64,
    /// Source/drain doping (m^-3)
    pub nds: f64,
    /// LDD doping (m^-3)
    pub nldd: f64,
    /// Total film depletion charge q*Nb*tb (C/m^2)
    pub qntb: f64,
    /// q*eps_si*Nb, the bulk depletion constant (C^2/m^4 per V)
    pub qeps_nb: f64,
    /// Depth of the depletion region that sets the short-channel length (m)
    pub xdep: f64,
    /// Short-channel characteristic length (m)
    pub lc: f64,
    /// Conduction-band tunneling barrier
    pub tunnel_ecb: TunnelBarrier,
    /// Valence-band tunneling barrier
    pub tunnel_evb: TunnelBarrier,
}

impl ModelDerived {
    /// Compute the derived constants.
    pub fn from_params(p: &ModelParams) -> Self {
        let coxf = p.coxf();
        let coxb = p.coxb();
        let cb = p.cb();
        let nb = p.nbody * PER_CM3;
        let qeps_nb = Q * EPS_SI * nb;

        // Fully depleted films use the film thickness; near-bulk bodies use
        // the maximum depletion depth at strong inversion (about 0.9 V),
        // never deeper than the film.
        let xdep = match p.variant {
            BodyVariant::FullyDepleted => p.tb,
            BodyVariant::NearBulk => (2.0 * EPS_SI * 0.9 / (Q * nb)).sqrt().min(p.tb),
        };
        let lc = (EPS_SI * xdep * p.toxf / EPS_OX).sqrt();

        Self {
            coxf,
            coxb,
            cb,
            cit: Q * p.nsf * PER_CM2,
            alpha: cb / coxf,
            beta: cb / coxb,
            nb,
            nsub: p.nsub * PER_CM3,
            nds: p.nds * PER_CM3,
            nldd: p.nldd * PER_CM3,
            qntb: Q * nb * p.tb,
            qeps_nb,
            xdep,
            lc,
            tunnel_ecb: TunnelBarrier::new(p.phie, p.mtune),
            tunnel_evb: TunnelBarrier::new(p.phih, p.mtunh),
        }
    }
}
