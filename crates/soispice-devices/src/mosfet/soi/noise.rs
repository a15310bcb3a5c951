//! Drain current noise spectral densities.

use serde::{Deserialize, Serialize};
use soispice_core::constants::{KB, Q};

use super::evaluate::EvalContext;

/// Noise current densities at one operating point (A^2/Hz).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NoiseDensity {
    /// Channel thermal noise.
    pub thermal: f64,
    /// Flicker noise at 1 Hz.
    pub flicker_1hz: f64,
    /// Flicker frequency exponent.
    pub ef: f64,
    /// Shot noise of the junction and bipolar currents.
    pub shot: f64,
}

impl NoiseDensity {
    /// Densities for channel current `ich`, inversion charge `qinv` (C),
    /// effective mobility `mu` and the junction/bipolar currents.
    pub fn compute(ctx: &EvalContext, ich: f64, qinv: f64, mu: f64, leakage: [f64; 3]) -> Self {
        let leff = ctx.inst.leff;
        let p = ctx.p;
        let thermal = 4.0 * KB * ctx.t.temp * mu * qinv.abs() / (leff * leff);
        let flicker_1hz = if p.kf > 0.0 {
            p.kf * ich.abs().powf(p.af) / (ctx.md.coxf * leff * leff)
        } else {
            0.0
        };
        let shot = 2.0 * Q * leakage.iter().map(|i| i.abs()).sum::<f64>();
        Self {
            thermal,
            flicker_1hz,
            ef: p.ef,
            shot,
        }
    }

    /// Flicker density at `freq` (Hz).
    #[inline]
    pub fn flicker_at(&self, freq: f64) -> f64 {
        self.flicker_1hz / freq.max(f64::MIN_POSITIVE).powf(self.ef)
    }

    /// Total density at `freq` (Hz).
    pub fn total_at(&self, freq: f64) -> f64 {
        self.thermal + self.flicker_at(freq) + self.shot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mosfet::soi::evaluate::tests::fixture;
    use crate::mosfet::soi::params::ModelCard;

    #[test]
    fn test_flicker_scaling() {
        let card = ModelCard::default().with_param("kf", 1e-30).unwrap();
        let f = fixture(card);
        let n = NoiseDensity::compute(&f.ctx(), 1e-4, 1e-15, 0.05, [0.0; 3]);
        assert!(n.flicker_1hz > 0.0);
        assert!((n.flicker_at(10.0) - n.flicker_1hz / 10.0).abs() < 1e-12 * n.flicker_1hz);
        assert!(n.total_at(1e9) > n.thermal);
    }

    #[test]
    fn test_shot_noise() {
        let f = fixture(ModelCard::default());
        let n = NoiseDensity::compute(&f.ctx(), 0.0, 0.0, 0.05, [1e-9, -1e-9, 0.0]);
        assert!((n.shot - 4.0 * Q * 1e-9).abs() < 1e-40);
        assert_eq!(n.thermal, 0.0);
        assert_eq!(n.flicker_1hz, 0.0);
    }
}
