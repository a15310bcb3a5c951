//! Instance geometry and quantities derived once at elaboration.

use serde::{Deserialize, Serialize};

use super::card::parameter_card;
use super::derived::ModelDerived;
use super::params::ModelParams;
use crate::error::{Error, Result};
use soispice_core::constants::{EPS_SI, thermal_voltage};

parameter_card! {
    /// Instance-level parameter table.
    InstanceCard {
        /// Drawn channel length (m).
        l => "l",
        /// Drawn channel width, all fingers (m).
        w => "w",
        /// Drain diffusion area (m^2).
        ad => "ad",
        /// Source diffusion area (m^2).
        area_source => "as",
        /// Drain diffusion perimeter (m).
        pd => "pd",
        /// Source diffusion perimeter (m).
        ps => "ps",
        /// Drain diffusion squares.
        nrd => "nrd",
        /// Source diffusion squares.
        nrs => "nrs",
        /// Number of gate fingers.
        nf => "nf",
        /// Parallel device multiplier.
        m => "m",
    }
}

/// Resolved instance parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceParams {
    /// Drawn length (m). Default: 1e-6
    pub l: f64,
    /// Drawn width (m). Default: 1e-6
    pub w: f64,
    /// Drain area (m^2). Default: 0
    pub ad: f64,
    /// Source area (m^2). Default: 0
    pub area_source: f64,
    /// Drain perimeter (m). Default: 0
    pub pd: f64,
    /// Source perimeter (m). Default: 0
    pub ps: f64,
    /// Drain squares. Default: 0
    pub nrd: f64,
    /// Source squares. Default: 0
    pub nrs: f64,
    /// Fingers. Default: 1
    pub nf: f64,
    /// Multiplier. Default: 1
    pub m: f64,
}

impl Default for InstanceParams {
    fn default() -> Self {
        Self {
            l: 1e-6,
            w: 1e-6,
            ad: 0.0,
            area_source: 0.0,
            pd: 0.0,
            ps: 0.0,
            nrd: 0.0,
            nrs: 0.0,
            nf: 1.0,
            m: 1.0,
        }
    }
}

impl InstanceParams {
    /// Defaulting pass followed by validation.
    pub fn from_card(card: &InstanceCard) -> Result<Self> {
        let d = Self::default();
        let p = Self {
            l: card.l.unwrap_or(d.l),
            w: card.w.unwrap_or(d.w),
            ad: card.ad.unwrap_or(d.ad),
            area_source: card.area_source.unwrap_or(d.area_source),
            pd: card.pd.unwrap_or(d.pd),
            ps: card.ps.unwrap_or(d.ps),
            nrd: card.nrd.unwrap_or(d.nrd),
            nrs: card.nrs.unwrap_or(d.nrs),
            nf: card.nf.unwrap_or(d.nf).round().max(1.0),
            m: card.m.unwrap_or(d.m),
        };
        for (name, value) in [("l", p.l), ("w", p.w), ("m", p.m)] {
            if value <= 0.0 {
                return Err(Error::InvalidValue {
                    name: name.to_string(),
                    value,
                });
            }
        }
        for (name, value) in [
            ("ad", p.ad),
            ("as", p.area_source),
            ("pd", p.pd),
            ("ps", p.ps),
            ("nrd", p.nrd),
            ("nrs", p.nrs),
        ] {
            if value < 0.0 {
                return Err(Error::InvalidValue {
                    name: name.to_string(),
                    value,
                });
            }
        }
        Ok(p)
    }
}

/// Per-side extrinsic capacitances (F).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SideCaps {
    /// Front gate overlap.
    pub cgov: f64,
    /// Back gate to diffusion (area plus fringe).
    pub cbg: f64,
}

/// Instance quantities computed once at elaboration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceDerived {
    /// Effective channel length (m)
    pub leff: f64,
    /// Effective channel width, all fingers (m)
    pub weff: f64,
    /// Source/drain junction sidewall area weff*tb (m^2)
    pub junction_area: f64,
    /// Built-in potential of the source/drain junctions at tnom (V)
    pub vbi: f64,
    /// Short-channel threshold factor exp(-L/2lc) + 2 exp(-L/lc)
    pub sce_factor: f64,
    /// Low-field mobility at tnom (m^2/V-s)
    pub u0: f64,
    /// Series resistance per side added to the LDD at tnom (ohm)
    pub rs_ext: f64,
    /// Gate-body overlap capacitance (F)
    pub cgbov: f64,
    /// Source side extrinsic capacitances
    pub source: SideCaps,
    /// Drain side extrinsic capacitances
    pub drain: SideCaps,
    /// Parallel device multiplier
    pub m: f64,
}

impl InstanceDerived {
    /// Compute instance constants from the model and geometry.
    pub fn new(p: &ModelParams, md: &ModelDerived, ip: &InstanceParams) -> Result<Self> {
        let leff = ip.l - 2.0 * p.dl;
        let weff = ip.w - 2.0 * p.dw * ip.nf;
        if leff <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "effective length {leff:e} m is not positive"
            )));
        }
        if weff <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "effective width {weff:e} m is not positive"
            )));
        }

        let wf = super::temperature::work_functions(p, p.tnom);
        let vt = thermal_voltage(p.tnom);
        let vbi = vt * (md.nb * md.nds / (wf.ni * wf.ni)).ln();
        let sce_factor = (-leff / (2.0 * md.lc)).exp() + 2.0 * (-leff / md.lc).exp();

        let side = |cgo: f64, area: f64, perim: f64| SideCaps {
            cgov: cgo * weff,
            cbg: md.coxb * area + p.cbfr * perim,
        };

        Ok(Self {
            leff,
            weff,
            junction_area: weff * p.tb,
            vbi,
            sce_factor,
            u0: p.u0 * soispice_core::constants::CM2_TO_M2,
            rs_ext: 0.5 * p.rsh * (ip.nrd + ip.nrs),
            cgbov: p.cgbo * leff,
            source: side(p.cgso, ip.area_source, ip.ps),
            drain: side(p.cgdo, ip.ad, ip.pd),
            m: ip.m,
        })
    }

    /// Zero-bias junction capacitance per unit area (F/m^2) for a built-in
    /// potential `vbi`.
    pub fn junction_cj0(md: &ModelDerived, vbi: f64) -> f64 {
        let neff = md.nb * md.nds / (md.nb + md.nds);
        (soispice_core::constants::Q * EPS_SI * neff / (2.0 * vbi)).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mosfet::soi::params::ModelCard;

    fn defaults() -> (ModelParams, ModelDerived) {
        let p = ModelParams::nmos_default();
        let d = ModelDerived::from_params(&p);
        (p, d)
    }

    #[test]
    fn test_default_geometry() {
        let (p, md) = defaults();
        let ip = InstanceParams::from_card(&InstanceCard::default()).unwrap();
        let inst = InstanceDerived::new(&p, &md, &ip).unwrap();
        assert_eq!(inst.leff, 1e-6);
        assert_eq!(inst.weff, 1e-6);
        assert!(inst.vbi > 0.8 && inst.vbi < 1.2, "vbi = {}", inst.vbi);
        // Long channel: negligible short-channel factor.
        assert!(inst.sce_factor < 1e-6);
    }

    #[test]
    fn test_short_channel_factor_grows() {
        let (p, md) = defaults();
        let card = InstanceCard::default().with_param("l", 1e-7).unwrap();
        let ip = InstanceParams::from_card(&card).unwrap();
        let inst = InstanceDerived::new(&p, &md, &ip).unwrap();
        assert!(inst.sce_factor > 0.1);
    }

    #[test]
    fn test_area_and_fringe_caps() {
        let (p, md) = defaults();
        let card = InstanceCard::default()
            .with_param("ad", 1e-12)
            .unwrap()
            .with_param("as", 2e-12)
            .unwrap();
        let ip = InstanceParams::from_card(&card).unwrap();
        let inst = InstanceDerived::new(&p, &md, &ip).unwrap();
        assert!((inst.source.cbg - 2.0 * inst.drain.cbg).abs() < 1e-25);
        assert!((inst.drain.cgov - 1e-16).abs() < 1e-25);
    }

    #[test]
    fn test_invalid_geometry() {
        let (_, md) = defaults();
        let card = InstanceCard::default().with_param("w", 0.0).unwrap();
        assert!(InstanceParams::from_card(&card).is_err());

        let card = ModelCard::default().with_param("dl", 6e-7).unwrap();
        let p2 = ModelParams::from_card(&card).unwrap();
        let ip = InstanceParams::default();
        assert!(matches!(
            InstanceDerived::new(&p2, &md, &ip),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_junction_cj0_positive() {
        let (_, md) = defaults();
        let cj0 = InstanceDerived::junction_cj0(&md, 0.9);
        assert!(cj0 > 1e-4 && cj0 < 1e-2, "cj0 = {cj0:e}");
    }
}
