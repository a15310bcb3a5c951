//! Temperature mapping.
//!
//! [`TemperatureDerived`] holds every quantity that depends on the device
//! temperature. The instance caches one record and only rebuilds it when the
//! temperature moves by more than [`TEMP_TOLERANCE`].

use soispice_core::constants::{
    CHI_SI, EPS_SI, NI_300, PER_CM3, Q, silicon_bandgap, thermal_voltage,
};
use soispice_core::smooth::LimitedExp;

use super::derived::ModelDerived;
use super::instance::InstanceDerived;
use super::mobility::velocity_overshoot;
use super::params::ModelParams;

/// Temperatures closer than this to the cached one are treated as equal (K).
pub const TEMP_TOLERANCE: f64 = 1e-4;

/// Exponent of the thermal conductance temperature scaling.
const GTH_EXPONENT: f64 = -1.3;

/// Floor for the temperature-scaled saturation velocity (m/s).
const VSAT_FLOOR: f64 = 1e4;

/// How a temperature-effect call treats the instance cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureMode {
    /// Rebuild the cached record (including the thermal conductance scale)
    /// when the temperature changed.
    Update,
    /// Build a detached record for a temperature-derivative probe; the cache
    /// is left untouched.
    Probe,
}

/// Band structure and barrier heights at one temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkFunctions {
    /// Thermal voltage (V)
    pub vt: f64,
    /// Film band gap including alloy narrowing (eV)
    pub eg: f64,
    /// Intrinsic carrier density (m^-3)
    pub ni: f64,
    /// Body Fermi potential (V)
    pub phi_b: f64,
    /// Substrate Fermi potential (V)
    pub phi_b_sub: f64,
    /// Front gate work function difference (V)
    pub phims_front: f64,
    /// Back gate work function difference (V)
    pub phims_back: f64,
}

/// Band-gap narrowing of a SiGe film with germanium fraction `x` (eV).
#[inline]
pub fn sige_narrowing(x: f64) -> f64 {
    0.896 * x - 0.396 * x * x
}

/// Barrier heights of the n-channel device at `temp`.
pub fn work_functions(p: &ModelParams, temp: f64) -> WorkFunctions {
    let vt = thermal_voltage(temp);
    let eg = silicon_bandgap(temp) - sige_narrowing(p.xge);
    let vt300 = thermal_voltage(300.0);
    let ni = NI_300
        * PER_CM3
        * (temp / 300.0).powf(1.5)
        * (silicon_bandgap(300.0) / (2.0 * vt300) - eg / (2.0 * vt)).exp();

    let phi_b = vt * (p.nbody * PER_CM3 / ni).ln();
    let phi_b_sub = vt * (p.nsub * PER_CM3 / ni).ln();
    let half_gap = 0.5 * eg;

    let phims_front = if p.tpg > 0.5 {
        -(half_gap + phi_b)
    } else if p.tpg < -0.5 {
        half_gap - phi_b
    } else {
        p.wkf - (CHI_SI + half_gap + phi_b)
    };
    let phims_back = if p.tps > 0.5 {
        phi_b_sub - phi_b
    } else if p.tps < -0.5 {
        -phi_b_sub - phi_b
    } else {
        p.wkb - (CHI_SI + half_gap + phi_b)
    };

    WorkFunctions {
        vt,
        eg,
        ni,
        phi_b,
        phi_b_sub,
        phims_front,
        phims_back,
    }
}

/// Temperature-dependent instance quantities.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureDerived {
    /// Device temperature (K)
    pub temp: f64,
    /// Ambient temperature (K)
    pub ambient: f64,
    /// Thermal voltage (V)
    pub vt: f64,
    /// Band gap (eV)
    pub eg: f64,
    /// Intrinsic density (m^-3)
    pub ni: f64,
    /// Body Fermi potential (V)
    pub phi_b: f64,
    /// Source/drain built-in potential (V)
    pub vbi: f64,
    /// Front flatband voltage (V)
    pub vfbf: f64,
    /// Back flatband voltage (V)
    pub vfbb: f64,
    /// sqrt(2 eps_si q Nb Vt), surface carrier charge scale (C/m^2)
    pub qa0: f64,
    /// Weak-inversion charge at psi = 2 phi_b (C/m^2)
    pub qw0: f64,
    /// Extrinsic Debye length (m)
    pub debye: f64,
    /// Low-field mobility (m^2/V-s)
    pub u0: f64,
    /// Saturation velocity (m/s)
    pub vsat: f64,
    /// Saturation velocity including overshoot (m/s)
    pub vsat_eff: f64,
    /// Parasitic bipolar exponential
    pub bjt: LimitedExp,
    /// Junction recombination exponential (per junction)
    pub recombination: LimitedExp,
    /// Junction diffusion exponential (per junction)
    pub diffusion: LimitedExp,
    /// Zero-bias junction capacitance per area (F/m^2)
    pub cj0: f64,
    /// GIDL exponent (V/m)
    pub bgidl: f64,
    /// LDD plus contact resistance per side at low current (ohm)
    pub ldd_r0: f64,
    /// LDD saturation current (A)
    pub ldd_isat: f64,
    /// Thermal conductance scale (T/ambient)^-1.3
    pub gth_scale: f64,
    /// Thermal conductance (W/K), zero without a thermal resistance
    pub gth: f64,
}

impl TemperatureDerived {
    /// Build the record for device temperature `temp` and ambient `ambient`.
    pub fn compute(
        p: &ModelParams,
        md: &ModelDerived,
        inst: &InstanceDerived,
        ambient: f64,
        temp: f64,
    ) -> Self {
        let wf = work_functions(p, temp);
        let nom = work_functions(p, p.tnom);
        let vt = wf.vt;
        let ratio = temp / p.tnom;

        let vfbf = p.vfbf + (wf.phims_front - nom.phims_front) + p.kt1 * (ratio - 1.0);
        let vfbb = p.vfbb + (wf.phims_back - nom.phims_back);

        let qa0 = (2.0 * EPS_SI * Q * md.nb * vt).sqrt();
        let qw0 = 0.5 * qa0 * (vt / (2.0 * wf.phi_b)).sqrt();
        let debye = (EPS_SI * vt / (Q * md.nb)).sqrt();

        let u0 = inst.u0 * ratio.powf(p.ute);
        let vsat = (p.vsat - p.at * (temp - p.tnom)).max(VSAT_FLOOR);
        let vsat_eff = velocity_overshoot(vsat, p.tauw, p.kov, inst.leff);

        let vbi = vt * (md.nb * md.nds / (wf.ni * wf.ni)).ln();
        let ni_ratio = wf.ni / nom.ni;

        let bjt_is = if p.bjt {
            let dn = u0 * vt;
            Q * wf.ni * wf.ni * dn * inst.weff * p.tb / (md.nb * inst.leff) * p.fbjt
        } else {
            0.0
        };
        let bjt = LimitedExp::new(bjt_is, vt, p.imax);
        let recombination =
            LimitedExp::new(p.jro * inst.junction_area * ni_ratio, p.nr * vt, p.imax);
        let diffusion = LimitedExp::new(
            p.jdo * inst.junction_area * ni_ratio * ni_ratio,
            vt,
            p.imax,
        );

        let cj0 = InstanceDerived::junction_cj0(md, vbi);
        let bgidl = p.bgidl * (wf.eg / nom.eg).powf(1.5);

        let uldd = p.uldd * soispice_core::constants::CM2_TO_M2 * ratio.powf(p.ute);
        let ldd_r0 = if p.lldd > 0.0 {
            p.lldd / (Q * md.nldd * uldd * inst.weff * p.tb)
        } else {
            0.0
        } + inst.rs_ext;
        let ldd_isat = Q * md.nldd * vsat * inst.weff * p.tb;

        let gth_scale = (temp / ambient).powf(GTH_EXPONENT);
        let gth = if p.rth > 0.0 { gth_scale / p.rth } else { 0.0 };

        Self {
            temp,
            ambient,
            vt,
            eg: wf.eg,
            ni: wf.ni,
            phi_b: wf.phi_b,
            vbi,
            vfbf,
            vfbb,
            qa0,
            qw0,
            debye,
            u0,
            vsat,
            vsat_eff,
            bjt,
            recombination,
            diffusion,
            cj0,
            bgidl,
            ldd_r0,
            ldd_isat,
            gth_scale,
            gth,
        }
    }

    /// True when this record already describes `temp` at `ambient`.
    #[inline]
    pub fn matches(&self, ambient: f64, temp: f64) -> bool {
        (temp - self.temp).abs() < TEMP_TOLERANCE && (ambient - self.ambient).abs() < TEMP_TOLERANCE
    }
}
