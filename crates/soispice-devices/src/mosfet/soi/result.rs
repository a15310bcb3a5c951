//! The per-call operating-point record.

use std::ops::{Add, Neg, Sub};

use nalgebra::SMatrix;
use serde::{Deserialize, Serialize};

use super::blend::Region;
use super::derivative::Linearized;
use super::noise::NoiseDensity;

/// One output with its partials (per V and per K).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sensitivity {
    pub value: f64,
    pub dvds: f64,
    pub dvgfs: f64,
    pub dvbs: f64,
    pub dvgbs: f64,
    pub dt: f64,
}

impl Sensitivity {
    fn new(value: f64, partials: [f64; 4], dt: f64) -> Self {
        Self {
            value,
            dvds: partials[0],
            dvgfs: partials[1],
            dvbs: partials[2],
            dvgbs: partials[3],
            dt,
        }
    }

    /// Bias partials in (vds, vgfs, vbs, vgbs) order.
    pub fn gradient(&self) -> [f64; 4] {
        [self.dvds, self.dvgfs, self.dvbs, self.dvgbs]
    }
}

impl Add for Sensitivity {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            value: self.value + rhs.value,
            dvds: self.dvds + rhs.dvds,
            dvgfs: self.dvgfs + rhs.dvgfs,
            dvbs: self.dvbs + rhs.dvbs,
            dvgbs: self.dvgbs + rhs.dvgbs,
            dt: self.dt + rhs.dt,
        }
    }
}

impl Neg for Sensitivity {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            value: -self.value,
            dvds: -self.dvds,
            dvgfs: -self.dvgfs,
            dvbs: -self.dvbs,
            dvgbs: -self.dvgbs,
            dt: -self.dt,
        }
    }
}

impl Sub for Sensitivity {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

/// Currents into each terminal, all referred to the same bias partials.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TerminalCurrents {
    pub drain: Sensitivity,
    pub front_gate: Sensitivity,
    pub body: Sensitivity,
    pub back_gate: Sensitivity,
    pub source: Sensitivity,
}

impl TerminalCurrents {
    /// Terminals in (drain, front gate, body, back gate, source) order.
    pub fn to_array(&self) -> [Sensitivity; 5] {
        [
            self.drain,
            self.front_gate,
            self.body,
            self.back_gate,
            self.source,
        ]
    }
}

/// Everything one evaluation returns.
///
/// Current directions: `ich`, `ibjt` drain to source; `irs`, `ird` body to
/// source/drain; `igidl`, `igisl` drain/source to body; `igi` from the drain
/// (the source when `reversed`) to the body; `igb` front gate to body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OperatingPointResult {
    pub ich: Sensitivity,
    pub ibjt: Sensitivity,
    /// Total junction current `irs + ird`.
    pub ir: Sensitivity,
    pub irs: Sensitivity,
    pub ird: Sensitivity,
    /// Total band-to-band leakage `igidl + igisl`.
    pub igt: Sensitivity,
    pub igidl: Sensitivity,
    pub igisl: Sensitivity,
    pub igi: Sensitivity,
    pub igb: Sensitivity,
    pub qgf: Sensitivity,
    pub qd: Sensitivity,
    pub qb: Sensitivity,
    pub qgb: Sensitivity,
    pub qs: Sensitivity,

    pub vdsat: f64,
    pub vths: f64,
    pub vthw: f64,
    pub region: Region,
    /// Channel length after saturation-region shortening (m).
    pub leff: f64,
    pub ueff: f64,
    /// Voltage across one LDD extension (V).
    pub ldd_drop: f64,
    /// Dissipated power (W).
    pub power: f64,
    /// Thermal conductance at this temperature (W/K).
    pub gth: f64,
    pub noise: Option<NoiseDensity>,
    /// Source and drain were exchanged internally.
    pub reversed: bool,
    /// Device temperature (K).
    pub temp: f64,
}

impl OperatingPointResult {
    /// Build the record from linearized outputs and optional per-kelvin
    /// temperature slopes.
    pub(crate) fn assemble(
        lin: &Linearized,
        dt: Option<[f64; super::evaluate::OUTPUTS]>,
        vds: f64,
        temp: f64,
        gth: f64,
    ) -> Self {
        let dt = dt.unwrap_or_default();
        let s: [Sensitivity; super::evaluate::OUTPUTS] =
            std::array::from_fn(|k| Sensitivity::new(lin.values[k], lin.partials[k], dt[k]));
        let [ich, ibjt, irs, ird, igidl, igisl, igi, igb, qgf, qd, qb, qgb, qs] = s;
        let info = lin.info;

        Self {
            ich,
            ibjt,
            ir: irs + ird,
            irs,
            ird,
            igt: igidl + igisl,
            igidl,
            igisl,
            igi,
            igb,
            qgf,
            qd,
            qb,
            qgb,
            qs,
            vdsat: info.vdsat,
            vths: info.vths,
            vthw: info.vthw,
            region: info.region,
            leff: info.leff,
            ueff: info.ueff,
            ldd_drop: info.ldd_drop,
            power: (ich.value + ibjt.value) * vds,
            gth,
            noise: None,
            reversed: info.reversed,
            temp,
        }
    }

    /// Currents into each terminal.
    pub fn terminal_currents(&self) -> TerminalCurrents {
        let (igi_d, igi_s) = if self.reversed {
            (Sensitivity::default(), self.igi)
        } else {
            (self.igi, Sensitivity::default())
        };
        TerminalCurrents {
            drain: self.ich + self.ibjt + self.igidl - self.ird + igi_d,
            front_gate: self.igb,
            body: self.irs + self.ird - self.igi - self.igidl - self.igisl - self.igb,
            back_gate: Sensitivity::default(),
            source: -self.ich - self.ibjt + self.igisl - self.irs + igi_s,
        }
    }

    /// Charge partials: rows (Qgf, Qd, Qb, Qgb, Qs), columns (vds, vgfs, vbs,
    /// vgbs). Each column sums to zero.
    pub fn capacitance_matrix(&self) -> SMatrix<f64, 5, 4> {
        let rows = [self.qgf, self.qd, self.qb, self.qgb, self.qs];
        SMatrix::from_fn(|i, j| rows[i].gradient()[j])
    }

    /// Terminal current partials: rows (drain, front gate, body, back gate,
    /// source), columns (vds, vgfs, vbs, vgbs).
    pub fn conductance_matrix(&self) -> SMatrix<f64, 5, 4> {
        let rows = self.terminal_currents().to_array();
        SMatrix::from_fn(|i, j| rows[i].gradient()[j])
    }
}
