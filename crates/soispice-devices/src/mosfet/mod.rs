//! MOSFET device models.

pub mod soi;

use serde::{Deserialize, Serialize};

/// MOSFET channel polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MosfetType {
    #[default]
    Nmos,
    Pmos,
}

impl MosfetType {
    /// Sign applied to terminal voltages and currents (+1 for NMOS).
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            MosfetType::Nmos => 1.0,
            MosfetType::Pmos => -1.0,
        }
    }

    /// Polarity from the integer `type` parameter (+1 n-channel, -1 p-channel).
    pub fn from_flag(flag: f64) -> Self {
        if flag < 0.0 { MosfetType::Pmos } else { MosfetType::Nmos }
    }
}
