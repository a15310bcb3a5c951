//! Physical constants (SI units unless noted).

/// Elementary charge (C).
pub const Q: f64 = 1.602176634e-19;
/// Boltzmann constant (J/K).
pub const KB: f64 = 1.380649e-23;
/// Vacuum permittivity (F/m).
pub const EPS0: f64 = 8.8541878128e-12;
/// Permittivity of silicon (F/m) = 11.7 * eps0.
pub const EPS_SI: f64 = 11.7 * EPS0;
/// Permittivity of SiO2 (F/m) = 3.9 * eps0.
pub const EPS_OX: f64 = 3.9 * EPS0;
/// Reduced Planck constant (J-s).
pub const HBAR: f64 = 1.054571817e-34;
/// Free electron mass (kg).
pub const M0: f64 = 9.1093837015e-31;
/// Intrinsic carrier concentration of silicon at 300 K (cm^-3).
pub const NI_300: f64 = 1.45e10;
/// Electron affinity of silicon (eV).
pub const CHI_SI: f64 = 4.05;
/// Default nominal temperature (K).
pub const T_NOM: f64 = 300.15;
/// Conversion factor from cm^-3 to m^-3.
pub const PER_CM3: f64 = 1e6;
/// Conversion factor from cm^-2 to m^-2.
pub const PER_CM2: f64 = 1e4;
/// Conversion factor from cm^2/V-s to m^2/V-s.
pub const CM2_TO_M2: f64 = 1e-4;

/// Thermal voltage kT/q (V) at temperature `temp` (K).
#[inline]
pub fn thermal_voltage(temp: f64) -> f64 {
    KB * temp / Q
}

/// Silicon band gap (eV) at temperature `temp` (K), Varshni form.
#[inline]
pub fn silicon_bandgap(temp: f64) -> f64 {
    1.16 - 7.02e-4 * temp * temp / (temp + 1108.0)
}
