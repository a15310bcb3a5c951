//! SOI MOSFET compact model for soispice.
//!
//! This crate provides:
//! - Model and instance parameter cards with explicit "given" tracking
//! - Elaboration of derived model, instance and temperature constants
//! - The bias evaluator for fully-depleted and near-bulk SOI bodies,
//!   returning currents, terminal charges and their partial derivatives
//! - Interchangeable analytic and finite-difference derivative providers

pub mod error;
pub mod mosfet;

pub use error::{Error, Result};
pub use mosfet::MosfetType;
pub use mosfet::soi::{
    AnalyticDerivatives, Bias, BodyVariant, DerivativeProvider, EvalRequest, FiniteDifference,
    InstanceCard, ModelCard, NoiseDensity, OperatingPointResult, Region, Sensitivity, SoiInstance,
    SoiModel, TemperatureMode, TerminalCurrents,
};
