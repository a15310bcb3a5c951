//! Numerical building blocks for the soispice SOI device models.
//!
//! This crate provides:
//! - Physical constants shared by every sub-model
//! - The [`Scalar`] abstraction with forward-mode [`Dual`] numbers, so one
//!   model body yields both plain values and exact bias derivatives
//! - Overflow-safe smoothing primitives (clamped exponential, soft max/min,
//!   current-limited junction exponential)
//! - Bounded quadrature rules (trapezoid, Romberg)
//! - The explicit elaboration configuration object

pub mod config;
pub mod constants;
pub mod quadrature;
pub mod scalar;
pub mod smooth;

pub use config::ModelConfig;
pub use quadrature::{RombergOutcome, romberg, trapezoid};
pub use scalar::{Dual, Partials, Scalar};
pub use smooth::{LimitedExp, safe_exp, smooth_max, smooth_min, softplus};
