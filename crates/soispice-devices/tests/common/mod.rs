//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use soispice_core::config::ModelConfig;
use soispice_devices::{InstanceCard, ModelCard, SoiInstance, SoiModel};

/// Default L = W = 1 um instance of `card`.
pub fn instance(card: &ModelCard) -> SoiInstance {
    let model = Arc::new(SoiModel::elaborate(card, ModelConfig::default()).unwrap());
    SoiInstance::elaborate(model, &InstanceCard::default()).unwrap()
}

/// Model card with body variant `soimod` (0 fully depleted, 1 near bulk).
pub fn variant(soimod: f64) -> ModelCard {
    ModelCard::default().with_param("soimod", soimod).unwrap()
}

/// Deterministic xorshift64 generator.
pub struct XorShift(u64);

impl XorShift {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform in [lo, hi).
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        lo + (hi - lo) * unit
    }
}

/// Relative closeness with an absolute floor.
pub fn close(a: f64, b: f64, rel: f64, abs: f64) -> bool {
    (a - b).abs() <= rel * a.abs().max(b.abs()) + abs
}
