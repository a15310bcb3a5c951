//! Elaboration configuration.

use serde::{Deserialize, Serialize};

/// Settings passed explicitly to model elaboration.
///
/// There is no process-wide state: every model carries its own copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model name used to tag log output.
    pub name: String,
    /// Emit non-convergence diagnostics from the bounded sub-solvers.
    /// Only honoured in debug builds.
    pub diagnostics: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "soi".to_string(),
            diagnostics: false,
        }
    }
}

impl ModelConfig {
    /// Configuration with the given model name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Enable or disable sub-solver diagnostics.
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    /// True when diagnostics are requested and this is a debug build.
    #[inline]
    pub fn diagnostics_enabled(&self) -> bool {
        cfg!(debug_assertions) && self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ModelConfig::default();
        assert_eq!(cfg.name, "soi");
        assert!(!cfg.diagnostics);
        assert!(!cfg.diagnostics_enabled());
    }

    #[test]
    fn test_builder() {
        let cfg = ModelConfig::named("nch_fd").with_diagnostics(true);
        assert_eq!(cfg.name, "nch_fd");
        assert!(cfg.diagnostics);
        assert_eq!(cfg.diagnostics_enabled(), cfg!(debug_assertions));
    }

    #[test]
    fn test_json_roundtrip_and_defaults() {
        let cfg = ModelConfig::named("pch").with_diagnostics(true);
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ModelConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);

        let partial: ModelConfig = serde_json::from_str(r#"{"diagnostics":true}"#).unwrap();
        assert_eq!(partial.name, "soi");
        assert!(partial.diagnostics);
    }
}
