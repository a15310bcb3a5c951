//! SOI MOSFET compact model.
//!
//! Two body variants share one evaluator: a fully-depleted film
//! ([`BodyVariant::FullyDepleted`]) and a near-bulk film whose body may stay
//! partly neutral ([`BodyVariant::NearBulk`]).
//!
//! # Lifecycle
//!
//! 1. [`SoiModel::elaborate`] resolves a [`ModelCard`] into immutable
//!    parameters and derived constants. The model is shared through `Arc`.
//! 2. [`SoiInstance::elaborate`] adds geometry and caches a temperature
//!    record at the nominal temperature.
//! 3. [`SoiInstance::evaluate`] returns an [`OperatingPointResult`] with
//!    currents, charges and their bias partials.
//!
//! Evaluation never fails. Elaboration is the only fallible step.

mod card;

pub mod bipolar;
pub mod blend;
pub mod channel;
pub mod charge;
pub mod derivative;
pub mod derived;
pub mod evaluate;
pub mod gidl;
pub mod impact;
pub mod instance;
pub mod junction;
pub mod ldd;
pub mod mobility;
pub mod noise;
pub mod params;
pub mod result;
pub mod temperature;
pub mod threshold;
pub mod tunneling;

use std::sync::Arc;

use log::debug;
use soispice_core::config::ModelConfig;
use soispice_core::constants::T_NOM;

use crate::error::Result;

pub use blend::Region;
pub use derivative::{AnalyticDerivatives, DerivativeProvider, FiniteDifference, Linearized};
pub use derived::ModelDerived;
pub use evaluate::{EvalContext, Terminals};
pub use instance::{InstanceCard, InstanceDerived, InstanceParams};
pub use noise::NoiseDensity;
pub use params::{BodyVariant, ModelCard, ModelParams};
pub use result::{OperatingPointResult, Sensitivity, TerminalCurrents};
pub use temperature::{TemperatureDerived, TemperatureMode};

/// Temperature step of the temperature-derivative probe (K).
const TEMP_PROBE_STEP: f64 = 1.0;

/// An elaborated model: resolved parameters plus derived constants.
#[derive(Debug, Clone)]
pub struct SoiModel {
    params: ModelParams,
    derived: ModelDerived,
    config: ModelConfig,
}

impl SoiModel {
    /// Resolve `card` and compute the model-level constants.
    pub fn elaborate(card: &ModelCard, config: ModelConfig) -> Result<Self> {
        let params = ModelParams::from_card(card)?;
        let derived = ModelDerived::from_params(&params);
        debug!(
            "{}: elaborated {:?} {:?} model, coxf={:e} F/m^2",
            config.name, params.polarity, params.variant, derived.coxf
        );
        debug!(
            "{}: tb={:.3e} vfbf={:.4} vfbb={:.4} nqff={:.3e} bgidl={:.3e}",
            config.name, params.tb, params.vfbf, params.vfbb, params.nqff, params.bgidl
        );
        Ok(Self {
            params,
            derived,
            config,
        })
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    pub fn derived(&self) -> &ModelDerived {
        &self.derived
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
}

/// Terminal voltages (V, referred to the source) and device temperature (K).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bias {
    pub vds: f64,
    pub vgfs: f64,
    pub vbs: f64,
    pub vgbs: f64,
    pub temp: f64,
}

impl Bias {
    /// Bias at the nominal temperature.
    pub fn new(vds: f64, vgfs: f64, vbs: f64, vgbs: f64) -> Self {
        Self {
            vds,
            vgfs,
            vbs,
            vgbs,
            temp: T_NOM,
        }
    }

    /// Same voltages at device temperature `temp`.
    pub fn at_temp(mut self, temp: f64) -> Self {
        self.temp = temp;
        self
    }

    fn terminals(&self) -> Terminals<f64> {
        Terminals {
            vds: self.vds,
            vgfs: self.vgfs,
            vbs: self.vbs,
            vgbs: self.vgbs,
        }
    }
}

/// Optional outputs of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvalRequest {
    /// Terminal charges and capacitances.
    pub charges: bool,
    /// Noise spectral densities.
    pub noise: bool,
    /// Per-kelvin slopes of every output. Always computed with self-heating.
    pub temperature_derivative: bool,
}

impl EvalRequest {
    /// Currents and charges, as a transient analysis needs them.
    pub fn with_charges() -> Self {
        Self {
            charges: true,
            ..Self::default()
        }
    }
}

/// One device instance bound to a shared model.
#[derive(Debug, Clone)]
pub struct SoiInstance {
    model: Arc<SoiModel>,
    params: InstanceParams,
    derived: InstanceDerived,
    thermal: TemperatureDerived,
}

impl SoiInstance {
    /// Resolve `card` against `model` and cache the nominal-temperature record.
    pub fn elaborate(model: Arc<SoiModel>, card: &InstanceCard) -> Result<Self> {
        let params = InstanceParams::from_card(card)?;
        let derived = InstanceDerived::new(&model.params, &model.derived, &params)?;
        let tnom = model.params.tnom;
        let thermal =
            TemperatureDerived::compute(&model.params, &model.derived, &derived, tnom, tnom);
        debug!(
            "{}: instance leff={:e} m weff={:e} m m={}",
            model.config.name, derived.leff, derived.weff, derived.m
        );
        Ok(Self {
            model,
            params,
            derived,
            thermal,
        })
    }

    pub fn model(&self) -> &Arc<SoiModel> {
        &self.model
    }

    pub fn params(&self) -> &InstanceParams {
        &self.params
    }

    pub fn derived(&self) -> &InstanceDerived {
        &self.derived
    }

    /// The cached temperature record.
    pub fn thermal(&self) -> &TemperatureDerived {
        &self.thermal
    }

    /// Map the device to `temp` at ambient `ambient`.
    ///
    /// `Update` refreshes the cache and returns `None`; a call at the cached
    /// temperature leaves it bit-identical. `Probe` returns a detached record
    /// and leaves the cache alone.
    pub fn temperature_effect(
        &mut self,
        ambient: f64,
        temp: f64,
        mode: TemperatureMode,
    ) -> Option<TemperatureDerived> {
        match mode {
            TemperatureMode::Update => {
                if !self.thermal.matches(ambient, temp) {
                    self.thermal = self.compute_thermal(ambient, temp);
                }
                None
            }
            TemperatureMode::Probe => Some(self.compute_thermal(ambient, temp)),
        }
    }

    fn compute_thermal(&self, ambient: f64, temp: f64) -> TemperatureDerived {
        TemperatureDerived::compute(
            &self.model.params,
            &self.model.derived,
            &self.derived,
            ambient,
            temp,
        )
    }

    fn context<'a>(&'a self, t: &'a TemperatureDerived) -> EvalContext<'a> {
        EvalContext {
            p: &self.model.params,
            md: &self.model.derived,
            inst: &self.derived,
            t,
            config: &self.model.config,
        }
    }

    /// Evaluate with the variant's default derivative provider: dual numbers
    /// for the fully-depleted body, finite differences for the near-bulk one.
    pub fn evaluate(&mut self, bias: &Bias, req: &EvalRequest) -> OperatingPointResult {
        match self.model.params.variant {
            BodyVariant::FullyDepleted => self.evaluate_with(&AnalyticDerivatives, bias, req),
            BodyVariant::NearBulk => self.evaluate_with(&FiniteDifference::default(), bias, req),
        }
    }

    /// Evaluate with an explicit derivative provider.
    pub fn evaluate_with<P: DerivativeProvider + ?Sized>(
        &mut self,
        provider: &P,
        bias: &Bias,
        req: &EvalRequest,
    ) -> OperatingPointResult {
        let ambient = self.thermal.ambient;
        self.temperature_effect(ambient, bias.temp, TemperatureMode::Update);

        let terminals = bias.terminals();
        let ctx = self.context(&self.thermal);
        let lin = provider.linearize(&ctx, terminals, req.charges);

        let dt = if req.temperature_derivative || self.model.params.self_heating {
            let probe = self.compute_thermal(ambient, bias.temp + TEMP_PROBE_STEP);
            let hot = evaluate::evaluate_variant(&self.context(&probe), terminals, req.charges)
                .to_array();
            Some(std::array::from_fn(|k| {
                (hot[k] - lin.values[k]) / TEMP_PROBE_STEP
            }))
        } else {
            None
        };

        let mut op =
            OperatingPointResult::assemble(&lin, dt, bias.vds, self.thermal.temp, self.thermal.gth);
        if req.noise {
            op.noise = Some(NoiseDensity::compute(
                &ctx,
                op.ich.value,
                lin.info.qinv,
                lin.info.ueff,
                [op.irs.value, op.ird.value, op.ibjt.value],
            ));
        }
        op
    }
}
