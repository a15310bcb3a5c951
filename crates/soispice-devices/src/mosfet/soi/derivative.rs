//! Derivative providers.
//!
//! A provider turns the raw evaluator into values plus the four bias
//! partials of every output. [`AnalyticDerivatives`] runs the evaluator once
//! on dual numbers; [`FiniteDifference`] runs it five times on `f64`.

use soispice_core::scalar::{Dual, Partials};

use super::evaluate::{EvalContext, OUTPUTS, RawInfo, Terminals, evaluate_variant};

/// Default finite-difference step (V).
pub const FD_STEP: f64 = 1e-4;

/// Bias partial index order.
pub const VDS: usize = 0;
pub const VGFS: usize = 1;
pub const VBS: usize = 2;
pub const VGBS: usize = 3;

/// Outputs of a raw evaluation linearized at one bias point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Linearized {
    /// Output values in [`RawOutputs::to_array`](super::evaluate::RawOutputs::to_array) order.
    pub values: [f64; OUTPUTS],
    /// Partials with respect to (vds, vgfs, vbs, vgbs) per output.
    pub partials: [[f64; 4]; OUTPUTS],
    pub info: RawInfo,
}

/// Strategy for computing bias partials.
pub trait DerivativeProvider {
    /// Values and partials at `bias`.
    fn linearize(&self, ctx: &EvalContext, bias: Terminals<f64>, with_charges: bool)
    -> Linearized;
}

/// Exact partials by forward-mode dual numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticDerivatives;

impl DerivativeProvider for AnalyticDerivatives {
    fn linearize(
        &self,
        ctx: &EvalContext,
        bias: Terminals<f64>,
        with_charges: bool,
    ) -> Linearized {
        let seeded = Terminals {
            vds: Dual::<4>::variable(bias.vds, VDS),
            vgfs: Dual::variable(bias.vgfs, VGFS),
            vbs: Dual::variable(bias.vbs, VBS),
            vgbs: Dual::variable(bias.vgbs, VGBS),
        };
        let out = evaluate_variant(ctx, seeded, with_charges);
        let outputs = out.to_array();
        Linearized {
            values: outputs.map(|d| d.re),
            partials: outputs.map(|d| std::array::from_fn(|j| d.partial(j))),
            info: out.info,
        }
    }
}

/// Forward-difference partials: one base and four perturbed evaluations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiniteDifference {
    /// Perturbation of each bias (V).
    pub step: f64,
}

impl Default for FiniteDifference {
    fn default() -> Self {
        Self { step: FD_STEP }
    }
}

impl DerivativeProvider for FiniteDifference {
    fn linearize(
        &self,
        ctx: &EvalContext,
        bias: Terminals<f64>,
        with_charges: bool,
    ) -> Linearized {
        let base = evaluate_variant(ctx, bias, with_charges);
        let values = base.to_array();
        let mut partials = [[0.0; 4]; OUTPUTS];

        for j in 0..4 {
            let mut b = bias;
            match j {
                VDS => b.vds += self.step,
                VGFS => b.vgfs += self.step,
                VBS => b.vbs += self.step,
                _ => b.vgbs += self.step,
            }
            let perturbed = evaluate_variant(ctx, b, with_charges).to_array();
            for (k, row) in partials.iter_mut().enumerate() {
                row[j] = (perturbed[k] - values[k]) / self.step;
            }
        }

        Linearized {
            values,
            partials,
            info: base.info,
        }
    }
}
