//! Parasitic lateral bipolar transistor.

use soispice_core::scalar::Scalar;

use super::evaluate::EvalContext;

/// Collector current of the lateral bipolar (source emitter, drain
/// collector) at body-source bias `vbs` and body-drain bias `vbd`.
#[inline]
pub fn collector_current<S: Scalar>(ctx: &EvalContext, vbs: S, vbd: S) -> S {
    ctx.t.bjt.eval(vbs) - ctx.t.bjt.eval(vbd)
}
