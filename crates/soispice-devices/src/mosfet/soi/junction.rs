//! Body-source and body-drain junctions: leakage and depletion charge.

use soispice_core::scalar::Scalar;

use super::evaluate::EvalContext;

/// Forward-bias coefficient of the depletion charge.
const FC: f64 = 0.5;
/// Grading coefficient of the depletion charge.
const GRADING: f64 = 0.5;

/// Recombination plus diffusion current of one junction at forward bias `v`.
pub fn leakage<S: Scalar>(ctx: &EvalContext, v: S) -> S {
    ctx.t.recombination.eval_minus_one(v) + ctx.t.diffusion.eval_minus_one(v)
}

/// Depletion charge on the body side of one junction at forward bias `v`.
///
/// Above `FC * vbi` the charge continues with the linearized capacitance so
/// value and slope stay continuous.
pub fn depletion_charge<S: Scalar>(ctx: &EvalContext, v: S) -> S {
    let cj = ctx.t.cj0 * ctx.inst.junction_area;
    let pb = ctx.t.vbi;
    let one_m = 1.0 - GRADING;
    let vcrit = FC * pb;
    if v.re() < vcrit {
        let x = S::one() - v / pb;
        (S::one() - x.powf(one_m)) * (cj * pb / one_m)
    } else {
        let f1 = pb / one_m * (1.0 - (1.0 - FC).powf(one_m));
        let f2 = (1.0 - FC).powf(1.0 + GRADING);
        let f3 = 1.0 - FC * (1.0 + GRADING);
        let dv = v - vcrit;
        let quad = (v.sq() - vcrit * vcrit) * (GRADING / (2.0 * pb));
        ((dv * f3 + quad) / f2 + f1) * cj
    }
}
