//! Model-wide properties: continuity of values and first derivatives,
//! conservation, derivative agreement, robustness over a wide bias and
//! temperature range.

mod common;

use common::{XorShift, close, instance, variant};
use soispice_devices::{
    AnalyticDerivatives, Bias, EvalRequest, OperatingPointResult, Region, Sensitivity, SoiInstance,
};

fn sweep_vgfs(
    soimod: f64,
    vds: f64,
    from: f64,
    to: f64,
    steps: usize,
) -> Vec<(f64, OperatingPointResult)> {
    let mut inst = instance(&variant(soimod));
    let req = EvalRequest::with_charges();
    (0..=steps)
        .map(|k| {
            let vgfs = from + (to - from) * k as f64 / steps as f64;
            (vgfs, inst.evaluate(&Bias::new(vds, vgfs, 0.0, 0.0), &req))
        })
        .collect()
}

#[test]
fn test_current_continuous_across_regions() {
    for soimod in [0.0, 1.0] {
        for vds in [0.05, 1.0] {
            let points = sweep_vgfs(soimod, vds, -0.5, 1.5, 4000);
            let regions: Vec<Region> = points.iter().map(|(_, op)| op.region).collect();
            assert!(regions.contains(&Region::Subthreshold));
            assert!(regions.contains(&Region::Strong));

            for pair in points.windows(2) {
                let (v0, a) = &pair[0];
                let (v1, b) = &pair[1];
                let step = (b.ich.value.ln() - a.ich.value.ln()).abs();
                // 0.5 mV steps; a smooth curve moves ln(I) by a few hundredths.
                assert!(
                    step < 0.1,
                    "soimod={soimod} vds={vds}: ln(I) jumps {step} between {v0} and {v1}"
                );
            }
        }
    }
}

#[test]
fn test_charges_continuous_across_regions() {
    for soimod in [0.0, 1.0] {
        let points = sweep_vgfs(soimod, 0.5, -0.5, 1.5, 2000);
        for pair in points.windows(2) {
            let (a, b) = (&pair[0].1, &pair[1].1);
            let scale = a.qgf.value.abs().max(1e-16);
            let dq = (b.qgf.value - a.qgf.value).abs();
            assert!(dq < 0.01 * scale + 1e-17, "qgf jumps {dq:e} at {}", pair[0].0);
        }
    }
}

#[test]
fn test_charge_conservation() {
    let mut rng = XorShift::new(0x5011);
    for soimod in [0.0, 1.0] {
        let mut inst = instance(&variant(soimod));
        for _ in 0..200 {
            let bias = Bias::new(
                rng.uniform(-2.0, 2.0),
                rng.uniform(-1.0, 2.5),
                rng.uniform(-1.0, 0.5),
                rng.uniform(-2.0, 2.0),
            );
            let op = inst.evaluate(&bias, &EvalRequest::with_charges());
            let total = op.qgf + op.qd + op.qb + op.qgb + op.qs;
            let scale = [op.qgf, op.qd, op.qb, op.qgb, op.qs]
                .iter()
                .map(|q| q.value.abs())
                .fold(1e-18, f64::max);
            assert!(total.value.abs() <= 1e-9 * scale, "{bias:?}: {:e}", total.value);

            let c = op.capacitance_matrix();
            for j in 0..4 {
                let col = c.column(j);
                let cscale = col.iter().map(|x| x.abs()).fold(1e-18, f64::max);
                assert!(col.sum().abs() <= 1e-6 * cscale, "{bias:?}: column {j}");
            }
        }
    }
}

const NAMES: [&str; 13] = [
    "ich", "ibjt", "irs", "ird", "igidl", "igisl", "igi", "igb", "qgf", "qd", "qb", "qgb", "qs",
];
/// Index of `igi`, whose impact integrals converge to a relative 1e-9.
const IGI: usize = 6;
/// Index of `igb`, whose partials come from a forward-difference relinearization.
const IGB: usize = 7;
/// Outputs before this index are currents, the rest charges.
const FIRST_CHARGE: usize = 8;

fn outputs(op: &OperatingPointResult) -> [Sensitivity; 13] {
    [
        op.ich, op.ibjt, op.irs, op.ird, op.igidl, op.igisl, op.igi, op.igb, op.qgf, op.qd, op.qb,
        op.qgb, op.qs,
    ]
}

/// `bias` with bias input `j` (vds, vgfs, vbs, vgbs order) moved by `h`.
fn nudged(bias: &Bias, j: usize, h: f64) -> Bias {
    let mut b = *bias;
    match j {
        0 => b.vds += h,
        1 => b.vgfs += h,
        2 => b.vbs += h,
        _ => b.vgbs += h,
    }
    b
}

/// Smallest partial worth comparing: A/V for currents, C/V for charges.
fn floor(k: usize, value: f64) -> f64 {
    let abs = if k < FIRST_CHARGE { 1e-22 } else { 1e-28 };
    let rel = if k == IGI { 1e-4 } else { 1e-7 };
    rel * value.abs() + abs
}

/// Compare the analytic partials at `bias` with central differences of step
/// `h`, and the temperature partial with a one-kelvin forward step.
fn check_partials(inst: &mut SoiInstance, bias: &Bias, h: f64, at: &str) {
    let full = EvalRequest {
        charges: true,
        noise: false,
        temperature_derivative: true,
    };
    let plain = EvalRequest::with_charges();
    let mut eval = |b: &Bias, req: &EvalRequest| {
        outputs(&inst.evaluate_with(&AnalyticDerivatives, b, req))
    };

    let out = eval(bias, &full);
    for j in 0..4 {
        let up = eval(&nudged(bias, j, h), &plain);
        let dn = eval(&nudged(bias, j, -h), &plain);
        for k in 0..13 {
            let fd = (up[k].value - dn[k].value) / (2.0 * h);
            let ad = out[k].gradient()[j];
            let rel = if k == IGB { 1e-2 } else { 1e-3 };
            assert!(
                close(ad, fd, rel, floor(k, out[k].value)),
                "{at}: d{}/dv[{j}] {ad:e} vs {fd:e}",
                NAMES[k]
            );
        }
    }

    let hot = eval(&bias.at_temp(bias.temp + 1.0), &plain);
    for k in 0..13 {
        let fd = hot[k].value - out[k].value;
        let dt = out[k].dt;
        assert!(
            close(dt, fd, 1e-6, 0.1 * floor(k, out[k].value)),
            "{at}: d{}/dT {dt:e} vs {fd:e}",
            NAMES[k]
        );
    }
}

#[test]
fn test_analytic_matches_finite_difference() {
    let req = EvalRequest::default();
    for soimod in [0.0, 1.0] {
        let mut inst = instance(&variant(soimod));
        for temp in [250.0, 300.15, 400.0] {
            for vds in [0.05, 0.5, 1.5] {
                for (vbs, vgbs) in [(0.0, 0.0), (-0.5, 0.0), (0.0, -1.0), (-0.5, 1.0)] {
                    let at = |vgfs: f64| Bias::new(vds, vgfs, vbs, vgbs).at_temp(temp);
                    let th = inst.evaluate(&at(0.0), &req);
                    let mid = 0.5 * (th.vthw + th.vths);
                    assert_eq!(inst.evaluate(&at(mid), &req).region, Region::Transition);

                    for vgfs in [-0.3, mid, 0.6, 1.5] {
                        let bias = at(vgfs);
                        let at_bias = format!("soimod={soimod} {bias:?}");
                        check_partials(&mut inst, &bias, 1e-5, &at_bias);
                    }
                }
            }
        }
    }
}

/// Gate voltages bracketing, to within 1e-10 V, the point where the
/// region changes from `below` to `above`.
fn region_boundary(inst: &mut SoiInstance, vds: f64, below: Region, above: Region) -> (f64, f64) {
    let req = EvalRequest::default();
    let mut region = |vgfs: f64| inst.evaluate(&Bias::new(vds, vgfs, 0.0, 0.0), &req).region;

    let step = 1e-3;
    let mut lo = -0.5;
    while region(lo + step) != above {
        lo += step;
        assert!(lo < 2.0, "no {above:?} region above {below:?} at vds={vds}");
    }
    assert_eq!(region(lo), below);

    let mut hi = lo + step;
    while hi - lo > 1e-10 {
        let m = 0.5 * (lo + hi);
        if region(m) == above {
            hi = m;
        } else {
            lo = m;
        }
    }
    (lo, hi)
}

#[test]
fn test_first_derivatives_continuous_at_thresholds() {
    let req = EvalRequest::with_charges();
    for soimod in [0.0, 1.0] {
        let mut inst = instance(&variant(soimod));
        for vds in [0.1, 1.0] {
            for (below, above) in [
                (Region::Subthreshold, Region::Transition),
                (Region::Transition, Region::Strong),
            ] {
                let (lo, hi) = region_boundary(&mut inst, vds, below, above);
                let mut at_gate = |vgfs| {
                    let bias = Bias::new(vds, vgfs, 0.0, 0.0);
                    inst.evaluate_with(&AnalyticDerivatives, &bias, &req)
                };
                let (a, b) = (at_gate(lo), at_gate(hi));
                assert_eq!((a.region, b.region), (below, above));

                let at = format!("soimod={soimod} vds={vds} {below:?}/{above:?} at {lo}");
                let cgg = a.qgf.dvgfs.abs().max(b.qgf.dvgfs.abs());
                let pairs = [
                    ("gm/I", a.ich.dvgfs / a.ich.value, b.ich.dvgfs / b.ich.value, 0.0),
                    ("gds/I", a.ich.dvds / a.ich.value, b.ich.dvds / b.ich.value, 1e-6),
                    ("Cgg", a.qgf.dvgfs, b.qgf.dvgfs, 0.0),
                    ("Cdg", a.qd.dvgfs, b.qd.dvgfs, 1e-4 * cgg),
                ];
                for (name, x, y, abs) in pairs {
                    assert!(close(x, y, 1e-4, abs), "{at}: {name} jumps {x:e} -> {y:e}");
                }
            }
        }
    }
}

#[test]
fn test_fuzz_outputs_finite() {
    let mut rng = XorShift::new(0xdecaf);
    for soimod in [0.0, 1.0] {
        let mut inst = instance(&variant(soimod));
        let req = EvalRequest {
            charges: true,
            noise: true,
            temperature_derivative: true,
        };
        for _ in 0..500 {
            let bias = Bias::new(
                rng.uniform(-5.0, 5.0),
                rng.uniform(-5.0, 5.0),
                rng.uniform(-5.0, 5.0),
                rng.uniform(-5.0, 5.0),
            )
            .at_temp(rng.uniform(200.0, 500.0));
            let op = inst.evaluate(&bias, &req);
            let outputs = [
                op.ich, op.ibjt, op.irs, op.ird, op.igidl, op.igisl, op.igi, op.igb, op.qgf,
                op.qd, op.qb, op.qgb, op.qs,
            ];
            for s in outputs {
                let all = [s.value, s.dvds, s.dvgfs, s.dvbs, s.dvgbs, s.dt];
                assert!(all.iter().all(|x| x.is_finite()), "{bias:?}: {s:?}");
            }
            assert!(op.vths.is_finite() && op.vdsat.is_finite());
            let noise = op.noise.unwrap();
            assert!(noise.thermal.is_finite() && noise.shot.is_finite());
        }
    }
}
