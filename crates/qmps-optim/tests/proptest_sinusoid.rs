//! Property-based tests for the closed-form coordinate models.

use proptest::prelude::*;
use qmps_optim::{DoubleProbes, DoubleSinusoid, Sinusoid, wrap_angle};
use std::f64::consts::{FRAC_PI_2, PI};

proptest! {
    #[test]
    fn wrap_lands_in_principal_range(x in -1000.0_f64..1000.0) {
        let w = wrap_angle(x);
        prop_assert!(w > -PI && w <= PI);
        prop_assert!(((x - w).cos() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn wrap_odd_multiples_of_pi_stay_in_half_open_range(k in -50_i32..50) {
        let x = f64::from(2 * k + 1) * PI;
        let w = wrap_angle(x);
        prop_assert!(w > -PI && w <= PI);
        prop_assert!((w.abs() - PI).abs() < 1e-12);
    }

    #[test]
    fn single_step_hits_exact_minimum(
        amp in 0.01_f64..10.0,
        phase in -PI..PI,
        offset in -5.0_f64..5.0,
    ) {
        let f = |t: f64| amp * (t + phase).sin() + offset;
        let fit = Sinusoid::fit(f(0.0), f(FRAC_PI_2), f(-FRAC_PI_2));
        let theta = fit.argmin();
        prop_assert!((f(theta) - (offset - amp)).abs() < 1e-9);
        prop_assert!(theta > -PI && theta <= PI);
    }

    #[test]
    fn double_model_is_exact(
        a in -3.0_f64..3.0,
        b in -3.0_f64..3.0,
        c in -3.0_f64..3.0,
        d in -3.0_f64..3.0,
        k in -3.0_f64..3.0,
        x in -PI..PI,
    ) {
        let truth = DoubleSinusoid { a, b, c, d, k };
        let probes = DoubleProbes::measure::<()>(|s| Ok(truth.value(s))).unwrap();
        let fit = DoubleSinusoid::fit(&probes);
        prop_assert!((fit.value(x) - truth.value(x)).abs() < 1e-9);
    }

    #[test]
    fn double_argmin_never_worse_than_origin(
        a in -3.0_f64..3.0,
        b in -3.0_f64..3.0,
        c in -3.0_f64..3.0,
        d in -3.0_f64..3.0,
    ) {
        let model = DoubleSinusoid { a, b, c, d, k: 0.0 };
        let theta = model.argmin();
        prop_assert!(model.value(theta) <= model.value(0.0) + 1e-12);
    }
}
