use alcoholemia::{
    infer, AlcoholemiaSystem, DefuzzificationOp, EngineConfig, InferenceError, InputPolicy, Severity, Transition,
};
use approx::assert_relative_eq;

fn system() -> AlcoholemiaSystem {
    AlcoholemiaSystem::new(EngineConfig::default()).unwrap()
}

#[test]
fn heavy_drinking_shortly_after() {
    let assessment = infer(500., 30., 70.).unwrap();

    // tercer_grado fires through alcohol[mucho] & tiempo[poco], primer_grado pulls it down
    assert_relative_eq!(assessment.output_mg_100ml(), 136.5677118078721, epsilon = 1e-6);
    assert_eq!(assessment.active_terms(), ["segundo_grado"]);
    assert!(assessment.transitions().is_empty());

    let strengths = assessment.outputs().firing_strengths();

    assert_relative_eq!(strengths[4], 1. / 3., epsilon = 1e-12);
    assert_relative_eq!(strengths[2], 0.25, epsilon = 1e-12);
}

#[test]
fn little_alcohol_long_ago() {
    let assessment = infer(50., 170., 90.).unwrap();

    assert_relative_eq!(assessment.output_mg_100ml(), 9.45945945945946, epsilon = 1e-6);
    assert_eq!(assessment.active_terms(), ["negativa"]);
    assert!(assessment.transitions().is_empty());
}

#[test]
fn moderate_drinking() {
    let assessment = infer(300., 90., 100.).unwrap();

    assert_relative_eq!(assessment.output_mg_100ml(), 75., epsilon = 1e-6);
    assert_eq!(assessment.active_terms(), ["primer_grado"]);
}

#[test]
fn transitions_between_adjacent_bands() {
    let cases = [
        ((175., 40., 70.), 57.65666178623718, (Severity::Grado0, Severity::PrimerGrado)),
        ((475., 0., 40.), 94.37862137862115, (Severity::PrimerGrado, Severity::SegundoGrado)),
        ((525., 40., 70.), 144.1742660836978, (Severity::SegundoGrado, Severity::TercerGrado)),
    ];

    for ((alcohol, tiempo, peso), expected, (from, to)) in cases {
        let assessment = infer(alcohol, tiempo, peso).unwrap();
        let classification = assessment.classification();

        assert_relative_eq!(assessment.output_mg_100ml(), expected, epsilon = 1e-6);
        assert_eq!(classification.active(), &[from, to]);
        assert_eq!(classification.transitions(), &[Transition { from, to }]);
        assert_eq!(assessment.transitions(), vec![(from.as_str(), to.as_str())]);
    }
}

#[test]
fn no_rule_fired() {
    // No rule mentions peso[pesado], and tiempo 100 is neither poco nor mucho
    assert_eq!(infer(100., 100., 150.).unwrap_err(), InferenceError::NoRuleFired);

    // Far outside every universe
    assert_eq!(infer(5000., 1000., 10.).unwrap_err(), InferenceError::NoRuleFired);
}

#[test]
fn clamping_inputs() {
    let system = AlcoholemiaSystem::new(EngineConfig::default().with_input_policy(InputPolicy::Clamp)).unwrap();

    let clamped = system.infer(5000., -10., 20.).unwrap();
    let at_bounds = system.infer(1000., 0., 40.).unwrap();

    assert_eq!(clamped.output_mg_100ml(), at_bounds.output_mg_100ml());
}

#[test]
fn rejects_non_finite_inputs() {
    assert!(matches!(
        infer(f64::NAN, 30., 70.),
        Err(InferenceError::InvalidInput { .. })
    ));
    assert!(matches!(
        infer(100., 30., f64::NEG_INFINITY),
        Err(InferenceError::InvalidInput { .. })
    ));
}

#[test]
fn idempotent() {
    let system = system();

    for (alcohol, tiempo, peso) in [(500., 30., 70.), (175., 40., 70.), (0., 0., 40.)] {
        let first = system.infer(alcohol, tiempo, peso).unwrap();
        let second = system.infer(alcohol, tiempo, peso).unwrap();

        assert_eq!(first.output_mg_100ml().to_bits(), second.output_mg_100ml().to_bits());
        assert_eq!(first.outputs(), second.outputs());
        assert_eq!(first.active_terms(), second.active_terms());
        assert_eq!(first.transitions(), second.transitions());
    }
}

#[test]
fn outputs_stay_in_range() {
    let system = system();

    for alcohol in (0..=1000).step_by(50) {
        for tiempo in (0..=180).step_by(20) {
            for peso in (40..=150).step_by(10) {
                let outputs = match system.estimate(alcohol as f64, tiempo as f64, peso as f64) {
                    Ok(outputs) => outputs,
                    Err(err) => {
                        assert_eq!(err, InferenceError::NoRuleFired);
                        continue;
                    },
                };

                assert!((0. ..=200.).contains(&outputs.value()));
                assert!(outputs.firing_strengths().iter().all(|s| (0. ..=1.).contains(s)));
                assert!(outputs.aggregated().iter().all(|d| (0. ..=1.).contains(d)));
                assert!(outputs.aggregated().iter().any(|&d| d > 0.));
            }
        }
    }
}

#[test]
fn shared_across_threads() {
    let system = system();
    let expected = system.infer(175., 40., 70.).unwrap().output_mg_100ml();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let value = system.infer(175., 40., 70.).unwrap().output_mg_100ml();

                assert_eq!(value.to_bits(), expected.to_bits());
            });
        }
    });
}

#[test]
fn threshold_is_configurable() {
    let strict = AlcoholemiaSystem::new(EngineConfig::default().with_threshold(0.45)).unwrap();
    let assessment = strict.infer(175., 40., 70.).unwrap();

    // grado_0 ~0.49, primer_grado ~0.31
    assert_eq!(assessment.active_terms(), ["grado_0"]);
    assert!(assessment.transitions().is_empty());

    let strictest = AlcoholemiaSystem::new(EngineConfig::default().with_threshold(0.9)).unwrap();

    assert!(matches!(
        strictest.infer(175., 40., 70.),
        Err(InferenceError::NoDominantClass { .. })
    ));
}

#[test]
fn alternative_defuzzification() {
    let system =
        AlcoholemiaSystem::new(EngineConfig::default().with_defuzzification(DefuzzificationOp::MeanOfMaximum))
            .unwrap();

    // Only negativa fires (at 5/6), so the clipped plateau spans 0..=12 on the sampled universe
    let assessment = system.infer(50., 170., 90.).unwrap();

    assert_relative_eq!(assessment.output_mg_100ml(), 6., epsilon = 1e-9);
    assert_eq!(assessment.active_terms(), ["negativa"]);
}
