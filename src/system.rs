//! The blood-alcohol estimation system: its four variables, the fixed rule table and
//! the `infer` entry point used by front ends.

use std::sync::OnceLock;

use tracing::debug;

use crate::classifier::{Classification, Classifier, Severity, Transition};
use crate::config::EngineConfig;
use crate::error::{InferenceError, Result};
use crate::inference::MamdaniInference;
use crate::inputs::Inputs;
use crate::outputs::Outputs;
use crate::rules::{RuleDef, Rules};
use crate::terms::MembershipFunction;
use crate::variable::{Universe, Variable, VariableKey, Variables};

/// Alcohol ingested, in mL.
pub const ALCOHOL: &str = "alcohol";
/// Time since drinking, in minutes.
pub const TIEMPO: &str = "tiempo";
/// Body weight, in kg.
pub const PESO: &str = "peso";
/// Blood-alcohol concentration, in mg/100 mL.
pub const ALCOHOLEMIA: &str = "alcoholemia";

pub const RULE_TABLE: [RuleDef<'static>; 14] = [
    RuleDef {
        antecedent: &[(ALCOHOL, "poco"), (TIEMPO, "mucho")],
        consequent: "negativa",
    },
    RuleDef {
        antecedent: &[(ALCOHOL, "moderado"), (TIEMPO, "mucho"), (PESO, "ligero")],
        consequent: "grado_0",
    },
    RuleDef {
        antecedent: &[(ALCOHOL, "moderado"), (TIEMPO, "poco"), (PESO, "normal")],
        consequent: "primer_grado",
    },
    RuleDef {
        antecedent: &[(ALCOHOL, "mucho"), (TIEMPO, "moderado"), (PESO, "ligero")],
        consequent: "segundo_grado",
    },
    RuleDef {
        antecedent: &[(ALCOHOL, "mucho"), (TIEMPO, "poco")],
        consequent: "tercer_grado",
    },
    RuleDef {
        antecedent: &[(ALCOHOL, "poco"), (TIEMPO, "moderado"), (PESO, "ligero")],
        consequent: "grado_0",
    },
    RuleDef {
        antecedent: &[(ALCOHOL, "poco"), (TIEMPO, "moderado"), (PESO, "normal")],
        consequent: "grado_0",
    },
    RuleDef {
        antecedent: &[(ALCOHOL, "moderado"), (TIEMPO, "moderado"), (PESO, "normal")],
        consequent: "primer_grado",
    },
    RuleDef {
        antecedent: &[(ALCOHOL, "moderado"), (TIEMPO, "moderado"), (PESO, "ligero")],
        consequent: "grado_0",
    },
    RuleDef {
        antecedent: &[(ALCOHOL, "poco"), (TIEMPO, "poco"), (PESO, "ligero")],
        consequent: "negativa",
    },
    RuleDef {
        antecedent: &[(ALCOHOL, "moderado"), (TIEMPO, "mucho"), (PESO, "normal")],
        consequent: "grado_0",
    },
    RuleDef {
        antecedent: &[(ALCOHOL, "mucho"), (TIEMPO, "moderado"), (PESO, "normal")],
        consequent: "primer_grado",
    },
    RuleDef {
        antecedent: &[(ALCOHOL, "mucho"), (TIEMPO, "mucho")],
        consequent: "primer_grado",
    },
    RuleDef {
        antecedent: &[(ALCOHOL, "moderado"), (TIEMPO, "poco"), (PESO, "ligero")],
        consequent: "grado_0",
    },
];

pub fn tiempo_variable(resolution: f64) -> Result<Variable> {
    Variable::new(TIEMPO, Universe::new(0., 180., resolution)?)
        .with_term("poco", MembershipFunction::triangular(0., 0., 60.)?)?
        .with_term("moderado", MembershipFunction::triangular(30., 90., 150.)?)?
        .with_term("mucho", MembershipFunction::triangular(120., 180., 180.)?)
}

pub fn peso_variable(resolution: f64) -> Result<Variable> {
    Variable::new(PESO, Universe::new(40., 150., resolution)?)
        .with_term("ligero", MembershipFunction::triangular(40., 40., 70.)?)?
        .with_term("normal", MembershipFunction::triangular(60., 85., 110.)?)?
        .with_term("pesado", MembershipFunction::trapezoidal(100., 150., 150., 150.)?)
}

pub fn alcohol_variable(resolution: f64) -> Result<Variable> {
    Variable::new(ALCOHOL, Universe::new(0., 1000., resolution)?)
        .with_term("poco", MembershipFunction::trapezoidal(0., 0., 100., 200.)?)?
        .with_term("moderado", MembershipFunction::triangular(150., 350., 550.)?)?
        .with_term("mucho", MembershipFunction::trapezoidal(450., 600., 1000., 1000.)?)
}

/// The output variable. Its terms are named after [`Severity`] and declared in severity order.
pub fn alcoholemia_variable(resolution: f64) -> Result<Variable> {
    let shapes = [
        MembershipFunction::trapezoidal(0., 0., 10., 25.)?,
        MembershipFunction::triangular(20., 45., 70.)?,
        MembershipFunction::triangular(50., 75., 100.)?,
        MembershipFunction::triangular(90., 130., 150.)?,
        MembershipFunction::trapezoidal(140., 160., 200., 200.)?,
    ];
    let mut var = Variable::new(ALCOHOLEMIA, Universe::new(0., 200., resolution)?);

    for (severity, shape) in Severity::ALL.into_iter().zip(shapes) {
        var.add_term(severity.as_str(), shape)?;
    }

    Ok(var)
}

/// Estimate plus its classification for one set of inputs.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Assessment {
    outputs: Outputs,
    classification: Classification,
}

impl Assessment {
    /// Estimated blood-alcohol concentration, in mg/100 mL.
    pub fn output_mg_100ml(&self) -> f64 {
        self.outputs.value()
    }

    pub fn active_terms(&self) -> Vec<&'static str> {
        self.classification.active_names()
    }

    pub fn transitions(&self) -> Vec<(&'static str, &'static str)> {
        self.classification.transitions().iter().map(Transition::as_pair).collect()
    }

    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }
}

/// Variables, rules and operators, built once and read-only afterwards.
#[derive(Clone, Debug)]
pub struct AlcoholemiaSystem {
    vars: Variables,
    rules: Rules,
    alcohol: VariableKey,
    tiempo: VariableKey,
    peso: VariableKey,
    output: VariableKey,
    model: MamdaniInference,
    classifier: Classifier,
    config: EngineConfig,
}

impl AlcoholemiaSystem {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let mut vars = Variables::new();
        let alcohol = vars.add(alcohol_variable(config.resolution)?)?;
        let tiempo = vars.add(tiempo_variable(config.resolution)?)?;
        let peso = vars.add(peso_variable(config.resolution)?)?;
        let output = vars.add(alcoholemia_variable(config.resolution)?)?;
        let rules = Rules::from_table(&vars, ALCOHOLEMIA, &RULE_TABLE)?;

        debug!("built {} rules over {} variables", rules.len(), vars.len());

        Ok(Self {
            vars,
            rules,
            alcohol,
            tiempo,
            peso,
            output,
            model: MamdaniInference::from_config(&config),
            classifier: Classifier::new(config.threshold)?,
            config,
        })
    }

    pub fn variables(&self) -> &Variables {
        &self.vars
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn output_variable(&self) -> &Variable {
        &self.vars[self.output]
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs inference only, without classifying the result.
    pub fn estimate(&self, alcohol_ml: f64, tiempo_min: f64, peso_kg: f64) -> Result<Outputs> {
        let mut inputs = Inputs::new();

        for (key, value) in [(self.alcohol, alcohol_ml), (self.tiempo, tiempo_min), (self.peso, peso_kg)] {
            if !value.is_finite() {
                return Err(InferenceError::InvalidInput {
                    variable: self.vars[key].name().to_owned(),
                    value,
                });
            }

            inputs.add(key, value);
        }

        debug!(alcohol_ml, tiempo_min, peso_kg, "estimating {ALCOHOLEMIA}");

        self.model.eval(&self.vars, &self.rules, &inputs, self.output)
    }

    pub fn classify(&self, value: f64) -> Result<Classification> {
        self.classifier.classify(self.output_variable(), value)
    }

    /// Band whose peak is closest to `value`; see [`Classifier::nearest`].
    pub fn nearest(&self, value: f64) -> Result<Severity> {
        self.classifier.nearest(self.output_variable(), value)
    }

    pub fn infer(&self, alcohol_ml: f64, tiempo_min: f64, peso_kg: f64) -> Result<Assessment> {
        let outputs = self.estimate(alcohol_ml, tiempo_min, peso_kg)?;
        let classification = self.classify(outputs.value())?;

        Ok(Assessment {
            outputs,
            classification,
        })
    }
}

fn default_system() -> Result<&'static AlcoholemiaSystem> {
    static SYSTEM: OnceLock<Result<AlcoholemiaSystem>> = OnceLock::new();

    SYSTEM
        .get_or_init(|| AlcoholemiaSystem::new(EngineConfig::default()))
        .as_ref()
        .map_err(Clone::clone)
}

/// Estimates and classifies with the default configuration.
///
/// The system behind it is built on first use and shared by every caller.
pub fn infer(alcohol_ml: f64, tiempo_min: f64, peso_kg: f64) -> Result<Assessment> {
    default_system()?.infer(alcohol_ml, tiempo_min, peso_kg)
}

#[test]
fn test_rule_table_compiles() {
    let system = AlcoholemiaSystem::new(EngineConfig::default()).unwrap();

    assert_eq!(system.rules().len(), 14);
    assert_eq!(system.variables().len(), 4);
    assert_eq!(
        system.rules().iter().next().unwrap().describe(system.variables()),
        "IF alcohol[poco] & tiempo[mucho] THEN alcoholemia[negativa]"
    );
    assert!(system
        .rules()
        .iter()
        .all(|rule| rule.consequence().variable() == system.output));
}

#[test]
fn test_variables() {
    let system = AlcoholemiaSystem::new(EngineConfig::default()).unwrap();
    let vars = system.variables();
    let names: Vec<_> = system.output_variable().terms().iter().map(|t| t.name()).collect();

    assert_eq!(names, ["negativa", "grado_0", "primer_grado", "segundo_grado", "tercer_grado"]);
    assert_eq!(vars.by_name(TIEMPO).unwrap().universe().points().len(), 181);
    assert_eq!(vars.by_name(PESO).unwrap().universe().points().len(), 111);
    assert_eq!(vars.by_name(ALCOHOL).unwrap().universe().points().len(), 1001);
    assert_eq!(system.output_variable().universe().points().len(), 201);
}

#[test]
fn test_bad_config() {
    assert!(AlcoholemiaSystem::new(EngineConfig::default().with_threshold(-0.1)).is_err());
    assert!(AlcoholemiaSystem::new(EngineConfig::default().with_resolution(f64::NAN)).is_err());
    assert!(matches!(
        AlcoholemiaSystem::new(EngineConfig::default().with_resolution(1e-300)),
        Err(InferenceError::InvalidUniverse { .. })
    ));
}

#[test]
fn test_invalid_input_names_variable() {
    let system = AlcoholemiaSystem::new(EngineConfig::default()).unwrap();

    match system.estimate(100., f64::NAN, 70.) {
        Err(InferenceError::InvalidInput { variable, value }) => {
            assert_eq!(variable, TIEMPO);
            assert!(value.is_nan());
        },
        other => panic!("expected InvalidInput, got {other:?}"),
    }
    assert!(matches!(
        system.estimate(f64::INFINITY, 10., 70.),
        Err(InferenceError::InvalidInput { ref variable, .. }) if variable == ALCOHOL
    ));
}
