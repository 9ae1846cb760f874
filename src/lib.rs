//! Mamdani fuzzy inference for estimating blood-alcohol concentration.
//!
//! Three crisp inputs (alcohol ingested in mL, minutes since drinking, body weight in
//! kg) are fuzzified, run through a fixed table of 14 rules, aggregated and
//! defuzzified into mg/100 mL. The result is then classified into the five severity
//! bands (`negativa` up to `tercer_grado`), flagging values that sit between two
//! adjacent bands.
//!
//! ```
//! let assessment = alcoholemia::infer(50., 170., 90.)?;
//!
//! assert_eq!(assessment.active_terms(), ["negativa"]);
//! assert!(assessment.transitions().is_empty());
//! # Ok::<(), alcoholemia::InferenceError>(())
//! ```
//!
//! The building blocks ([`Variables`], [`Rules`], [`MamdaniInference`],
//! [`Classifier`]) work for any rule base, not only this one.

mod classifier;
mod config;
mod dsl;
mod error;
mod inference;
mod inputs;
mod linspace;
mod math;
mod ops;
mod outputs;
mod rules;
mod system;
mod terms;
mod variable;

pub use classifier::{Classification, Classifier, Severity, Transition};
pub use config::{EngineConfig, InputPolicy, DEFAULT_THRESHOLD};
pub use dsl::{Clause, Expr};
pub use error::{InferenceError, Result};
pub use inference::MamdaniInference;
pub use inputs::Inputs;
pub use linspace::Linspace;
pub use ops::{AndOp, DefuzzificationOp, ImplicationOp, OrOp, ProductionLink};
pub use outputs::Outputs;
pub use rules::{Rule, RuleDef, Rules};
pub use system::{
    alcohol_variable, alcoholemia_variable, infer, peso_variable, tiempo_variable, AlcoholemiaSystem, Assessment,
    ALCOHOL, ALCOHOLEMIA, PESO, RULE_TABLE, TIEMPO,
};
pub use terms::{MembershipFunction, Term};
pub use variable::{Universe, Variable, VariableKey, Variables, MAX_SAMPLES};
