use std::borrow::Cow;

use tracing::{debug, trace, warn};

use crate::config::{EngineConfig, InputPolicy};
use crate::error::Result;
use crate::inputs::Inputs;
use crate::ops::*;
use crate::outputs::Outputs;
use crate::rules::Rules;
use crate::variable::{VariableKey, Variables};

/// Mamdani inference: fuzzify, fire rules, imply, aggregate, defuzzify.
///
/// Holds only operator choices, so one instance can be shared freely; every call to
/// [`MamdaniInference::eval`] is independent of the others.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MamdaniInference {
    and_op: AndOp,
    or_op: OrOp,
    imp_op: ImplicationOp,
    prod_link: ProductionLink,
    defuzz_op: DefuzzificationOp,
    input_policy: InputPolicy,
}

impl Default for MamdaniInference {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl MamdaniInference {
    pub fn new(
        and_op: AndOp,
        or_op: OrOp,
        imp_op: ImplicationOp,
        prod_link: ProductionLink,
        defuzz_op: DefuzzificationOp,
    ) -> Self {
        Self {
            and_op,
            or_op,
            imp_op,
            prod_link,
            defuzz_op,
            input_policy: InputPolicy::Accept,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.and_op,
            config.or_op,
            config.implication,
            config.aggregation,
            config.defuzzification,
        )
        .with_input_policy(config.input_policy)
    }

    pub fn with_input_policy(mut self, input_policy: InputPolicy) -> Self {
        self.input_policy = input_policy;
        self
    }

    pub fn eval(&self, vars: &Variables, rules: &Rules, inputs: &Inputs, output: VariableKey) -> Result<Outputs> {
        inputs.validate(vars)?;

        let inputs = self.apply_input_policy(vars, inputs);
        let strengths = self.firing_strengths(vars, rules, &inputs)?;
        let aggregated = self.aggregate(vars, rules, &strengths, output);
        let universe = vars[output].universe();

        let value = match self.defuzz_op.call(universe.points(), &aggregated) {
            Ok(value) => value,
            Err(err) => {
                warn!("{}: {err}", vars[output].name());
                return Err(err);
            },
        };

        debug!("{} = {value} ({:?})", vars[output].name(), self.defuzz_op);

        Ok(Outputs::new(value, strengths, aggregated))
    }

    fn apply_input_policy<'i>(&self, vars: &Variables, inputs: &'i Inputs) -> Cow<'i, Inputs> {
        match self.input_policy {
            InputPolicy::Accept => Cow::Borrowed(inputs),
            InputPolicy::Clamp => {
                let mut clamped = Inputs::new();

                for (&key, &value) in &inputs.0 {
                    let Some(var) = vars.get(key) else {
                        clamped.add(key, value);
                        continue;
                    };
                    let universe = var.universe();

                    if !universe.contains(value) {
                        trace!("clamping {} = {value} into [{}, {}]", var.name(), universe.min(), universe.max());
                    }

                    clamped.add(key, universe.clamp(value));
                }

                Cow::Owned(clamped)
            },
        }
    }

    /// Firing strength of every rule, in rule order.
    pub fn firing_strengths(&self, vars: &Variables, rules: &Rules, inputs: &Inputs) -> Result<Vec<f64>> {
        rules
            .iter()
            .map(|rule| {
                let strength = rule.firing_strength(vars, inputs, self.and_op, self.or_op)?;

                trace!("{} fired at {strength}", rule.describe(vars));

                Ok(strength)
            })
            .collect()
    }

    /// Aggregated set of each term of `output`, in term order, sampled over its universe.
    ///
    /// A term's set combines, through the production link, the implication of every
    /// rule concluding that term. Terms no rule concludes are zero everywhere.
    pub fn aggregate_by_term(
        &self,
        vars: &Variables,
        rules: &Rules,
        strengths: &[f64],
        output: VariableKey,
    ) -> Vec<Vec<f64>> {
        let var = &vars[output];
        let points = var.universe().points();
        let mut by_term = vec![vec![0.; points.len()]; var.terms().len()];

        for (rule, &strength) in rules.iter().zip(strengths) {
            let consequence = rule.consequence();

            if consequence.variable() != output {
                continue;
            }

            let term = var.term_at(consequence.term());
            let implied = points.iter().map(|&y| self.imp_op.call(strength, term.degree(y)));
            let agg = &mut by_term[consequence.term()];

            *agg = self.prod_link.call(agg.iter().copied(), implied).collect();
        }

        by_term
    }

    /// The overall aggregated output set: every term's set combined point by point.
    pub fn aggregate(&self, vars: &Variables, rules: &Rules, strengths: &[f64], output: VariableKey) -> Vec<f64> {
        let n_points = vars[output].universe().points().len();

        self.aggregate_by_term(vars, rules, strengths, output)
            .into_iter()
            .fold(vec![0.; n_points], |agg, term| self.prod_link.call(agg, term).collect())
    }
}

#[cfg(test)]
fn tipping() -> (Variables, Rules, VariableKey, VariableKey) {
    use crate::rules::RuleDef;
    use crate::terms::MembershipFunction;
    use crate::variable::{Universe, Variable};

    let mut vars = Variables::new();
    let service = vars
        .add(
            Variable::new("service", Universe::new(0., 10., 1.).unwrap())
                .with_term("poor", MembershipFunction::triangular(0., 0., 5.).unwrap())
                .unwrap()
                .with_term("good", MembershipFunction::triangular(5., 10., 10.).unwrap())
                .unwrap(),
        )
        .unwrap();
    let tip = vars
        .add(
            Variable::new("tip", Universe::new(0., 30., 1.).unwrap())
                .with_term("low", MembershipFunction::triangular(0., 0., 15.).unwrap())
                .unwrap()
                .with_term("high", MembershipFunction::triangular(15., 30., 30.).unwrap())
                .unwrap(),
        )
        .unwrap();
    let table = [
        RuleDef {
            antecedent: &[("service", "poor")],
            consequent: "low",
        },
        RuleDef {
            antecedent: &[("service", "good")],
            consequent: "high",
        },
    ];
    let rules = Rules::from_table(&vars, "tip", &table).unwrap();

    (vars, rules, service, tip)
}

#[test]
fn test_tipping() {
    use approx::assert_relative_eq;

    let (vars, rules, service, tip) = tipping();
    let model = MamdaniInference::default();
    let mut inputs = Inputs::new();

    inputs.add(service, 10.);

    let outputs = model.eval(&vars, &rules, &inputs, tip).unwrap();

    assert_eq!(outputs.firing_strengths(), &[0., 1.]);
    assert_relative_eq!(outputs.value(), 25.333333333333333, epsilon = 1e-9);

    inputs.add(service, 2.5);

    let outputs = model.eval(&vars, &rules, &inputs, tip).unwrap();

    assert_eq!(outputs.firing_strengths(), &[0.5, 0.]);
    assert_relative_eq!(outputs.value(), 5.568181818181818, epsilon = 1e-9);
    // Clipped at the firing strength
    assert_eq!(outputs.aggregated()[0], 0.5);
    assert_eq!(outputs.aggregated()[15], 0.);
}

#[test]
fn test_aggregate_matches_max_of_clipped_terms() {
    let (vars, rules, service, tip) = tipping();
    let model = MamdaniInference::default();
    let mut inputs = Inputs::new();

    inputs.add(service, 4.);

    let strengths = model.firing_strengths(&vars, &rules, &inputs).unwrap();
    let aggregated = model.aggregate(&vars, &rules, &strengths, tip);
    let var = &vars[tip];

    for (i, &y) in var.universe().points().iter().enumerate() {
        let expected = rules
            .iter()
            .zip(&strengths)
            .map(|(rule, &s)| f64::min(s, var.term_at(rule.consequence().term()).degree(y)))
            .fold(0., f64::max);

        assert_eq!(aggregated[i], expected);
        assert!((0. ..=1.).contains(&aggregated[i]));
    }
}

#[test]
fn test_no_rule_fired() {
    use crate::error::InferenceError;

    let (vars, rules, service, tip) = tipping();
    let mut inputs = Inputs::new();

    // Both terms are 0 exactly at 5
    inputs.add(service, 5.);

    let err = MamdaniInference::default()
        .eval(&vars, &rules, &inputs, tip)
        .unwrap_err();

    assert_eq!(err, InferenceError::NoRuleFired);
    assert!(err.is_evaluation_error());
}

#[test]
fn test_input_policy() {
    use crate::error::InferenceError;

    let (vars, rules, service, tip) = tipping();
    let mut inputs = Inputs::new();

    inputs.add(service, 15.);

    let accept = MamdaniInference::default();
    let clamp = accept.with_input_policy(InputPolicy::Clamp);
    let mut at_max = Inputs::new();

    at_max.add(service, 10.);

    assert_eq!(accept.eval(&vars, &rules, &inputs, tip), Err(InferenceError::NoRuleFired));
    assert_eq!(
        clamp.eval(&vars, &rules, &inputs, tip),
        accept.eval(&vars, &rules, &at_max, tip)
    );

    inputs.add(service, f64::NAN);

    assert!(matches!(
        clamp.eval(&vars, &rules, &inputs, tip),
        Err(InferenceError::InvalidInput { .. })
    ));
}
