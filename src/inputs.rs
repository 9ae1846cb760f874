use std::collections::HashMap;

use crate::error::{InferenceError, Result};
use crate::variable::{VariableKey, Variables};

/// Crisp input values keyed by variable.
#[derive(Clone, Debug, Default)]
pub struct Inputs(pub(crate) HashMap<VariableKey, f64>);

impl Inputs {
    pub fn new() -> Self {
        Inputs(HashMap::new())
    }

    pub fn add(&mut self, var: VariableKey, val: f64) {
        self.0.insert(var, val);
    }

    /// Looks the variable up by name before adding the value.
    pub fn add_named(&mut self, vars: &Variables, name: &str, val: f64) -> Result<()> {
        let key = vars.key_of(name)?;

        self.add(key, val);

        Ok(())
    }

    pub fn get(&self, var: VariableKey) -> Option<f64> {
        self.0.get(&var).copied()
    }

    /// Rejects NaN and infinite values, reporting the first offending variable in
    /// registration order.
    pub(crate) fn validate(&self, vars: &Variables) -> Result<()> {
        for (key, var) in vars.iter() {
            match self.get(key) {
                Some(value) if !value.is_finite() => {
                    return Err(InferenceError::InvalidInput {
                        variable: var.name().to_owned(),
                        value,
                    });
                },
                _ => {},
            }
        }

        Ok(())
    }
}

#[test]
fn test_validate_reports_first_registered_variable() {
    use crate::terms::MembershipFunction;
    use crate::variable::{Universe, Variable};

    let mut vars = Variables::new();
    let keys: Vec<_> = ["alcohol", "tiempo", "peso"]
        .into_iter()
        .map(|name| {
            let var = Variable::new(name, Universe::new(0., 10., 1.).unwrap())
                .with_term("bajo", MembershipFunction::triangular(0., 0., 10.).unwrap())
                .unwrap();

            vars.add(var).unwrap()
        })
        .collect();

    for _ in 0..16 {
        let mut inputs = Inputs::new();

        inputs.add(keys[2], f64::INFINITY);
        inputs.add(keys[1], f64::NAN);
        inputs.add(keys[0], 5.);

        match inputs.validate(&vars) {
            Err(InferenceError::InvalidInput { variable, value }) => {
                assert_eq!(variable, "tiempo");
                assert!(value.is_nan());
            },
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    let mut inputs = Inputs::new();

    inputs.add(keys[0], 5.);

    assert_eq!(inputs.validate(&vars), Ok(()));
}
