use crate::error::{InferenceError, Result};
use crate::inputs::Inputs;
use crate::ops::{AndOp, OrOp};
use crate::variable::{VariableKey, Variables};

/// A resolved `variable is term` proposition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Clause {
    pub(crate) variable: VariableKey,
    pub(crate) term: usize,
}

impl Clause {
    pub fn variable(&self) -> VariableKey {
        self.variable
    }

    /// Index of the term within its variable.
    pub fn term(&self) -> usize {
        self.term
    }

    /// Degree of `x` in the clause's term.
    pub fn degree(&self, vars: &Variables, x: f64) -> f64 {
        vars[self.variable].term_at(self.term).degree(x)
    }

    /// `variable.term` as written in rules.
    pub fn describe(&self, vars: &Variables) -> String {
        let var = &vars[self.variable];

        format!("{}[{}]", var.name(), var.term_at(self.term).name())
    }
}

// TODO: Support hedges ("very", "somewhat") as clause modifiers
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Is(Clause),
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

impl Expr {
    pub fn or(self, rhs: Expr) -> Self {
        match self {
            Expr::Or(mut exprs) => {
                exprs.push(rhs);
                Expr::Or(exprs)
            },
            lhs => Expr::Or(vec![lhs, rhs]),
        }
    }

    pub fn and(self, rhs: Expr) -> Self {
        match self {
            Expr::And(mut exprs) => {
                exprs.push(rhs);
                Expr::And(exprs)
            },
            lhs => Expr::And(vec![lhs, rhs]),
        }
    }

    pub fn and2(self, rhs: Expr, rhs2: Expr) -> Self {
        self.and(rhs).and(rhs2)
    }

    pub fn propositions(&self) -> Vec<&Clause> {
        let mut props = Vec::new();

        fn parse<'p>(expr: &'p Expr, out: &mut Vec<&'p Clause>) {
            match expr {
                Expr::Is(clause) => out.push(clause),
                Expr::And(exprs) | Expr::Or(exprs) => {
                    for expr in exprs {
                        parse(expr, out);
                    }
                },
            }
        }

        parse(self, &mut props);

        props
    }

    /// Truth degree of the expression for the given crisp inputs.
    ///
    /// An empty `And` is true and an empty `Or` is false.
    pub fn evaluate(&self, vars: &Variables, inputs: &Inputs, and_op: AndOp, or_op: OrOp) -> Result<f64> {
        match self {
            Expr::Is(clause) => {
                let x = inputs
                    .get(clause.variable)
                    .ok_or_else(|| InferenceError::MissingInput(vars[clause.variable].name().to_owned()))?;

                Ok(clause.degree(vars, x))
            },
            Expr::And(exprs) => exprs.iter().try_fold(1., |acc, expr| -> Result<f64> {
                Ok(and_op.call(acc, expr.evaluate(vars, inputs, and_op, or_op)?))
            }),
            Expr::Or(exprs) => exprs.iter().try_fold(0., |acc, expr| -> Result<f64> {
                Ok(or_op.call(acc, expr.evaluate(vars, inputs, and_op, or_op)?))
            }),
        }
    }
}

impl From<Clause> for Expr {
    fn from(clause: Clause) -> Self {
        Expr::Is(clause)
    }
}

impl Variables {
    /// Resolves `variable is term` against the registry.
    pub fn clause(&self, variable: &str, term: &str) -> Result<Clause> {
        let key = self.key_of(variable)?;
        let term = self[key].term_index(term)?;

        Ok(Clause { variable: key, term })
    }

    pub fn is(&self, variable: &str, term: &str) -> Result<Expr> {
        self.clause(variable, term).map(Expr::Is)
    }
}

#[cfg(test)]
fn test_vars() -> Variables {
    use crate::terms::MembershipFunction;
    use crate::variable::{Universe, Variable};

    let mut vars = Variables::new();
    let tiempo = Variable::new("tiempo", Universe::new(0., 180., 1.).unwrap())
        .with_term("poco", MembershipFunction::triangular(0., 0., 60.).unwrap())
        .unwrap()
        .with_term("mucho", MembershipFunction::triangular(120., 180., 180.).unwrap())
        .unwrap();
    let alcohol = Variable::new("alcohol", Universe::new(0., 1000., 1.).unwrap())
        .with_term("poco", MembershipFunction::trapezoidal(0., 0., 100., 200.).unwrap())
        .unwrap()
        .with_term("moderado", MembershipFunction::triangular(150., 350., 550.).unwrap())
        .unwrap();

    vars.add(tiempo).unwrap();
    vars.add(alcohol).unwrap();
    vars
}

#[test]
fn test_evaluate_min_max() {
    let vars = test_vars();
    let mut inputs = Inputs::new();

    inputs.add_named(&vars, "tiempo", 30.).unwrap();
    inputs.add_named(&vars, "alcohol", 175.).unwrap();

    let poco = vars.is("tiempo", "poco").unwrap();
    let alc_poco = vars.is("alcohol", "poco").unwrap();
    let alc_mod = vars.is("alcohol", "moderado").unwrap();

    // tiempo poco = 0.5, alcohol poco = 0.25, alcohol moderado = 0.125
    let and = poco.clone().and(alc_poco.clone());
    let or = alc_poco.clone().or(alc_mod.clone());
    let nested = poco.and(alc_poco.or(alc_mod));

    assert_eq!(and.evaluate(&vars, &inputs, AndOp::Min, OrOp::Max), Ok(0.25));
    assert_eq!(or.evaluate(&vars, &inputs, AndOp::Min, OrOp::Max), Ok(0.25));
    assert_eq!(nested.evaluate(&vars, &inputs, AndOp::Min, OrOp::Max), Ok(0.25));
    assert_eq!(and.evaluate(&vars, &inputs, AndOp::Prod, OrOp::Max), Ok(0.125));
    assert_eq!(nested.propositions().len(), 3);
}

#[test]
fn test_builder_flattens() {
    let vars = test_vars();
    let a = vars.is("tiempo", "poco").unwrap();
    let b = vars.is("tiempo", "mucho").unwrap();
    let c = vars.is("alcohol", "poco").unwrap();

    match a.and2(b, c) {
        Expr::And(exprs) => assert_eq!(exprs.len(), 3),
        other => panic!("expected a flat And, got {other:?}"),
    }
}

#[test]
fn test_unknown_names_and_missing_inputs() {
    let vars = test_vars();

    assert_eq!(vars.clause("peso", "ligero"), Err(InferenceError::UnknownVariable("peso".into())));
    assert!(matches!(
        vars.clause("tiempo", "moderado"),
        Err(InferenceError::UnknownTerm { .. })
    ));

    let expr = vars.is("tiempo", "poco").unwrap();

    assert_eq!(
        expr.evaluate(&vars, &Inputs::new(), AndOp::Min, OrOp::Max),
        Err(InferenceError::MissingInput("tiempo".into()))
    );
    assert_eq!(vars.clause("alcohol", "moderado").unwrap().describe(&vars), "alcohol[moderado]");
}
