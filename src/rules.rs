use crate::dsl::{Clause, Expr};
use crate::error::Result;
use crate::inputs::Inputs;
use crate::ops::{AndOp, OrOp};
use crate::variable::Variables;

/// A rule written as data: every antecedent `(variable, term)` pair is ANDed and the
/// rule concludes `consequent` on the output variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuleDef<'a> {
    pub antecedent: &'a [(&'a str, &'a str)],
    pub consequent: &'a str,
}

#[derive(Clone, Debug, Default)]
pub struct Rules(pub(crate) Vec<Rule>);

impl Rules {
    pub fn new() -> Self {
        Rules(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Rules(Vec::with_capacity(capacity))
    }

    /// Compiles a rule table, resolving every name against `vars`.
    pub fn from_table(vars: &Variables, output: &str, table: &[RuleDef<'_>]) -> Result<Self> {
        let mut rules = Self::with_capacity(table.len());

        for def in table {
            let premise = def
                .antecedent
                .iter()
                .map(|(var, term)| vars.is(var, term))
                .collect::<Result<Vec<_>>>()?;
            let premise = match <[Expr; 1]>::try_from(premise) {
                Ok([single]) => single,
                Err(premise) => Expr::And(premise),
            };

            rules.add(premise, vars.clause(output, def.consequent)?);
        }

        Ok(rules)
    }

    pub fn add(&mut self, premise: Expr, consequence: Clause) {
        self.0.push(Rule { premise, consequence });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pub(crate) premise: Expr,
    pub(crate) consequence: Clause,
}

impl Rule {
    pub fn premise(&self) -> &Expr {
        &self.premise
    }

    pub fn consequence(&self) -> Clause {
        self.consequence
    }

    /// Truth degree of the premise, in `[0, 1]`.
    pub fn firing_strength(&self, vars: &Variables, inputs: &Inputs, and_op: AndOp, or_op: OrOp) -> Result<f64> {
        self.premise.evaluate(vars, inputs, and_op, or_op)
    }

    pub fn describe(&self, vars: &Variables) -> String {
        fn render(expr: &Expr, vars: &Variables) -> String {
            match expr {
                Expr::Is(clause) => clause.describe(vars),
                Expr::And(exprs) => exprs.iter().map(|e| render(e, vars)).collect::<Vec<_>>().join(" & "),
                Expr::Or(exprs) => {
                    let inner = exprs.iter().map(|e| render(e, vars)).collect::<Vec<_>>().join(" | ");

                    format!("({inner})")
                },
            }
        }

        format!("IF {} THEN {}", render(&self.premise, vars), self.consequence.describe(vars))
    }
}

#[cfg(test)]
fn test_vars() -> Variables {
    use crate::terms::MembershipFunction;
    use crate::variable::{Universe, Variable};

    let mut vars = Variables::new();
    let alcohol = Variable::new("alcohol", Universe::new(0., 1000., 1.).unwrap())
        .with_term("poco", MembershipFunction::trapezoidal(0., 0., 100., 200.).unwrap())
        .unwrap();
    let tiempo = Variable::new("tiempo", Universe::new(0., 180., 1.).unwrap())
        .with_term("mucho", MembershipFunction::triangular(120., 180., 180.).unwrap())
        .unwrap();
    let alcoholemia = Variable::new("alcoholemia", Universe::new(0., 200., 1.).unwrap())
        .with_term("negativa", MembershipFunction::trapezoidal(0., 0., 10., 25.).unwrap())
        .unwrap();

    vars.add(alcohol).unwrap();
    vars.add(tiempo).unwrap();
    vars.add(alcoholemia).unwrap();
    vars
}

#[test]
fn test_from_table() {
    use crate::error::InferenceError;

    let vars = test_vars();
    let table = [
        RuleDef {
            antecedent: &[("alcohol", "poco"), ("tiempo", "mucho")],
            consequent: "negativa",
        },
        RuleDef {
            antecedent: &[("alcohol", "poco")],
            consequent: "negativa",
        },
    ];
    let rules = Rules::from_table(&vars, "alcoholemia", &table).unwrap();

    assert_eq!(rules.len(), 2);
    assert_eq!(
        rules.0[0].describe(&vars),
        "IF alcohol[poco] & tiempo[mucho] THEN alcoholemia[negativa]"
    );
    assert!(matches!(rules.0[1].premise(), Expr::Is(_)));

    let mut inputs = Inputs::new();

    inputs.add_named(&vars, "alcohol", 150.).unwrap();
    inputs.add_named(&vars, "tiempo", 150.).unwrap();

    assert_eq!(rules.0[0].firing_strength(&vars, &inputs, AndOp::Min, OrOp::Max), Ok(0.5));
    assert_eq!(rules.0[1].firing_strength(&vars, &inputs, AndOp::Min, OrOp::Max), Ok(0.5));

    let bad = [RuleDef {
        antecedent: &[("alcohol", "mucho")],
        consequent: "negativa",
    }];

    assert!(matches!(
        Rules::from_table(&vars, "alcoholemia", &bad),
        Err(InferenceError::UnknownTerm { .. })
    ));

    let bad = [RuleDef {
        antecedent: &[("alcohol", "poco")],
        consequent: "tercer_grado",
    }];

    assert!(Rules::from_table(&vars, "alcoholemia", &bad).is_err());
}
