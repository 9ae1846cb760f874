use std::collections::HashMap;
use std::ops::Index;

use slotmap::{new_key_type, SlotMap};

use crate::error::{InferenceError, Result};
use crate::linspace::Linspace;
use crate::terms::{MembershipFunction, Term};

new_key_type! {
    /// A variable key
    pub struct VariableKey;
}

/// Largest number of samples a [`Universe`] may hold.
pub const MAX_SAMPLES: usize = 1 << 20;

/// A sampled numeric domain `[min, max]`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Universe {
    min: f64,
    max: f64,
    step: f64,
    points: Vec<f64>,
}

impl Universe {
    /// Samples `[min, max]` every `step`, starting at `min`. Like `numpy.arange` with an
    /// inclusive end, the last sample is the largest `min + k * step` not above `max`.
    ///
    /// Fails with [`InferenceError::InvalidUniverse`] when the step would need more than
    /// [`MAX_SAMPLES`] samples.
    pub fn new(min: f64, max: f64, step: f64) -> Result<Self> {
        let valid = min.is_finite() && max.is_finite() && step.is_finite() && min < max && step > 0.;

        if !valid {
            return Err(InferenceError::InvalidUniverse { min, max, step });
        }

        // floor is closest approx to what python does for int() conversion. But at least one edgecase exists
        // where the decimals are really long: int(4.999999999999999999) == 5
        let steps = ((max - min) / step).floor();

        if !(steps.is_finite() && steps < MAX_SAMPLES as f64) {
            return Err(InferenceError::InvalidUniverse { min, max, step });
        }

        let num = steps as usize + 1;
        let last = min + step * (num - 1) as f64;
        let points = Linspace::new(min, last, num).collect();

        Ok(Self { min, max, step, points })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn contains(&self, x: f64) -> bool {
        self.min <= x && x <= self.max
    }

    pub fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.min, self.max)
    }
}

/// A linguistic variable: a universe and its ordered terms.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variable {
    name: String,
    universe: Universe,
    terms: Vec<Term>,
}

impl Variable {
    pub fn new(name: impl Into<String>, universe: Universe) -> Self {
        Self {
            name: name.into(),
            universe,
            terms: Vec::new(),
        }
    }

    pub fn with_term(mut self, name: impl Into<String>, shape: MembershipFunction) -> Result<Self> {
        self.add_term(name, shape)?;

        Ok(self)
    }

    pub fn add_term(&mut self, name: impl Into<String>, shape: MembershipFunction) -> Result<()> {
        let name = name.into();

        if self.terms.iter().any(|t| t.name() == name) {
            return Err(InferenceError::DuplicateTerm {
                variable: self.name.clone(),
                term: name,
            });
        }

        self.terms.push(Term::new(name, shape));

        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    /// Terms in declaration order.
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn term_index(&self, term: &str) -> Result<usize> {
        self.terms
            .iter()
            .position(|t| t.name() == term)
            .ok_or_else(|| InferenceError::UnknownTerm {
                variable: self.name.clone(),
                term: term.to_owned(),
            })
    }

    pub fn term(&self, term: &str) -> Result<&Term> {
        self.term_index(term).map(|i| &self.terms[i])
    }

    pub(crate) fn term_at(&self, index: usize) -> &Term {
        &self.terms[index]
    }

    pub fn term_degree(&self, term: &str, x: f64) -> Result<f64> {
        self.term(term).map(|t| t.degree(x))
    }

    /// Membership of `x` in `term`, interpolated along the term's piecewise-linear curve.
    ///
    /// Identical to [`Variable::term_degree`]; kept as its own entry point since both
    /// fuzzification of inputs and re-fuzzification of a defuzzified output go through it.
    pub fn interpolated_membership(&self, term: &str, x: f64) -> Result<f64> {
        self.term_degree(term, x)
    }

    /// Degree of `x` in every term, in term order.
    pub fn fuzzify(&self, x: f64) -> Vec<(&str, f64)> {
        self.terms.iter().map(|t| (t.name(), t.degree(x))).collect()
    }
}

/// Registry of the variables taking part in a system.
#[derive(Clone, Debug, Default)]
pub struct Variables {
    vars: SlotMap<VariableKey, Variable>,
    names: HashMap<String, VariableKey>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, variable: Variable) -> Result<VariableKey> {
        if self.names.contains_key(variable.name()) {
            return Err(InferenceError::DuplicateVariable(variable.name.clone()));
        }

        let name = variable.name.clone();
        let key = self.vars.insert(variable);

        self.names.insert(name, key);

        Ok(key)
    }

    pub fn get(&self, key: VariableKey) -> Option<&Variable> {
        self.vars.get(key)
    }

    pub fn key_of(&self, name: &str) -> Result<VariableKey> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| InferenceError::UnknownVariable(name.to_owned()))
    }

    pub fn by_name(&self, name: &str) -> Result<&Variable> {
        self.key_of(name).map(|key| &self.vars[key])
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariableKey, &Variable)> {
        self.vars.iter()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl Index<VariableKey> for Variables {
    type Output = Variable;

    fn index(&self, key: VariableKey) -> &Variable {
        &self.vars[key]
    }
}

#[cfg(test)]
fn peso() -> Variable {
    Variable::new("peso", Universe::new(40., 150., 1.).unwrap())
        .with_term("ligero", MembershipFunction::triangular(40., 40., 70.).unwrap())
        .unwrap()
        .with_term("normal", MembershipFunction::triangular(60., 85., 110.).unwrap())
        .unwrap()
        .with_term("pesado", MembershipFunction::trapezoidal(100., 150., 150., 150.).unwrap())
        .unwrap()
}

#[test]
fn test_universe_sampling() {
    let universe = Universe::new(0., 200., 1.).unwrap();

    assert_eq!(universe.points().len(), 201);
    assert_eq!(universe.points()[0], 0.);
    assert_eq!(universe.points()[200], 200.);

    // Like arange, a step that doesn't divide the range stops short of max
    let universe = Universe::new(0., 10., 4.).unwrap();

    assert_eq!(universe.points(), &[0., 4., 8.]);
    assert!(universe.contains(10.));
    assert_eq!(universe.clamp(12.), 10.);

    assert!(matches!(
        Universe::new(10., 0., 1.),
        Err(InferenceError::InvalidUniverse { .. })
    ));
    assert!(Universe::new(0., 10., 0.).is_err());
    assert!(Universe::new(0., f64::INFINITY, 1.).is_err());
}

#[test]
fn test_universe_sample_cap() {
    assert!(matches!(
        Universe::new(0., 1., 1e-300),
        Err(InferenceError::InvalidUniverse { .. })
    ));
    assert!(Universe::new(0., 1000., 1e-9).is_err());
    assert!(Universe::new(f64::MIN / 2., f64::MAX / 2., f64::MIN_POSITIVE).is_err());

    let fine = Universe::new(0., 1000., 0.5).unwrap();

    assert_eq!(fine.points().len(), 2001);
    assert_eq!(fine.points()[2000], 1000.);
}

#[test]
fn test_term_lookup() {
    let peso = peso();

    assert_eq!(peso.term_index("normal"), Ok(1));
    assert_eq!(peso.term_degree("normal", 72.5), Ok(0.5));
    assert_eq!(peso.interpolated_membership("normal", 72.5), Ok(0.5));
    assert_eq!(
        peso.term_degree("obeso", 90.),
        Err(InferenceError::UnknownTerm {
            variable: "peso".into(),
            term: "obeso".into(),
        })
    );
    assert_eq!(
        peso.fuzzify(65.),
        vec![("ligero", 5. / 30.), ("normal", 0.2), ("pesado", 0.)]
    );
}

#[test]
fn test_duplicates_are_rejected() {
    let dup = peso().with_term("normal", MembershipFunction::triangular(0., 1., 2.).unwrap());

    assert!(matches!(dup, Err(InferenceError::DuplicateTerm { .. })));

    let mut vars = Variables::new();
    let key = vars.add(peso()).unwrap();

    assert_eq!(vars.key_of("peso"), Ok(key));
    assert_eq!(vars[key].name(), "peso");
    assert_eq!(vars.add(peso()), Err(InferenceError::DuplicateVariable("peso".into())));
    assert_eq!(vars.key_of("edad"), Err(InferenceError::UnknownVariable("edad".into())));
    assert_eq!(vars.len(), 1);
}
