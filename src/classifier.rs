//! Post-inference classification of a crisp output into severity bands.
//!
//! The defuzzified value is fuzzified again against the output variable's terms.
//! Every term above the threshold is reported, so a value sitting between two bands
//! yields a compound classification, and adjacent bands that are both active raise a
//! [`Transition`].

use std::fmt;
use std::str::FromStr;

use fixed_map::{Key, Map};
use tracing::{debug, warn};

use crate::config::{validate_threshold, DEFAULT_THRESHOLD};
use crate::error::{InferenceError, Result};
use crate::system::ALCOHOLEMIA;
use crate::variable::Variable;

/// Blood-alcohol bands, declared in increasing severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Key)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Severity {
    Negativa,
    #[cfg_attr(feature = "serde", serde(rename = "grado_0"))]
    Grado0,
    PrimerGrado,
    SegundoGrado,
    TercerGrado,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Negativa,
        Severity::Grado0,
        Severity::PrimerGrado,
        Severity::SegundoGrado,
        Severity::TercerGrado,
    ];

    /// Term name in the output variable.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Negativa => "negativa",
            Self::Grado0 => "grado_0",
            Self::PrimerGrado => "primer_grado",
            Self::SegundoGrado => "segundo_grado",
            Self::TercerGrado => "tercer_grado",
        }
    }

    /// Human readable label, e.g. "Primer grado".
    pub fn label(self) -> &'static str {
        match self {
            Self::Negativa => "Negativa",
            Self::Grado0 => "Grado 0",
            Self::PrimerGrado => "Primer grado",
            Self::SegundoGrado => "Segundo grado",
            Self::TercerGrado => "Tercer grado",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = InferenceError;

    fn from_str(s: &str) -> Result<Self> {
        Severity::ALL
            .into_iter()
            .find(|sev| sev.as_str() == s)
            .ok_or_else(|| InferenceError::UnknownTerm {
                variable: ALCOHOLEMIA.to_owned(),
                term: s.to_owned(),
            })
    }
}

/// Two adjacent bands that are active at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transition {
    pub from: Severity,
    pub to: Severity,
}

impl Transition {
    /// Only these pairs are worth a warning; negativa/grado_0 overlap is not.
    pub const WATCHED: [Transition; 3] = [
        Transition {
            from: Severity::Grado0,
            to: Severity::PrimerGrado,
        },
        Transition {
            from: Severity::PrimerGrado,
            to: Severity::SegundoGrado,
        },
        Transition {
            from: Severity::SegundoGrado,
            to: Severity::TercerGrado,
        },
    ];

    pub fn as_pair(&self) -> (&'static str, &'static str) {
        (self.from.as_str(), self.to.as_str())
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Classification {
    value: f64,
    degrees: Map<Severity, f64>,
    active: Vec<Severity>,
    transitions: Vec<Transition>,
}

impl Classification {
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn degree(&self, severity: Severity) -> f64 {
        self.degrees.get(severity).copied().unwrap_or(0.)
    }

    /// Every band's degree, in severity order.
    pub fn degrees(&self) -> impl Iterator<Item = (Severity, f64)> + '_ {
        self.degrees.iter().map(|(sev, &d)| (sev, d))
    }

    /// Bands above the threshold, in severity order. Never empty.
    pub fn active(&self) -> &[Severity] {
        &self.active
    }

    pub fn active_names(&self) -> Vec<&'static str> {
        self.active.iter().map(|sev| sev.as_str()).collect()
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// More than one band is active.
    pub fn is_compound(&self) -> bool {
        self.active.len() > 1
    }

    pub fn most_severe(&self) -> Severity {
        // `active` is never empty once built
        self.active.last().copied().unwrap_or(Severity::Negativa)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classifier {
    threshold: f64,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl Classifier {
    pub fn new(threshold: f64) -> Result<Self> {
        validate_threshold(threshold)?;

        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Classifies `value` against the severity terms of `variable`.
    ///
    /// Fails with [`InferenceError::NoDominantClass`] when no band exceeds the threshold.
    pub fn classify(&self, variable: &Variable, value: f64) -> Result<Classification> {
        if !value.is_finite() {
            return Err(InferenceError::InvalidInput {
                variable: variable.name().to_owned(),
                value,
            });
        }

        let mut degrees = Map::new();

        for severity in Severity::ALL {
            degrees.insert(severity, variable.interpolated_membership(severity.as_str(), value)?);
        }

        let active: Vec<_> = degrees
            .iter()
            .filter(|&(_, &degree)| degree > self.threshold)
            .map(|(severity, _)| severity)
            .collect();

        if active.is_empty() {
            warn!("{value} is not above {} in any band", self.threshold);

            return Err(InferenceError::NoDominantClass {
                value,
                threshold: self.threshold,
            });
        }

        let transitions: Vec<_> = Transition::WATCHED
            .into_iter()
            .filter(|t| active.contains(&t.from) && active.contains(&t.to))
            .collect();

        debug!(?active, ?transitions, "classified {value}");

        Ok(Classification {
            value,
            degrees,
            active,
            transitions,
        })
    }

    /// Band whose peak lies closest to `value`.
    ///
    /// A lower-confidence fallback for callers handling
    /// [`InferenceError::NoDominantClass`]; [`Classifier::classify`] never uses it.
    pub fn nearest(&self, variable: &Variable, value: f64) -> Result<Severity> {
        let mut best = None;

        for severity in Severity::ALL {
            let peak = variable.term(severity.as_str())?.shape().peak();
            let distance = (peak - value).abs();

            match best {
                Some((_, d)) if d <= distance => {},
                _ => best = Some((severity, distance)),
            }
        }

        Ok(best.map_or(Severity::Negativa, |(severity, _)| severity))
    }
}

#[cfg(test)]
fn alcoholemia() -> Variable {
    crate::system::alcoholemia_variable(1.).unwrap()
}

#[test]
fn test_single_band() {
    let classification = Classifier::default().classify(&alcoholemia(), 9.46).unwrap();

    assert_eq!(classification.active(), &[Severity::Negativa]);
    assert!(classification.transitions().is_empty());
    assert!(!classification.is_compound());
    assert_eq!(classification.degree(Severity::Negativa), 1.);
}

#[test]
fn test_transition_between_bands() {
    let classification = Classifier::default().classify(&alcoholemia(), 57.66).unwrap();

    assert_eq!(classification.active(), &[Severity::Grado0, Severity::PrimerGrado]);
    assert_eq!(
        classification.transitions(),
        &[Transition {
            from: Severity::Grado0,
            to: Severity::PrimerGrado,
        }]
    );
    assert_eq!(classification.active_names(), vec!["grado_0", "primer_grado"]);

    let degrees: Vec<_> = classification.degrees().collect();

    assert_eq!(degrees.iter().map(|&(sev, _)| sev).collect::<Vec<_>>(), Severity::ALL);
    assert_eq!(degrees[0].1, 0.);
    assert!(degrees[1].1 > degrees[2].1 && degrees[2].1 > 0.1);
    assert_eq!(degrees[3].1, 0.);
    assert_eq!(degrees[4].1, 0.);
    assert_eq!(classification.most_severe(), Severity::PrimerGrado);
}

#[test]
fn test_negativa_overlap_is_not_a_transition() {
    // negativa ~0.133, grado_0 ~0.12
    let classification = Classifier::default().classify(&alcoholemia(), 23.).unwrap();

    assert_eq!(classification.active(), &[Severity::Negativa, Severity::Grado0]);
    assert!(classification.is_compound());
    assert!(classification.transitions().is_empty());
}

#[test]
fn test_threshold_is_strict() {
    // grado_0 is exactly 0.1 at 22.5
    let classification = Classifier::default().classify(&alcoholemia(), 22.5).unwrap();

    assert_eq!(classification.active(), &[Severity::Negativa]);
}

#[test]
fn test_no_dominant_class() {
    let classifier = Classifier::new(0.5).unwrap();
    let var = alcoholemia();

    // negativa 0.2, grado_0 0.08
    match classifier.classify(&var, 22.) {
        Err(err) => assert_eq!(
            err,
            InferenceError::NoDominantClass {
                value: 22.,
                threshold: 0.5,
            }
        ),
        Ok(classification) => panic!("unexpected {:?}", classification.active()),
    }
}

#[test]
fn test_nearest_and_parsing() {
    let var = alcoholemia();
    let classifier = Classifier::default();

    assert_eq!(classifier.nearest(&var, 22.), Ok(Severity::Negativa));
    assert_eq!(classifier.nearest(&var, 110.), Ok(Severity::SegundoGrado));
    assert_eq!("tercer_grado".parse::<Severity>(), Ok(Severity::TercerGrado));
    assert!("cuarto_grado".parse::<Severity>().is_err());
    assert_eq!(Severity::PrimerGrado.label(), "Primer grado");
    assert!(Severity::Grado0 < Severity::TercerGrado);
    assert_eq!(Classifier::new(1.5), Err(InferenceError::InvalidThreshold(1.5)));
}
