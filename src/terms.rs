use crate::error::{InferenceError, Result};
use crate::variable::Universe;

/// Piecewise-linear membership function shapes.
///
/// Control points are kept ordered (`a <= b <= c [<= d]`); use the checked
/// constructors to build one from untrusted values.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MembershipFunction {
    /// Rises from 0 at `a` to 1 at `b`, falls back to 0 at `c`.
    Triangular { a: f64, b: f64, c: f64 },
    /// Rises from 0 at `a` to 1 at `b`, holds 1 until `c`, falls to 0 at `d`.
    Trapezoidal { a: f64, b: f64, c: f64, d: f64 },
}

impl MembershipFunction {
    pub fn triangular(a: f64, b: f64, c: f64) -> Result<Self> {
        check_points(&[a, b, c])?;

        Ok(Self::Triangular { a, b, c })
    }

    pub fn trapezoidal(a: f64, b: f64, c: f64, d: f64) -> Result<Self> {
        check_points(&[a, b, c, d])?;

        Ok(Self::Trapezoidal { a, b, c, d })
    }

    /// Membership degree of `x`, always in `[0, 1]`.
    ///
    /// Control points evaluate to their exact anchor value. Anything outside the
    /// support (including NaN) is 0.
    pub fn degree(&self, x: f64) -> f64 {
        match *self {
            Self::Triangular { a, b, c } => {
                if !(a <= x && x <= c) {
                    0.
                } else if x == b {
                    1.
                } else if x < b {
                    (x - a) / (b - a)
                } else {
                    (c - x) / (c - b)
                }
            },
            Self::Trapezoidal { a, b, c, d } => {
                if !(a <= x && x <= d) {
                    0.
                } else if b <= x && x <= c {
                    1.
                } else if x < b {
                    (x - a) / (b - a)
                } else {
                    (d - x) / (d - c)
                }
            },
        }
    }

    /// The curve sampled at every point of `universe`.
    pub fn sample(&self, universe: &Universe) -> Vec<f64> {
        universe.points().iter().map(|&x| self.degree(x)).collect()
    }

    /// Closed interval outside of which the degree is always 0.
    pub fn support(&self) -> (f64, f64) {
        match *self {
            Self::Triangular { a, c, .. } => (a, c),
            Self::Trapezoidal { a, d, .. } => (a, d),
        }
    }

    /// Midpoint of the region where the degree is 1.
    pub fn peak(&self) -> f64 {
        match *self {
            Self::Triangular { b, .. } => b,
            Self::Trapezoidal { b, c, .. } => (b + c) / 2.,
        }
    }

    pub fn control_points(&self) -> Vec<f64> {
        match *self {
            Self::Triangular { a, b, c } => vec![a, b, c],
            Self::Trapezoidal { a, b, c, d } => vec![a, b, c, d],
        }
    }
}

fn check_points(points: &[f64]) -> Result<()> {
    if points.iter().any(|p| !p.is_finite()) {
        return Err(InferenceError::InvalidShape(format!(
            "control points {points:?} must be finite"
        )));
    }

    if points.windows(2).any(|w| w[0] > w[1]) {
        return Err(InferenceError::InvalidShape(format!(
            "control points {points:?} must be in non-decreasing order"
        )));
    }

    Ok(())
}

/// A named fuzzy set within a variable.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Term {
    name: String,
    shape: MembershipFunction,
}

impl Term {
    pub fn new(name: impl Into<String>, shape: MembershipFunction) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &MembershipFunction {
        &self.shape
    }

    pub fn degree(&self, x: f64) -> f64 {
        self.shape.degree(x)
    }
}

#[test]
fn test_control_points_are_exact() {
    let tri = MembershipFunction::triangular(20., 45., 70.).unwrap();

    assert_eq!(tri.degree(20.), 0.);
    assert_eq!(tri.degree(45.), 1.);
    assert_eq!(tri.degree(70.), 0.);
    assert_eq!(tri.degree(32.5), 0.5);

    let trap = MembershipFunction::trapezoidal(0., 0., 10., 25.).unwrap();

    assert_eq!(trap.degree(0.), 1.);
    assert_eq!(trap.degree(10.), 1.);
    assert_eq!(trap.degree(25.), 0.);
    assert_eq!(trap.degree(17.5), 0.5);
}

#[test]
fn test_degenerate_shoulders() {
    // Left shoulder: tiempo is "poco"
    let left = MembershipFunction::triangular(0., 0., 60.).unwrap();

    assert_eq!(left.degree(0.), 1.);
    assert_eq!(left.degree(30.), 0.5);
    assert_eq!(left.degree(-1.), 0.);

    // Right shoulder: peso is "pesado"
    let right = MembershipFunction::trapezoidal(100., 150., 150., 150.).unwrap();

    assert_eq!(right.degree(150.), 1.);
    assert_eq!(right.degree(125.), 0.5);
    assert_eq!(right.degree(150.5), 0.);

    let right_tri = MembershipFunction::triangular(120., 180., 180.).unwrap();

    assert_eq!(right_tri.degree(180.), 1.);
    assert_eq!(right_tri.degree(150.), 0.5);
}

#[test]
fn test_outside_support_is_zero() {
    let shapes = [
        MembershipFunction::triangular(150., 350., 550.).unwrap(),
        MembershipFunction::trapezoidal(450., 600., 1000., 1000.).unwrap(),
    ];

    for shape in shapes {
        let (lo, hi) = shape.support();

        for x in [lo - 1000., lo - 0.001, hi + 0.001, hi + 1000., f64::NAN, f64::INFINITY] {
            assert_eq!(shape.degree(x), 0., "{shape:?} at {x}");
        }
    }
}

#[test]
fn test_unimodal_within_support() {
    let shape = MembershipFunction::trapezoidal(140., 160., 200., 200.).unwrap();
    let samples: Vec<_> = (1300..=2100).map(|i| shape.degree(i as f64 / 10.)).collect();
    let peak = samples
        .iter()
        .position(|&d| d == 1.)
        .expect("trapezoid reaches 1");

    assert!(samples[..=peak].windows(2).all(|w| w[0] <= w[1]));
    assert!(samples[peak..].windows(2).all(|w| w[0] >= w[1]));
    assert!(samples.iter().all(|d| (0. ..=1.).contains(d)));
}

#[test]
fn test_rejects_bad_control_points() {
    assert!(matches!(
        MembershipFunction::triangular(10., 5., 20.),
        Err(InferenceError::InvalidShape(_))
    ));
    assert!(matches!(
        MembershipFunction::trapezoidal(0., 1., f64::NAN, 3.),
        Err(InferenceError::InvalidShape(_))
    ));
    assert_eq!(MembershipFunction::triangular(50., 75., 100.).unwrap().peak(), 75.);
    assert_eq!(MembershipFunction::trapezoidal(0., 0., 10., 25.).unwrap().peak(), 5.);
}

#[test]
fn test_sample_over_universe() {
    let universe = Universe::new(0., 200., 1.).unwrap();
    let grado_0 = MembershipFunction::triangular(20., 45., 70.).unwrap();
    let curve = grado_0.sample(&universe);

    assert_eq!(curve.len(), 201);
    assert_eq!(curve[19], 0.);
    assert_eq!(curve[20], 0.);
    assert_eq!(curve[45], 1.);
    assert_eq!(curve[70], 0.);
    assert_eq!(curve[71], 0.);
    assert_eq!(curve[30], 0.4);
    assert!(curve[..20].iter().chain(&curve[70..]).all(|&d| d == 0.));
    assert_eq!(grado_0.control_points(), vec![20., 45., 70.]);
    assert_eq!(
        MembershipFunction::trapezoidal(140., 160., 200., 200.).unwrap().control_points(),
        vec![140., 160., 200., 200.]
    );
}
