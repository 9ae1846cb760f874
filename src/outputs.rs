/// Result of one inference run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Outputs {
    value: f64,
    firing_strengths: Vec<f64>,
    aggregated: Vec<f64>,
}

impl Outputs {
    pub(crate) fn new(value: f64, firing_strengths: Vec<f64>, aggregated: Vec<f64>) -> Self {
        Self {
            value,
            firing_strengths,
            aggregated,
        }
    }

    /// The defuzzified crisp output.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Firing strength of each rule, in rule order.
    pub fn firing_strengths(&self) -> &[f64] {
        &self.firing_strengths
    }

    /// Aggregated output set, one degree per point of the output universe.
    pub fn aggregated(&self) -> &[f64] {
        &self.aggregated
    }
}
