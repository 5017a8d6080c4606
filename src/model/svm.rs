//! Trained two-class SVM

use crate::core::{
    Label, LabelPair, LabeledObservation, Observation, ParameterMap, Result, SvmError,
};
use crate::kernel::KernelFunction;
use std::sync::Arc;

/// Mapping between the numeric classes -1.0/+1.0 and their labels
///
/// The lexicographically smaller label is always the negative class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericClassToLabel {
    pair: LabelPair,
}

impl NumericClassToLabel {
    pub fn new(pair: LabelPair) -> Self {
        Self { pair }
    }

    pub fn negative(&self) -> &str {
        self.pair.first()
    }

    pub fn positive(&self) -> &str {
        self.pair.second()
    }

    /// Label for a numeric class or decision value; only `> 0` is positive
    pub fn label_for(&self, value: f64) -> &str {
        if value > 0.0 {
            self.positive()
        } else {
            self.negative()
        }
    }

    /// Numeric class of a label, if it belongs to this pair
    pub fn numeric_for(&self, label: &str) -> Option<f64> {
        if label == self.negative() {
            Some(-1.0)
        } else if label == self.positive() {
            Some(1.0)
        } else {
            None
        }
    }

    pub fn label_pair(&self) -> &LabelPair {
        &self.pair
    }
}

/// An immutable trained two-class classifier
///
/// Holds only the support vectors, i.e. the observations whose dual
/// coefficient is nonzero. `a`, `y` and `support_vectors` are parallel.
#[derive(Debug, Clone)]
pub struct Svm {
    support_vectors: Vec<LabeledObservation>,
    a: Vec<f64>,
    y: Vec<f64>,
    b: f64,
    class_to_label: NumericClassToLabel,
    kernel: Arc<dyn KernelFunction>,
    parameters: ParameterMap,
}

impl Svm {
    /// Assemble a trained model, checking the support vector invariants
    pub fn new(
        support_vectors: Vec<LabeledObservation>,
        a: Vec<f64>,
        y: Vec<f64>,
        b: f64,
        class_to_label: NumericClassToLabel,
        kernel: Arc<dyn KernelFunction>,
        parameters: ParameterMap,
    ) -> Result<Self> {
        if a.len() != support_vectors.len() || y.len() != support_vectors.len() {
            return Err(SvmError::InvalidModel(format!(
                "{} support vectors but {} coefficients and {} numeric labels",
                support_vectors.len(),
                a.len(),
                y.len()
            )));
        }
        if a.iter().any(|&ai| ai == 0.0) {
            return Err(SvmError::InvalidModel(
                "support vectors must have nonzero dual coefficients".to_string(),
            ));
        }
        if y.iter().any(|&yi| yi != 1.0 && yi != -1.0) {
            return Err(SvmError::InvalidModel(
                "numeric labels must be -1.0 or +1.0".to_string(),
            ));
        }
        Ok(Self {
            support_vectors,
            a,
            y,
            b,
            class_to_label,
            kernel,
            parameters,
        })
    }

    /// Decision function d = b + Σ a[i]·y[i]·K(x, sv[i])
    pub fn decision_value(&self, observation: &Observation) -> f64 {
        self.support_vectors
            .iter()
            .zip(self.a.iter().zip(self.y.iter()))
            .map(|(sv, (&ai, &yi))| ai * yi * self.kernel.similarity(observation, &sv.observation))
            .sum::<f64>()
            + self.b
    }

    /// Predicted label; a zero decision value resolves to the negative class
    pub fn classify(&self, observation: &Observation) -> &str {
        self.class_to_label.label_for(self.decision_value(observation))
    }

    /// Batch form of [`Svm::classify`]
    pub fn classify_all(&self, observations: &[LabeledObservation]) -> Vec<Label> {
        observations
            .iter()
            .map(|o| self.classify(&o.observation).to_string())
            .collect()
    }

    /// Fraction of observations whose label is predicted exactly; 0 for an empty set
    pub fn score(&self, observations: &[LabeledObservation]) -> f64 {
        if observations.is_empty() {
            return 0.0;
        }
        let correct = observations
            .iter()
            .filter(|o| self.classify(&o.observation) == o.label)
            .count();
        correct as f64 / observations.len() as f64
    }

    /// Primal weight vector w_i = Σ a[j]·y[j]·x[j][i]
    ///
    /// Only meaningful for the linear kernel, where d = w·x + b (+ constant term).
    pub fn linear_weights(&self) -> Vec<f64> {
        let dim = self
            .support_vectors
            .first()
            .map(|sv| sv.observation.len())
            .unwrap_or(0);
        let mut weights = vec![0.0; dim];
        for (sv, (&aj, &yj)) in self.support_vectors.iter().zip(self.a.iter().zip(self.y.iter())) {
            for (w, &x) in weights.iter_mut().zip(sv.observation.values()) {
                *w += aj * yj * x;
            }
        }
        weights
    }

    pub fn support_vectors(&self) -> &[LabeledObservation] {
        &self.support_vectors
    }

    /// Dual coefficients of the support vectors
    pub fn a(&self) -> &[f64] {
        &self.a
    }

    /// Numeric labels (-1.0/+1.0) of the support vectors
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Bias term
    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn class_to_label(&self) -> &NumericClassToLabel {
        &self.class_to_label
    }

    pub fn label_pair(&self) -> &LabelPair {
        self.class_to_label.label_pair()
    }

    pub fn kernel(&self) -> &dyn KernelFunction {
        self.kernel.as_ref()
    }

    /// Kernel and trainer hyperparameters that produced this model
    pub fn parameters(&self) -> &ParameterMap {
        &self.parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::LinearKernel;
    use approx::assert_relative_eq;

    fn pair() -> NumericClassToLabel {
        NumericClassToLabel::new(LabelPair::new("blue", "green").unwrap())
    }

    /// d(x) = x[0] with support vectors at ±1
    fn hand_built() -> Svm {
        Svm::new(
            vec![
                LabeledObservation::new("green", Observation::new(vec![1.0, 0.0]), 0),
                LabeledObservation::new("blue", Observation::new(vec![-1.0, 0.0]), 1),
            ],
            vec![0.5, 0.5],
            vec![1.0, -1.0],
            0.0,
            pair(),
            Arc::new(LinearKernel::new(0.0)),
            ParameterMap::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_numeric_class_to_label() {
        let map = pair();
        assert_eq!(map.negative(), "blue");
        assert_eq!(map.positive(), "green");
        assert_eq!(map.numeric_for("blue"), Some(-1.0));
        assert_eq!(map.numeric_for("green"), Some(1.0));
        assert_eq!(map.numeric_for("red"), None);
        // ties go to the negative class
        assert_eq!(map.label_for(0.0), "blue");
    }

    #[test]
    fn test_decision_value_and_classify() {
        let svm = hand_built();
        assert_relative_eq!(svm.decision_value(&Observation::new(vec![2.0, 7.0])), 2.0);
        assert_eq!(svm.classify(&Observation::new(vec![0.3, -4.0])), "green");
        assert_eq!(svm.classify(&Observation::new(vec![-0.3, 4.0])), "blue");
        assert_eq!(svm.classify(&Observation::new(vec![0.0, 1.0])), "blue");
    }

    #[test]
    fn test_score_and_classify_all() {
        let svm = hand_built();
        let test = vec![
            LabeledObservation::new("green", Observation::new(vec![1.5, 0.0]), 10),
            LabeledObservation::new("blue", Observation::new(vec![-2.0, 0.0]), 11),
            LabeledObservation::new("blue", Observation::new(vec![0.5, 0.0]), 12),
            LabeledObservation::new("green", Observation::new(vec![3.0, 1.0]), 13),
        ];
        assert_eq!(svm.classify_all(&test), vec!["green", "blue", "green", "green"]);
        assert_relative_eq!(svm.score(&test), 0.75);
        assert_eq!(svm.score(&[]), 0.0);
    }

    #[test]
    fn test_linear_weights() {
        let svm = hand_built();
        // 0.5 * 1 * [1, 0] + 0.5 * -1 * [-1, 0]
        assert_eq!(svm.linear_weights(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_rejects_zero_coefficient() {
        let result = Svm::new(
            vec![LabeledObservation::new("blue", Observation::new(vec![1.0]), 0)],
            vec![0.0],
            vec![-1.0],
            0.0,
            pair(),
            Arc::new(LinearKernel::new(0.0)),
            ParameterMap::new(),
        );
        assert!(matches!(result, Err(SvmError::InvalidModel(_))));
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let result = Svm::new(
            vec![LabeledObservation::new("blue", Observation::new(vec![1.0]), 0)],
            vec![1.0, 2.0],
            vec![-1.0],
            0.0,
            pair(),
            Arc::new(LinearKernel::new(0.0)),
            ParameterMap::new(),
        );
        assert!(matches!(result, Err(SvmError::InvalidModel(_))));
    }
}
