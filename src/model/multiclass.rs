//! One-vs-one multiclass SVM with majority voting

use crate::core::{Label, LabelPair, LabelSet, LabeledObservation, Observation};
use crate::model::{Svm, SvmPerformanceSummary};
use std::collections::BTreeMap;
use thiserror::Error;

/// Two or more labels received the maximum number of votes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("classification tie between {labels:?} with {votes} votes each")]
pub struct ClassificationTie {
    /// Tied labels in sorted order
    pub labels: Vec<Label>,
    pub votes: usize,
}

/// An observation excluded from scoring because of a vote tie
#[derive(Debug, Clone, PartialEq)]
pub struct TiedObservation {
    pub dataset_index: usize,
    pub tie: ClassificationTie,
}

/// Outcome of classifying a labeled set
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    pub correct: usize,
    /// Observations that produced a label (ties excluded)
    pub classified: usize,
    pub ties: Vec<TiedObservation>,
    /// Per label: (correct, classified)
    pub per_label: BTreeMap<Label, (usize, usize)>,
}

impl Evaluation {
    /// Fraction correct among classified observations; 0 when nothing was classified
    pub fn accuracy(&self) -> f64 {
        if self.classified == 0 {
            0.0
        } else {
            self.correct as f64 / self.classified as f64
        }
    }
}

/// A set of two-class SVMs, one per label pair, voting on every observation
#[derive(Debug, Clone)]
pub struct MultiClassSvm {
    svms: Vec<Svm>,
    labels: LabelSet,
    performance: BTreeMap<LabelPair, SvmPerformanceSummary>,
    accuracy: f64,
    label_accuracy: BTreeMap<Label, f64>,
}

impl MultiClassSvm {
    pub fn new(
        svms: Vec<Svm>,
        labels: LabelSet,
        performance: BTreeMap<LabelPair, SvmPerformanceSummary>,
    ) -> Self {
        Self {
            svms,
            labels,
            performance,
            accuracy: 0.0,
            label_accuracy: BTreeMap::new(),
        }
    }

    /// Majority vote of every two-class SVM
    pub fn classify(&self, observation: &Observation) -> Result<Label, ClassificationTie> {
        let mut votes: BTreeMap<&str, usize> = BTreeMap::new();
        for svm in &self.svms {
            *votes.entry(svm.classify(observation)).or_insert(0) += 1;
        }

        let max_votes = votes.values().copied().max().unwrap_or(0);
        let winners: Vec<&str> = votes
            .iter()
            .filter(|(_, &count)| count == max_votes)
            .map(|(&label, _)| label)
            .collect();

        match winners.as_slice() {
            [winner] => Ok(winner.to_string()),
            tied => Err(ClassificationTie {
                labels: tied.iter().map(|l| l.to_string()).collect(),
                votes: max_votes,
            }),
        }
    }

    /// Classify every observation, excluding ties from the counts
    pub fn evaluate(&self, observations: &[LabeledObservation]) -> Evaluation {
        let mut evaluation = Evaluation::default();
        for o in observations {
            match self.classify(&o.observation) {
                Ok(predicted) => {
                    let hit = predicted == o.label;
                    evaluation.classified += 1;
                    let entry = evaluation.per_label.entry(o.label.clone()).or_insert((0, 0));
                    entry.1 += 1;
                    if hit {
                        evaluation.correct += 1;
                        entry.0 += 1;
                    }
                }
                Err(tie) => evaluation.ties.push(TiedObservation {
                    dataset_index: o.dataset_index,
                    tie,
                }),
            }
        }
        evaluation
    }

    /// Fraction of non-tied observations classified correctly
    pub fn score(&self, observations: &[LabeledObservation]) -> f64 {
        self.evaluate(observations).accuracy()
    }

    /// Record overall and per-label accuracy on `observations`
    pub fn set_accuracy(&mut self, observations: &[LabeledObservation]) -> Evaluation {
        let evaluation = self.evaluate(observations);
        self.accuracy = evaluation.accuracy();
        self.label_accuracy = evaluation
            .per_label
            .iter()
            .map(|(label, &(correct, classified))| {
                (label.clone(), correct as f64 / classified as f64)
            })
            .collect();
        evaluation
    }

    pub fn svms(&self) -> &[Svm] {
        &self.svms
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn performance(&self) -> &BTreeMap<LabelPair, SvmPerformanceSummary> {
        &self.performance
    }

    pub fn performance_for(&self, pair: &LabelPair) -> Option<&SvmPerformanceSummary> {
        self.performance.get(pair)
    }

    /// Accuracy recorded by the last [`MultiClassSvm::set_accuracy`]
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn label_accuracy(&self) -> &BTreeMap<Label, f64> {
        &self.label_accuracy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ParameterMap;
    use crate::kernel::LinearKernel;
    use crate::model::NumericClassToLabel;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    /// Two-class SVM whose decision value is `w·x + b`
    fn linear_svm(negative: &str, positive: &str, w: Vec<f64>, b: f64) -> Svm {
        Svm::new(
            vec![LabeledObservation::new(positive, Observation::new(w), 0)],
            vec![1.0],
            vec![1.0],
            b,
            NumericClassToLabel::new(LabelPair::new(negative, positive).unwrap()),
            Arc::new(LinearKernel::new(0.0)),
            ParameterMap::new(),
        )
        .unwrap()
    }

    fn labels(names: &[&str]) -> LabelSet {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn obs(label: &str, values: Vec<f64>, i: usize) -> LabeledObservation {
        LabeledObservation::new(label, Observation::new(values), i)
    }

    /// a-vs-b, a-vs-c and b-vs-c; the first feature steers each vote
    fn three_class() -> MultiClassSvm {
        MultiClassSvm::new(
            vec![
                // votes "a" when x0 < 0, else "b"
                linear_svm("a", "b", vec![1.0, 0.0], 0.0),
                // votes "c" when x1 > 0, else "a"
                linear_svm("a", "c", vec![0.0, 1.0], 0.0),
                // votes "c" when x1 > 0, else "b"
                linear_svm("b", "c", vec![0.0, 1.0], 0.0),
            ],
            labels(&["a", "b", "c"]),
            BTreeMap::new(),
        )
    }

    #[test]
    fn test_majority_vote() {
        let mc = three_class();
        // a-b: b, a-c: c, b-c: c
        assert_eq!(mc.classify(&Observation::new(vec![1.0, 1.0])), Ok("c".to_string()));
        // a-b: a, a-c: a, b-c: b
        assert_eq!(mc.classify(&Observation::new(vec![-1.0, -1.0])), Ok("a".to_string()));
    }

    #[test]
    fn test_tie_is_reported() {
        // a-b: a, a-c: c, b-c: b -> one vote each
        let mc = MultiClassSvm::new(
            vec![
                linear_svm("a", "b", vec![1.0, 0.0], 0.0),
                linear_svm("a", "c", vec![0.0, 1.0], 0.0),
                linear_svm("b", "c", vec![0.0, -1.0], 0.0),
            ],
            labels(&["a", "b", "c"]),
            BTreeMap::new(),
        );
        let tie = mc
            .classify(&Observation::new(vec![-1.0, 1.0]))
            .expect_err("three-way tie");
        assert_eq!(tie.labels, vec!["a", "b", "c"]);
        assert_eq!(tie.votes, 1);
    }

    #[test]
    fn test_score_excludes_ties() {
        let mc = MultiClassSvm::new(
            vec![
                linear_svm("a", "b", vec![1.0, 0.0], 0.0),
                linear_svm("a", "c", vec![0.0, 1.0], 0.0),
                linear_svm("b", "c", vec![0.0, -1.0], 0.0),
            ],
            labels(&["a", "b", "c"]),
            BTreeMap::new(),
        );
        let observations = vec![
            obs("a", vec![-1.0, -1.0], 0), // a-b: a, a-c: a, b-c: c -> a
            obs("b", vec![1.0, -1.0], 1),  // a-b: b, a-c: a, b-c: c -> tie
            obs("c", vec![-1.0, 1.0], 2),  // a-b: a, a-c: c, b-c: b -> tie
            obs("c", vec![1.0, -1.0], 3),  // tie, as above
        ];

        let evaluation = mc.evaluate(&observations);
        assert_eq!(evaluation.classified, 1);
        assert_eq!(evaluation.correct, 1);
        assert_eq!(evaluation.ties.len(), 3);
        assert_eq!(evaluation.ties[0].dataset_index, 1);
        // ties leave both numerator and denominator
        assert_relative_eq!(mc.score(&observations), 1.0);
    }

    #[test]
    fn test_set_accuracy_per_label() {
        let mut mc = three_class();
        let observations = vec![
            obs("c", vec![1.0, 1.0], 0),   // c
            obs("a", vec![-1.0, -1.0], 1), // a
            obs("a", vec![1.0, 1.0], 2),   // c, wrong
            obs("b", vec![1.0, -1.0], 3),  // a-b: b, a-c: a, b-c: b -> b
        ];
        mc.set_accuracy(&observations);

        assert_relative_eq!(mc.accuracy(), 0.75);
        assert_relative_eq!(mc.label_accuracy()["a"], 0.5);
        assert_relative_eq!(mc.label_accuracy()["b"], 1.0);
        assert_relative_eq!(mc.label_accuracy()["c"], 1.0);
    }

    #[test]
    fn test_all_ties_scores_zero() {
        let mc = MultiClassSvm::new(
            vec![
                linear_svm("a", "b", vec![1.0, 0.0], 0.0),
                linear_svm("a", "c", vec![0.0, 1.0], 0.0),
                linear_svm("b", "c", vec![0.0, -1.0], 0.0),
            ],
            labels(&["a", "b", "c"]),
            BTreeMap::new(),
        );
        let observations = vec![obs("c", vec![-1.0, 1.0], 0)];
        assert_eq!(mc.score(&observations), 0.0);
    }
}
