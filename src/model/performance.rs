//! Two-class performance summary against a held-out set

use crate::core::{LabeledObservation, Result, SvmError};
use crate::model::Svm;
use serde::Serialize;

/// Confusion counts and derived metrics of a two-class SVM
///
/// The positive class is the label the SVM maps to +1.0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SvmPerformanceSummary {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_negatives: usize,
    pub precision: f64,
    pub recall: f64,
    pub f: f64,
    pub accuracy: f64,
}

impl SvmPerformanceSummary {
    /// Score `svm` on `observations`
    ///
    /// Every actual label must be one of the SVM's two classes; anything else
    /// is reported as [`SvmError::UnexpectedLabel`].
    pub fn new(svm: &Svm, observations: &[LabeledObservation]) -> Result<Self> {
        let classes = svm.class_to_label();
        let mut tp = 0;
        let mut fp = 0;
        let mut fn_ = 0;
        let mut tn = 0;

        for o in observations {
            let actual_positive = match classes.numeric_for(&o.label) {
                Some(numeric) => numeric > 0.0,
                None => {
                    return Err(SvmError::UnexpectedLabel {
                        label: o.label.clone(),
                        negative: classes.negative().to_string(),
                        positive: classes.positive().to_string(),
                    })
                }
            };
            let predicted_positive = svm.classify(&o.observation) == classes.positive();
            match (predicted_positive, actual_positive) {
                (true, true) => tp += 1,
                (true, false) => fp += 1,
                (false, true) => fn_ += 1,
                (false, false) => tn += 1,
            }
        }

        Ok(Self::from_counts(tp, fp, fn_, tn))
    }

    /// Derive precision, recall, F1 and accuracy from confusion counts
    ///
    /// Every ratio with a zero denominator is 0, never NaN.
    pub fn from_counts(tp: usize, fp: usize, fn_: usize, tn: usize) -> Self {
        let ratio = |num: usize, den: usize| {
            if den == 0 {
                0.0
            } else {
                num as f64 / den as f64
            }
        };
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        Self {
            true_positives: tp,
            false_positives: fp,
            false_negatives: fn_,
            true_negatives: tn,
            precision,
            recall,
            f,
            accuracy: ratio(tp + tn, tp + tn + fp + fn_),
        }
    }
}
