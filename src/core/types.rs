//! Core type definitions for labeled observations, features and hyperparameters

use crate::core::{Result, SvmError};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Class name attached to an observation
pub type Label = String;

/// Distinct labels of a dataset, iterated in sorted order
pub type LabelSet = BTreeSet<Label>;

/// Hyperparameter name to value, e.g. `{"smoc": 1.0, "gamma": 0.1}`
pub type ParameterMap = BTreeMap<String, f64>;

/// Candidate values for one hyperparameter, tried in the order given
pub type ParameterRange = Vec<f64>;

/// Hyperparameter name to its candidate values
pub type ParameterRangeMap = BTreeMap<String, ParameterRange>;

/// Kernel name to the ranges of its hyperparameters
pub type KernelParameterRangeMap = BTreeMap<String, ParameterRangeMap>;

/// Dense, fixed-length feature vector
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    values: Vec<f64>,
}

impl Observation {
    /// Create a new observation from its feature values
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Feature values in column order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value of a single feature
    ///
    /// # Panics
    /// Panics if index >= len()
    pub fn get(&self, index: usize) -> f64 {
        self.values[index]
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the observation has no features
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Dot product with another observation of the same length
    pub fn dot(&self, other: &Observation) -> f64 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(x, y)| x * y)
            .sum()
    }

    /// Squared Euclidean distance to another observation
    pub fn squared_distance(&self, other: &Observation) -> f64 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum()
    }

    /// Copy of this observation without the given feature columns
    fn without_columns(&self, removed: &BTreeSet<usize>) -> Self {
        let values = self
            .values
            .iter()
            .enumerate()
            .filter(|(i, _)| !removed.contains(i))
            .map(|(_, &v)| v)
            .collect();
        Self { values }
    }
}

impl From<Vec<f64>> for Observation {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

/// An observation together with its label and its position in the full dataset
///
/// The observation itself is shared: fold splits and two-class restrictions
/// clone the handle, never the feature values.
#[derive(Clone, Debug)]
pub struct LabeledObservation {
    pub label: Label,
    pub observation: Arc<Observation>,
    /// Unique index into the original dataset, used as kernel cache key
    pub dataset_index: usize,
}

impl LabeledObservation {
    pub fn new(label: impl Into<Label>, observation: Observation, dataset_index: usize) -> Self {
        Self {
            label: label.into(),
            observation: Arc::new(observation),
            dataset_index,
        }
    }
}

/// Collect the distinct labels of a set of observations
pub fn label_set(observations: &[LabeledObservation]) -> LabelSet {
    observations.iter().map(|o| o.label.clone()).collect()
}

/// Keep only the observations whose label belongs to the pair
pub fn restrict_to_pair(observations: &[LabeledObservation], pair: &LabelPair) -> Vec<LabeledObservation> {
    observations
        .iter()
        .filter(|o| pair.contains(&o.label))
        .cloned()
        .collect()
}

/// Two distinct labels in canonical (sorted) order
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LabelPair {
    first: Label,
    second: Label,
}

impl LabelPair {
    /// Create a label pair; the labels are stored sorted
    pub fn new(a: impl Into<Label>, b: impl Into<Label>) -> Result<Self> {
        let (a, b) = (a.into(), b.into());
        if a == b {
            return Err(SvmError::InvalidParameter(format!(
                "label pair needs two distinct labels, got '{a}' twice"
            )));
        }
        Ok(if a < b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        })
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    pub fn contains(&self, label: &str) -> bool {
        self.first == label || self.second == label
    }
}

impl std::fmt::Display for LabelPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} vs {}", self.first, self.second)
    }
}

/// Every unordered pair of labels exactly once, ordered by the sorted label order
pub fn label_pairs(labels: &LabelSet) -> Vec<LabelPair> {
    let sorted: Vec<&Label> = labels.iter().collect();
    let mut pairs = Vec::with_capacity(sorted.len() * sorted.len().saturating_sub(1) / 2);
    for (i, first) in sorted.iter().enumerate() {
        for second in &sorted[i + 1..] {
            pairs.push(LabelPair {
                first: (*first).clone(),
                second: (*second).clone(),
            });
        }
    }
    pairs
}

/// A named column of the observation matrix
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feature {
    pub label: String,
    /// Dense column index, recomputed whenever a feature is removed
    pub index: usize,
}

impl Feature {
    pub fn new(label: impl Into<String>, index: usize) -> Self {
        Self {
            label: label.into(),
            index,
        }
    }
}

/// A feature tagged with the elimination round in which it was removed
#[derive(Clone, Debug, PartialEq)]
pub struct RankedFeature {
    pub feature: Feature,
    /// Elimination round, starting at 1; the survivor has the highest round
    pub round: usize,
}

impl RankedFeature {
    pub fn new(feature: Feature, round: usize) -> Self {
        Self { feature, round }
    }
}

/// Labeled observations plus the features that name their columns
#[derive(Clone, Debug)]
pub struct SvmDataset {
    observations: Vec<LabeledObservation>,
    features: Vec<Feature>,
}

impl SvmDataset {
    /// Create a dataset, checking every observation has one value per feature
    pub fn new(observations: Vec<LabeledObservation>, features: Vec<Feature>) -> Result<Self> {
        if observations.is_empty() {
            return Err(SvmError::EmptyDataset);
        }
        for o in &observations {
            if o.observation.len() != features.len() {
                return Err(SvmError::DimensionMismatch {
                    expected: features.len(),
                    actual: o.observation.len(),
                });
            }
        }
        let features = features
            .into_iter()
            .enumerate()
            .map(|(index, f)| Feature::new(f.label, index))
            .collect();
        Ok(Self {
            observations,
            features,
        })
    }

    /// Build a dataset from rows of `(label, values)`, naming features `feature1..n`
    pub fn from_rows<L: Into<Label>>(rows: Vec<(L, Vec<f64>)>) -> Result<Self> {
        let dim = rows.first().map(|(_, v)| v.len()).unwrap_or(0);
        let features = (0..dim)
            .map(|i| Feature::new(format!("feature{}", i + 1), i))
            .collect();
        let observations = rows
            .into_iter()
            .enumerate()
            .map(|(i, (label, values))| LabeledObservation::new(label, Observation::new(values), i))
            .collect();
        Self::new(observations, features)
    }

    pub fn observations(&self) -> &[LabeledObservation] {
        &self.observations
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn labels(&self) -> LabelSet {
        label_set(&self.observations)
    }

    /// Values of one feature column across all observations
    pub fn column(&self, index: usize) -> Vec<f64> {
        self.observations
            .iter()
            .map(|o| o.observation.get(index))
            .collect()
    }

    /// Replace every observation by `f(observation)`, keeping labels and dataset indices
    pub fn map_observations<F>(&mut self, mut f: F)
    where
        F: FnMut(&Observation) -> Observation,
    {
        for o in &mut self.observations {
            o.observation = Arc::new(f(&o.observation));
        }
    }

    /// Physically remove feature columns and re-index the remaining features densely
    pub fn remove_features(&mut self, indices: &[usize]) -> Result<()> {
        let removed: BTreeSet<usize> = indices.iter().copied().collect();
        if let Some(&bad) = removed.iter().find(|&&i| i >= self.features.len()) {
            return Err(SvmError::InvalidParameter(format!(
                "feature index {bad} out of range for {} features",
                self.features.len()
            )));
        }
        self.features = self
            .features
            .iter()
            .filter(|f| !removed.contains(&f.index))
            .enumerate()
            .map(|(index, f)| Feature::new(f.label.clone(), index))
            .collect();
        self.map_observations(|o| o.without_columns(&removed));
        Ok(())
    }
}
