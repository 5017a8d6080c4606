//! Stratified K-fold splitting

use crate::core::{Label, LabeledObservation, Result, SvmError};
use std::collections::BTreeMap;

/// One train/test split of a K-fold partition
#[derive(Debug, Clone)]
pub struct FoldSplit {
    pub fold: usize,
    pub train: Vec<LabeledObservation>,
    pub test: Vec<LabeledObservation>,
}

/// Deterministic stratified K-fold divider
///
/// Within each label the n-th observation (in input order) lands in the
/// test part of fold `n % k`, so every fold keeps the class proportions of
/// the input. No shuffling takes place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KFoldDivider {
    k: usize,
}

impl KFoldDivider {
    pub fn new(k: usize) -> Result<Self> {
        if k < 2 {
            return Err(SvmError::InvalidParameter(format!(
                "fold count must be at least 2, got {k}"
            )));
        }
        Ok(Self { k })
    }

    pub fn fold_count(&self) -> usize {
        self.k
    }

    /// The train/test split for one fold, both halves in input order
    pub fn split(&self, observations: &[LabeledObservation], fold: usize) -> FoldSplit {
        let mut seen: BTreeMap<&Label, usize> = BTreeMap::new();
        let mut train = Vec::new();
        let mut test = Vec::new();
        for o in observations {
            let n = seen.entry(&o.label).or_insert(0);
            if *n % self.k == fold {
                test.push(o.clone());
            } else {
                train.push(o.clone());
            }
            *n += 1;
        }
        FoldSplit { fold, train, test }
    }

    /// Every fold in order
    pub fn splits<'a>(
        &'a self,
        observations: &'a [LabeledObservation],
    ) -> impl Iterator<Item = FoldSplit> + 'a {
        (0..self.k).map(move |fold| self.split(observations, fold))
    }
}
