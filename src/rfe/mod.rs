//! Recursive feature elimination with linear SVMs
//!
//! Each round trains a one-vs-one model with the linear kernel, scores every
//! remaining feature by the sum over all pairwise SVMs of its squared primal
//! weight, and eliminates the lowest-scoring quarter (rounded up).

use crate::core::{
    Feature, KernelParameterRangeMap, ParameterRangeMap, RankedFeature, Result, SvmDataset,
};
use crate::kernel::LinearKernel;
use crate::model::MultiClassSvm;
use crate::trainer::OneVsOneMultiClassSvmTrainer;

/// Features in elimination order: the front was removed first, the last
/// entry is the final survivor
pub type RankedFeatureList = Vec<RankedFeature>;

/// Recursive feature elimination driver
#[derive(Clone)]
pub struct SvmRfe {
    trainer: OneVsOneMultiClassSvmTrainer,
}

impl SvmRfe {
    /// Wrap a trainer, restricting it to the linear kernel
    ///
    /// Linear ranges configured on the trainer are kept; other kernels are dropped.
    pub fn new(trainer: OneVsOneMultiClassSvmTrainer) -> Self {
        let linear = trainer
            .kernel_ranges()
            .get(LinearKernel::NAME)
            .cloned()
            .unwrap_or_else(ParameterRangeMap::new);
        let trainer = trainer.with_kernel_ranges(KernelParameterRangeMap::from([(
            LinearKernel::NAME.to_string(),
            linear,
        )]));
        Self { trainer }
    }

    pub fn trainer(&self) -> &OneVsOneMultiClassSvmTrainer {
        &self.trainer
    }

    /// Rank every feature of `dataset`
    ///
    /// Ranked features carry their column index in `dataset`. Returns
    /// `Ok(None)` if cancelled between or during rounds.
    pub fn rank(&self, dataset: &SvmDataset) -> Result<Option<RankedFeatureList>> {
        let reporter = self.trainer.reporter();
        let cancel = self.trainer.cancellation();

        let mut dataset = dataset.clone();
        let mut original: Vec<Feature> = dataset.features().to_vec();
        let mut ranked = RankedFeatureList::with_capacity(original.len());
        let mut round = 0;

        while dataset.feature_count() > 1 {
            if cancel.is_cancelled() {
                reporter.info("feature elimination cancelled");
                return Ok(None);
            }
            round += 1;

            let Some(model) = self.trainer.train(dataset.observations())? else {
                return Ok(None);
            };
            let criteria = ranking_criteria(&model, dataset.feature_count());

            let mut order: Vec<usize> = (0..criteria.len()).collect();
            order.sort_by(|&a, &b| criteria[a].total_cmp(&criteria[b]));
            let eliminated = &order[..criteria.len().div_ceil(4)];

            for &i in eliminated {
                reporter.debug(&format!(
                    "round {round}: eliminating '{}' (criterion {:.6})",
                    original[i].label, criteria[i]
                ));
                ranked.push(RankedFeature::new(original[i].clone(), round));
            }
            reporter.info(&format!(
                "round {round}: eliminated {} of {} features, accuracy {:.4}",
                eliminated.len(),
                criteria.len(),
                model.accuracy()
            ));

            dataset.remove_features(eliminated)?;
            let mut position = 0;
            original.retain(|_| {
                let keep = !eliminated.contains(&position);
                position += 1;
                keep
            });
        }

        if let Some(survivor) = original.pop() {
            ranked.push(RankedFeature::new(survivor, round + 1));
        }
        Ok(Some(ranked))
    }
}

/// Σ over the pairwise SVMs of the squared linear weight of each feature
pub fn ranking_criteria(model: &MultiClassSvm, feature_count: usize) -> Vec<f64> {
    let mut criteria = vec![0.0; feature_count];
    for svm in model.svms() {
        for (c, w) in criteria.iter_mut().zip(svm.linear_weights()) {
            *c += w * w;
        }
    }
    criteria
}
