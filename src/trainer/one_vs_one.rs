//! One-vs-one multiclass training with nested cross-validation
//!
//! The outer K-fold loop holds out an evaluation fold; everything else is
//! the development set. For every label pair, hyperparameters are chosen by
//! an inner K-fold over the two-class development set, the winning
//! configuration is retrained on that set, and the resulting multiclass
//! model is scored on the evaluation fold. The best outer candidate wins.

use crate::cache::KernelFunctionCache;
use crate::config::TrainerConfig;
use crate::core::{
    label_pairs, label_set, restrict_to_pair, CancellationToken, KernelParameterRangeMap,
    LabelPair, LabelSet, LabeledObservation, LogReporter, ParameterMap, ParameterRange,
    ParameterRangeMap, Reporter, Result, SvmError,
};
use crate::kernel::{KernelFunction, KernelKind};
use crate::model::{MultiClassSvm, Svm, SvmPerformanceSummary};
use crate::solver::{SmoConfig, SmoTrainer};
use crate::trainer::grid::ParameterGrid;
use crate::trainer::kfold::KFoldDivider;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Default number of outer (evaluation) folds
pub const DEFAULT_EVALUATION_FOLD_COUNT: usize = 3;

/// Default number of inner (hyperparameter search) folds
pub const DEFAULT_TRAIN_FOLD_COUNT: usize = 5;

/// Default kernel cache budget in bytes
pub const DEFAULT_CACHE_SIZE: usize = 100 * 1024 * 1024;

/// Validate a kernel range map and complete it with defaults
///
/// An empty map selects every kernel. Each listed kernel starts from its
/// default ranges, which the given ranges override, and receives the
/// trainer's `smoc` range unless one is given. Unknown kernel names and
/// parameters are rejected.
pub fn resolve_kernel_ranges(
    ranges: &KernelParameterRangeMap,
    c_range: &ParameterRange,
) -> Result<Vec<(KernelKind, ParameterRangeMap)>> {
    let requested: KernelParameterRangeMap = if ranges.is_empty() {
        KernelKind::ALL
            .iter()
            .map(|kind| (kind.name().to_string(), ParameterRangeMap::new()))
            .collect()
    } else {
        ranges.clone()
    };

    let mut resolved = Vec::with_capacity(requested.len());
    for (name, overrides) in &requested {
        let kind: KernelKind = name.parse()?;
        let mut kernel_ranges = kind.default_parameter_ranges();
        for (parameter, range) in overrides {
            if parameter != SmoTrainer::C && !kind.parameter_names().contains(&parameter.as_str())
            {
                return Err(SvmError::InvalidParameter(format!(
                    "kernel '{name}' has no parameter '{parameter}'"
                )));
            }
            if range.is_empty() {
                return Err(SvmError::InvalidParameter(format!(
                    "empty range for '{parameter}' of kernel '{name}'"
                )));
            }
            kernel_ranges.insert(parameter.clone(), range.clone());
        }
        kernel_ranges
            .entry(SmoTrainer::C.to_string())
            .or_insert_with(|| c_range.clone());
        resolved.push((kind, kernel_ranges));
    }
    Ok(resolved)
}

/// Trainer for [`MultiClassSvm`] models
///
/// # Example
///
/// ```no_run
/// use mcsvm::core::{KernelParameterRangeMap, SvmDataset};
/// use mcsvm::trainer::OneVsOneMultiClassSvmTrainer;
///
/// # fn main() -> mcsvm::core::Result<()> {
/// let dataset = SvmDataset::from_rows(vec![
///     ("a", vec![0.0, 1.0]),
///     ("b", vec![1.0, 0.0]),
///     // ...
/// ])?;
/// let trainer = OneVsOneMultiClassSvmTrainer::new(KernelParameterRangeMap::new())
///     .with_evaluation_fold_count(3)
///     .with_train_fold_count(5);
/// if let Some(model) = trainer.train(dataset.observations())? {
///     println!("accuracy {:.3}", model.accuracy());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct OneVsOneMultiClassSvmTrainer {
    kernel_ranges: KernelParameterRangeMap,
    smo: SmoConfig,
    evaluation_fold_count: usize,
    train_fold_count: usize,
    cache_size: usize,
    parallel: bool,
    reporter: Arc<dyn Reporter>,
    cancel: CancellationToken,
}

impl OneVsOneMultiClassSvmTrainer {
    /// Create a trainer searching the given kernels; an empty map means every kernel
    pub fn new(kernel_ranges: KernelParameterRangeMap) -> Self {
        Self {
            kernel_ranges,
            smo: SmoConfig::default(),
            evaluation_fold_count: DEFAULT_EVALUATION_FOLD_COUNT,
            train_fold_count: DEFAULT_TRAIN_FOLD_COUNT,
            cache_size: DEFAULT_CACHE_SIZE,
            parallel: true,
            reporter: Arc::new(LogReporter),
            cancel: CancellationToken::new(),
        }
    }

    pub fn from_config(config: &TrainerConfig) -> Self {
        Self::new(config.kernels.clone())
            .with_smo_config(config.smo.clone())
            .with_evaluation_fold_count(config.evaluation_fold_count)
            .with_train_fold_count(config.train_fold_count)
            .with_cache_size(config.cache_size)
            .with_parallel(config.parallel)
    }

    pub fn with_kernel_ranges(mut self, kernel_ranges: KernelParameterRangeMap) -> Self {
        self.kernel_ranges = kernel_ranges;
        self
    }

    pub fn with_smo_config(mut self, smo: SmoConfig) -> Self {
        self.smo = smo;
        self
    }

    pub fn with_evaluation_fold_count(mut self, count: usize) -> Self {
        self.evaluation_fold_count = count;
        self
    }

    pub fn with_train_fold_count(mut self, count: usize) -> Self {
        self.train_fold_count = count;
        self
    }

    /// Memory budget of each kernel cache, in bytes
    pub fn with_cache_size(mut self, bytes: usize) -> Self {
        self.cache_size = bytes;
        self
    }

    /// Schedule label pairs and grid points on the rayon pool
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn kernel_ranges(&self) -> &KernelParameterRangeMap {
        &self.kernel_ranges
    }

    pub fn evaluation_fold_count(&self) -> usize {
        self.evaluation_fold_count
    }

    pub fn train_fold_count(&self) -> usize {
        self.train_fold_count
    }

    pub fn reporter(&self) -> Arc<dyn Reporter> {
        Arc::clone(&self.reporter)
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// The kernels and full hyperparameter ranges this trainer searches
    pub fn resolved_kernel_ranges(&self) -> Result<Vec<(KernelKind, ParameterRangeMap)>> {
        resolve_kernel_ranges(&self.kernel_ranges, &self.smo.c_range)
    }

    /// Train the best multiclass model over the outer folds
    ///
    /// Every label needs at least two observations so that it appears in
    /// every development set. Returns `Ok(None)` if cancelled.
    pub fn train(&self, observations: &[LabeledObservation]) -> Result<Option<MultiClassSvm>> {
        let labels = label_set(observations);
        if labels.len() < 2 {
            return Err(SvmError::InvalidLabelCount {
                expected: 2,
                found: labels.len(),
            });
        }
        for label in &labels {
            let count = observations.iter().filter(|o| &o.label == label).count();
            if count < 2 {
                return Err(SvmError::InvalidParameter(format!(
                    "label '{label}' has {count} observation(s); at least 2 are required"
                )));
            }
        }
        let ranges = self.resolved_kernel_ranges()?;
        let divider = KFoldDivider::new(self.evaluation_fold_count)?;
        // inner fold count is checked up front, not once per grid point
        KFoldDivider::new(self.train_fold_count)?;

        self.reporter.info(&format!(
            "training {} label pairs over {} observations with {} evaluation folds",
            label_pairs(&labels).len(),
            observations.len(),
            self.evaluation_fold_count
        ));

        let mut best: Option<MultiClassSvm> = None;
        for split in divider.splits(observations) {
            if self.cancel.is_cancelled() {
                self.reporter.info("training cancelled");
                return Ok(None);
            }
            self.reporter.info(&format!(
                "evaluation fold {}/{}: {} development, {} evaluation observations",
                split.fold + 1,
                self.evaluation_fold_count,
                split.train.len(),
                split.test.len()
            ));

            let Some(mut candidate) = self.train_fold(&split.train, &split.test, &labels, &ranges)?
            else {
                self.reporter.info("training cancelled");
                return Ok(None);
            };

            let evaluation = candidate.set_accuracy(&split.test);
            for tied in &evaluation.ties {
                self.reporter.debug(&format!(
                    "observation {} excluded from scoring: {}",
                    tied.dataset_index, tied.tie
                ));
            }
            self.reporter.info(&format!(
                "evaluation fold {} multiclass accuracy {:.4} ({} ties)",
                split.fold + 1,
                candidate.accuracy(),
                evaluation.ties.len()
            ));

            let improves = best
                .as_ref()
                .map_or(true, |current| candidate.accuracy() > current.accuracy());
            if improves {
                best = Some(candidate);
            }
        }
        Ok(best)
    }

    /// Build one multiclass candidate from a development/evaluation split
    fn train_fold(
        &self,
        development: &[LabeledObservation],
        evaluation: &[LabeledObservation],
        labels: &LabelSet,
        ranges: &[(KernelKind, ParameterRangeMap)],
    ) -> Result<Option<MultiClassSvm>> {
        let pairs = label_pairs(labels);
        let results = self.map(&pairs, |pair| {
            self.train_label_pair(development, evaluation, pair, ranges)
        });

        let mut svms = Vec::with_capacity(pairs.len());
        let mut performance = BTreeMap::new();
        for (pair, result) in pairs.into_iter().zip(results) {
            let Some((svm, summary)) = result? else {
                return Ok(None);
            };
            svms.push(svm);
            performance.insert(pair, summary);
        }
        Ok(Some(MultiClassSvm::new(svms, labels.clone(), performance)))
    }

    /// Grid search, retrain and evaluate a single label pair
    fn train_label_pair(
        &self,
        development: &[LabeledObservation],
        evaluation: &[LabeledObservation],
        pair: &LabelPair,
        ranges: &[(KernelKind, ParameterRangeMap)],
    ) -> Result<Option<(Svm, SvmPerformanceSummary)>> {
        if self.cancel.is_cancelled() {
            return Ok(None);
        }
        let development = restrict_to_pair(development, pair);
        let evaluation = restrict_to_pair(evaluation, pair);

        let candidates: Vec<(KernelKind, ParameterMap)> = ranges
            .iter()
            .flat_map(|(kind, kernel_ranges)| {
                ParameterGrid::new(kernel_ranges).map(move |point| (*kind, point))
            })
            .collect();
        self.reporter.debug(&format!(
            "{pair}: searching {} hyperparameter combinations",
            candidates.len()
        ));

        let scores = self.map(&candidates, |(kind, parameters)| {
            self.train_on_k_folds(*kind, parameters, &development)
        });

        let mut best: Option<(KernelKind, &ParameterMap)> = None;
        let mut best_score = 0.0;
        for ((kind, parameters), score) in candidates.iter().zip(scores) {
            let Some(score) = self.report_failure(pair, *kind, parameters, score)? else {
                return Ok(None);
            };
            self.reporter
                .debug(&format!("{pair}: {kind} {parameters:?} mean score {score:.4}"));
            if score > best_score {
                best_score = score;
                best = Some((*kind, parameters));
            }
        }

        let Some((kind, parameters)) = best else {
            self.reporter.info(&format!(
                "failed to train SVM for {pair}: no hyperparameters scored above 0"
            ));
            return Err(SvmError::LabelPairTrainingFailed {
                first: pair.first().to_string(),
                second: pair.second().to_string(),
            });
        };
        self.reporter.info(&format!(
            "{pair}: best {kind} {parameters:?} with mean score {best_score:.4}"
        ));

        let retrained = self.retrain(kind, parameters, &development, &evaluation);
        self.report_failure(pair, kind, parameters, retrained)
    }

    /// Train the winning configuration on the whole development set and
    /// summarize it on the evaluation set
    fn retrain(
        &self,
        kind: KernelKind,
        parameters: &ParameterMap,
        development: &[LabeledObservation],
        evaluation: &[LabeledObservation],
    ) -> Result<Option<(Svm, SvmPerformanceSummary)>> {
        let mut cache = KernelFunctionCache::with_memory_limit(
            configured_kernel(kind, parameters)?,
            development,
            self.cache_size,
        );
        let Some(svm) = self
            .smo_trainer(parameters)?
            .train(&mut cache, development, &self.cancel)?
        else {
            return Ok(None);
        };
        let summary = SvmPerformanceSummary::new(&svm, evaluation)?;
        Ok(Some((svm, summary)))
    }

    /// Log an error with the label pair and hyperparameters that caused it
    fn report_failure<T>(
        &self,
        pair: &LabelPair,
        kind: KernelKind,
        parameters: &ParameterMap,
        result: Result<T>,
    ) -> Result<T> {
        result.map_err(|e| {
            self.reporter.info(&format!(
                "failed to train SVM for {pair} with {kind} {parameters:?}: {e}"
            ));
            e
        })
    }

    /// Mean two-class score of one hyperparameter combination over the inner folds
    ///
    /// Folds whose test part is empty, or whose training part lacks one of the
    /// two classes, are skipped; with no usable fold the score is 0.
    pub fn train_on_k_folds(
        &self,
        kind: KernelKind,
        parameters: &ParameterMap,
        observations: &[LabeledObservation],
    ) -> Result<Option<f64>> {
        if self.cancel.is_cancelled() {
            return Ok(None);
        }
        let divider = KFoldDivider::new(self.train_fold_count)?;
        let smo = self.smo_trainer(parameters)?;
        let mut cache = KernelFunctionCache::with_memory_limit(
            configured_kernel(kind, parameters)?,
            observations,
            self.cache_size,
        );

        let mut total = 0.0;
        let mut folds = 0;
        for split in divider.splits(observations) {
            if split.test.is_empty() || label_set(&split.train).len() != 2 {
                continue;
            }
            match smo.train(&mut cache, &split.train, &self.cancel)? {
                Some(svm) => {
                    total += svm.score(&split.test);
                    folds += 1;
                }
                None => return Ok(None),
            }
        }
        Ok(Some(if folds == 0 {
            0.0
        } else {
            total / folds as f64
        }))
    }

    fn smo_trainer(&self, parameters: &ParameterMap) -> Result<SmoTrainer> {
        let mut smo = SmoTrainer::new(self.smo.clone()).with_reporter(Arc::clone(&self.reporter));
        smo.set_parameters(parameters)?;
        Ok(smo)
    }

    /// Apply `f` to every item, on the rayon pool when parallel, keeping input order
    fn map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        if self.parallel {
            items.par_iter().map(f).collect()
        } else {
            items.iter().map(f).collect()
        }
    }
}

/// A fresh kernel instance owned by one training task
fn configured_kernel(kind: KernelKind, parameters: &ParameterMap) -> Result<Arc<dyn KernelFunction>> {
    let mut kernel = kind.create();
    kernel.set_parameters(parameters)?;
    Ok(Arc::from(kernel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Observation, SilentReporter};
    use std::sync::Mutex;

    /// Keeps every info message
    #[derive(Default)]
    struct RecordingReporter {
        messages: Mutex<Vec<String>>,
    }

    impl Reporter for RecordingReporter {
        fn info(&self, message: &str) {
            if let Ok(mut messages) = self.messages.lock() {
                messages.push(message.to_string());
            }
        }

        fn debug(&self, _message: &str) {}
    }

    /// Three well separated clusters of six points each
    fn clusters() -> Vec<LabeledObservation> {
        let centers = [("a", -6.0, 0.0), ("b", 6.0, 0.0), ("c", 0.0, 8.0)];
        let mut observations = Vec::new();
        for i in 0..6 {
            for (label, cx, cy) in centers {
                let dx = (i % 3) as f64 * 0.5 - 0.5;
                let dy = (i / 3) as f64 * 0.5 - 0.25;
                let index = observations.len();
                observations.push(LabeledObservation::new(
                    label,
                    Observation::new(vec![cx + dx, cy + dy]),
                    index,
                ));
            }
        }
        observations
    }

    fn linear_only() -> KernelParameterRangeMap {
        KernelParameterRangeMap::from([(
            "linear".to_string(),
            ParameterRangeMap::from([
                ("constant".to_string(), vec![0.0, 1.0]),
                ("smoc".to_string(), vec![0.1, 1.0]),
            ]),
        )])
    }

    fn trainer() -> OneVsOneMultiClassSvmTrainer {
        OneVsOneMultiClassSvmTrainer::new(linear_only()).with_reporter(Arc::new(SilentReporter))
    }

    #[test]
    fn test_resolve_fills_defaults_and_smoc() {
        let c_range = vec![1.0, 10.0];
        let resolved = resolve_kernel_ranges(
            &KernelParameterRangeMap::from([(
                "rbf".to_string(),
                ParameterRangeMap::from([("gamma".to_string(), vec![0.5])]),
            )]),
            &c_range,
        )
        .unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].0, KernelKind::Rbf);
        assert_eq!(resolved[0].1["gamma"], vec![0.5]);
        assert_eq!(resolved[0].1["smoc"], c_range);
    }

    #[test]
    fn test_resolve_empty_selects_every_kernel_in_name_order() {
        let resolved =
            resolve_kernel_ranges(&KernelParameterRangeMap::new(), &vec![1.0]).unwrap();
        let names: Vec<&str> = resolved.iter().map(|(k, _)| k.name()).collect();
        assert_eq!(names, vec!["linear", "polynomial", "rbf", "sigmoid"]);
        for (kind, ranges) in &resolved {
            for name in kind.parameter_names() {
                assert!(ranges.contains_key(*name));
            }
            assert!(ranges.contains_key("smoc"));
        }
    }

    #[test]
    fn test_resolve_rejects_unknown_names() {
        let unknown_kernel =
            KernelParameterRangeMap::from([("gaussian".to_string(), ParameterRangeMap::new())]);
        assert!(matches!(
            resolve_kernel_ranges(&unknown_kernel, &vec![1.0]),
            Err(SvmError::UnknownKernel(_))
        ));

        let unknown_parameter = KernelParameterRangeMap::from([(
            "linear".to_string(),
            ParameterRangeMap::from([("gamma".to_string(), vec![1.0])]),
        )]);
        assert!(matches!(
            resolve_kernel_ranges(&unknown_parameter, &vec![1.0]),
            Err(SvmError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_train_separable_clusters() {
        let data = clusters();
        let model = trainer().train(&data).unwrap().unwrap();

        assert_eq!(model.svms().len(), 3);
        assert_eq!(model.performance().len(), 3);
        assert_eq!(model.accuracy(), 1.0);
        for accuracy in model.label_accuracy().values() {
            assert_eq!(*accuracy, 1.0);
        }
        for summary in model.performance().values() {
            assert_eq!(summary.accuracy, 1.0);
        }
        assert_eq!(model.score(&data), 1.0);
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let data = clusters();
        let parallel = trainer().with_parallel(true).train(&data).unwrap().unwrap();
        let sequential = trainer().with_parallel(false).train(&data).unwrap().unwrap();

        assert_eq!(parallel.accuracy(), sequential.accuracy());
        for (p, s) in parallel.svms().iter().zip(sequential.svms()) {
            assert_eq!(p.label_pair(), s.label_pair());
            assert_eq!(p.parameters(), s.parameters());
            assert_eq!(p.a(), s.a());
            assert_eq!(p.b(), s.b());
        }
    }

    #[test]
    fn test_train_on_k_folds_scores_separable_pair() {
        let data: Vec<LabeledObservation> = clusters()
            .into_iter()
            .filter(|o| o.label != "c")
            .collect();
        let parameters = ParameterMap::from([
            ("constant".to_string(), 0.0),
            ("smoc".to_string(), 1.0),
        ]);
        let score = trainer()
            .train_on_k_folds(KernelKind::Linear, &parameters, &data)
            .unwrap()
            .unwrap();
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_cancelled_training_returns_none() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = trainer().with_cancellation(cancel).train(&clusters()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_requires_two_labels() {
        let data: Vec<LabeledObservation> = clusters()
            .into_iter()
            .filter(|o| o.label == "a")
            .collect();
        assert!(matches!(
            trainer().train(&data),
            Err(SvmError::InvalidLabelCount { found: 1, .. })
        ));
    }

    #[test]
    fn test_pair_without_usable_folds_fails() {
        // Two observations per label: each development set keeps one per
        // label, so no inner fold has both classes to train on.
        let data = vec![
            LabeledObservation::new("x", Observation::new(vec![-1.0]), 0),
            LabeledObservation::new("y", Observation::new(vec![1.0]), 1),
            LabeledObservation::new("x", Observation::new(vec![-2.0]), 2),
            LabeledObservation::new("y", Observation::new(vec![2.0]), 3),
        ];
        let result = trainer().with_evaluation_fold_count(2).train(&data);
        assert!(matches!(
            result,
            Err(SvmError::LabelPairTrainingFailed { ref first, ref second })
                if first == "x" && second == "y"
        ));
    }

    #[test]
    fn test_single_observation_label_is_rejected() {
        let mut data = clusters();
        data.push(LabeledObservation::new("d", Observation::new(vec![0.0, -8.0]), 18));
        assert!(matches!(
            trainer().train(&data),
            Err(SvmError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_configuration_error_is_logged_with_pair_and_parameters() {
        let reporter = Arc::new(RecordingReporter::default());
        let ranges = KernelParameterRangeMap::from([(
            "linear".to_string(),
            ParameterRangeMap::from([
                ("constant".to_string(), vec![0.0]),
                ("smoc".to_string(), vec![-1.0]),
            ]),
        )]);
        let result = OneVsOneMultiClassSvmTrainer::new(ranges)
            .with_parallel(false)
            .with_reporter(reporter.clone())
            .train(&clusters());
        assert!(matches!(result, Err(SvmError::InvalidParameter(_))));

        let messages = reporter.messages.lock().unwrap();
        let failure = messages
            .iter()
            .find(|m| m.starts_with("failed to train SVM for"))
            .expect("failure is reported before escalating");
        assert!(failure.contains("linear"));
        assert!(failure.contains("\"smoc\": -1.0"));
        assert!(failure.contains("must be positive"));
    }
}
