//! Sequential Minimal Optimization (SMO) trainer
//!
//! Solves the two-class SVM dual problem in the signed form used by Bottou
//! and Lin: with `ya[k] = y[k]·a[k]` every variable lives in a box
//! `A[k] <= ya[k] <= B[k]`, and each iteration moves the maximal violating
//! pair `(i, j)` by the largest step `lambda` that keeps both in their boxes.

use crate::cache::KernelFunctionCache;
use crate::core::{
    label_set, CancellationToken, Label, LabelPair, LabeledObservation, LogReporter, ParameterMap,
    ParameterRange, ParameterRangeMap, Reporter, Result, SvmError,
};
use crate::model::{NumericClassToLabel, Svm};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Stopping rules and the box-constant search range of the SMO trainer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoConfig {
    /// Iteration cap; reaching it returns the current solution
    pub max_iterations: usize,
    /// Steps smaller than this end the optimization
    pub min_step: f64,
    /// Grid-search candidates for the box constant C (`smoc`)
    pub c_range: ParameterRange,
}

impl Default for SmoConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            min_step: 1e-4,
            c_range: vec![0.001, 0.01, 0.1, 1.0, 10.0, 100.0],
        }
    }
}

/// Two-class SVM trainer
///
/// The trainer is configured with its box constant `C` through
/// [`SmoTrainer::set_parameters`] (key `smoc`) and then trains against a
/// [`KernelFunctionCache`] that already holds a configured kernel.
#[derive(Clone)]
pub struct SmoTrainer {
    config: SmoConfig,
    c: f64,
    reporter: Arc<dyn Reporter>,
}

impl SmoTrainer {
    /// Parameter key of the box constant C
    pub const C: &'static str = "smoc";

    pub fn new(config: SmoConfig) -> Self {
        Self {
            config,
            c: 1.0,
            reporter: Arc::new(LogReporter),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn config(&self) -> &SmoConfig {
        &self.config
    }

    pub fn c(&self) -> f64 {
        self.c
    }

    /// Set the box constant; it must be positive and finite
    pub fn set_c(&mut self, c: f64) -> Result<()> {
        if !(c.is_finite() && c > 0.0) {
            return Err(SvmError::InvalidParameter(format!(
                "{} must be positive, got {c}",
                Self::C
            )));
        }
        self.c = c;
        Ok(())
    }

    /// Read `smoc` from a grid point; kernel keys are ignored
    pub fn set_parameters(&mut self, parameters: &ParameterMap) -> Result<()> {
        let c = parameters
            .get(Self::C)
            .copied()
            .ok_or_else(|| SvmError::InvalidParameter(format!("missing '{}'", Self::C)))?;
        self.set_c(c)
    }

    /// `{"smoc": c_range}`
    pub fn default_parameter_ranges(&self) -> ParameterRangeMap {
        ParameterRangeMap::from([(Self::C.to_string(), self.config.c_range.clone())])
    }

    /// Train a two-class SVM on `observations`
    ///
    /// Exactly two distinct labels are required. The lexicographically
    /// smaller label becomes the negative class. Returns `Ok(None)` when
    /// `cancel` is set before or during optimization.
    pub fn train(
        &self,
        cache: &mut KernelFunctionCache,
        observations: &[LabeledObservation],
        cancel: &CancellationToken,
    ) -> Result<Option<Svm>> {
        let labels: Vec<Label> = label_set(observations).into_iter().collect();
        let [negative, positive]: [Label; 2] =
            labels
                .try_into()
                .map_err(|labels: Vec<Label>| SvmError::InvalidLabelCount {
                    expected: 2,
                    found: labels.len(),
                })?;
        let class_to_label = NumericClassToLabel::new(LabelPair::new(negative, positive)?);

        let n = observations.len();
        let y: Vec<f64> = observations
            .iter()
            .map(|o| if o.label == class_to_label.positive() { 1.0 } else { -1.0 })
            .collect();
        let mut a = vec![0.0; n];
        let mut g = vec![1.0; n];
        let (lower, upper): (Vec<f64>, Vec<f64>) = y
            .iter()
            .map(|&yk| if yk > 0.0 { (0.0, self.c) } else { (-self.c, 0.0) })
            .unzip();

        let mut iterations = 0;
        loop {
            if cancel.is_cancelled() {
                self.reporter
                    .debug(&format!("SMO cancelled after {iterations} iterations"));
                return Ok(None);
            }
            if iterations >= self.config.max_iterations {
                self.reporter.debug(&format!(
                    "SMO reached the iteration cap of {} on {}; keeping current solution",
                    self.config.max_iterations,
                    class_to_label.label_pair()
                ));
                break;
            }
            iterations += 1;

            let (ya, yg) = signed(&y, &a, &g);
            let Some((i, j)) = working_pair(&ya, &yg, &lower, &upper) else {
                break;
            };
            if yg[i] <= yg[j] {
                break;
            }

            let (oi, oj) = (&observations[i], &observations[j]);
            let k_ii = cache.similarity(oi, oi);
            let k_jj = cache.similarity(oj, oj);
            let k_ij = cache.similarity(oi, oj);
            let eta = k_ii + k_jj - 2.0 * k_ij;
            let curvature_step = if eta > 0.0 {
                (yg[i] - yg[j]) / eta
            } else {
                f64::INFINITY
            };
            let lambda = (upper[i] - ya[i]).min(ya[j] - lower[j]).min(curvature_step);
            if lambda < self.config.min_step {
                break;
            }

            for (k, ok) in observations.iter().enumerate() {
                let k_ik = cache.similarity(oi, ok);
                let k_jk = cache.similarity(oj, ok);
                g[k] += y[k] * (-lambda * k_ik + lambda * k_jk);
            }
            a[i] += y[i] * lambda;
            a[j] -= y[j] * lambda;
        }

        let (ya, yg) = signed(&y, &a, &g);
        let b = bias(&ya, &yg, &lower, &upper);
        self.reporter.debug(&format!(
            "SMO on {} finished after {iterations} iterations, b = {b}",
            class_to_label.label_pair()
        ));

        let mut support_vectors = Vec::new();
        let mut sv_a = Vec::new();
        let mut sv_y = Vec::new();
        for ((o, &ak), &yk) in observations.iter().zip(&a).zip(&y) {
            if ak != 0.0 {
                support_vectors.push(o.clone());
                sv_a.push(ak);
                sv_y.push(yk);
            }
        }

        let kernel = cache.kernel();
        let mut parameters = kernel.parameters();
        parameters.insert(Self::C.to_string(), self.c);

        Svm::new(
            support_vectors,
            sv_a,
            sv_y,
            b,
            class_to_label,
            kernel,
            parameters,
        )
        .map(Some)
    }
}

impl Default for SmoTrainer {
    fn default() -> Self {
        Self::new(SmoConfig::default())
    }
}

/// `(y·a, y·g)` element-wise
fn signed(y: &[f64], a: &[f64], g: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let ya = y.iter().zip(a).map(|(yk, ak)| yk * ak).collect();
    let yg = y.iter().zip(g).map(|(yk, gk)| yk * gk).collect();
    (ya, yg)
}

/// Maximal violating pair: argmax yg with room to grow, argmin yg with room to shrink
///
/// The first index wins ties on both sides.
fn working_pair(ya: &[f64], yg: &[f64], lower: &[f64], upper: &[f64]) -> Option<(usize, usize)> {
    let mut i: Option<usize> = None;
    let mut j: Option<usize> = None;
    for k in 0..ya.len() {
        if ya[k] < upper[k] && i.map_or(true, |i| yg[k] > yg[i]) {
            i = Some(k);
        }
        if ya[k] > lower[k] && j.map_or(true, |j| yg[k] < yg[j]) {
            j = Some(k);
        }
    }
    i.zip(j)
}

/// Bias from the first free variable, else the midpoint of the final working pair
fn bias(ya: &[f64], yg: &[f64], lower: &[f64], upper: &[f64]) -> f64 {
    if let Some(k) = (0..ya.len()).find(|&k| lower[k] < ya[k] && ya[k] < upper[k]) {
        return yg[k];
    }
    match working_pair(ya, yg, lower, upper) {
        Some((i, j)) => (yg[i] + yg[j]) / 2.0,
        None => 0.0,
    }
}
