//! Serializable training and feature ranking reports
//!
//! Reports are written as pretty-printed JSON by the command-line front end.

use crate::config::TrainerConfig;
use crate::core::{Label, ParameterMap, Result, SvmDataset, SvmError};
use crate::model::{MultiClassSvm, SvmPerformanceSummary};
use crate::rfe::RankedFeatureList;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Provenance shared by every report
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Library version used to create the report
    pub library_version: String,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    pub config: TrainerConfig,
}

impl ReportMetadata {
    pub fn new(config: &TrainerConfig) -> Self {
        Self {
            library_version: crate::VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            config: config.clone(),
        }
    }
}

/// Shape of the input table
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub observations: usize,
    pub features: usize,
    /// Observation count per label
    pub labels: BTreeMap<Label, usize>,
}

impl DatasetSummary {
    pub fn new(dataset: &SvmDataset) -> Self {
        let mut labels = BTreeMap::new();
        for o in dataset.observations() {
            *labels.entry(o.label.clone()).or_insert(0) += 1;
        }
        Self {
            observations: dataset.len(),
            features: dataset.feature_count(),
            labels,
        }
    }
}

/// The selected two-class SVM of one label pair
#[derive(Debug, Clone, Serialize)]
pub struct PairReport {
    pub negative: Label,
    pub positive: Label,
    pub kernel: String,
    pub parameters: ParameterMap,
    pub support_vectors: usize,
    pub bias: f64,
    pub performance: Option<SvmPerformanceSummary>,
}

/// Outcome of one-vs-one training
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub metadata: ReportMetadata,
    pub dataset: DatasetSummary,
    pub accuracy: f64,
    pub label_accuracy: BTreeMap<Label, f64>,
    pub pairs: Vec<PairReport>,
}

impl TrainingReport {
    pub fn new(config: &TrainerConfig, dataset: &SvmDataset, model: &MultiClassSvm) -> Self {
        let pairs = model
            .svms()
            .iter()
            .map(|svm| PairReport {
                negative: svm.class_to_label().negative().to_string(),
                positive: svm.class_to_label().positive().to_string(),
                kernel: svm.kernel().name().to_string(),
                parameters: svm.parameters().clone(),
                support_vectors: svm.support_vectors().len(),
                bias: svm.b(),
                performance: model.performance_for(svm.label_pair()).copied(),
            })
            .collect();
        Self {
            metadata: ReportMetadata::new(config),
            dataset: DatasetSummary::new(dataset),
            accuracy: model.accuracy(),
            label_accuracy: model.label_accuracy().clone(),
            pairs,
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_json(self, path)
    }

    /// Print report summary
    pub fn print_summary(&self) {
        println!("=== One-vs-One SVM Training ===");
        println!(
            "Observations: {} ({} features, {} labels)",
            self.dataset.observations,
            self.dataset.features,
            self.dataset.labels.len()
        );
        println!("Multiclass accuracy: {:.4}", self.accuracy);
        for (label, accuracy) in &self.label_accuracy {
            println!("  {label}: {accuracy:.4}");
        }
        println!("Label pairs:");
        for pair in &self.pairs {
            let f = pair.performance.map(|p| p.f).unwrap_or(0.0);
            println!(
                "  {} vs {}: {} {:?}, {} support vectors, F1 {:.4}",
                pair.negative, pair.positive, pair.kernel, pair.parameters, pair.support_vectors, f
            );
        }
    }
}

/// One entry of a feature ranking
#[derive(Debug, Clone, Serialize)]
pub struct RankedFeatureEntry {
    pub feature: String,
    pub index: usize,
    pub round: usize,
}

/// Outcome of recursive feature elimination
#[derive(Debug, Clone, Serialize)]
pub struct RfeReport {
    pub metadata: ReportMetadata,
    pub dataset: DatasetSummary,
    /// First eliminated first; the last entry survived every round
    pub ranking: Vec<RankedFeatureEntry>,
}

impl RfeReport {
    pub fn new(config: &TrainerConfig, dataset: &SvmDataset, ranking: &RankedFeatureList) -> Self {
        Self {
            metadata: ReportMetadata::new(config),
            dataset: DatasetSummary::new(dataset),
            ranking: ranking
                .iter()
                .map(|r| RankedFeatureEntry {
                    feature: r.feature.label.clone(),
                    index: r.feature.index,
                    round: r.round,
                })
                .collect(),
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_json(self, path)
    }

    /// Print the ranking, most important feature first
    pub fn print_summary(&self) {
        println!("=== SVM Recursive Feature Elimination ===");
        println!(
            "Observations: {} ({} features)",
            self.dataset.observations, self.dataset.features
        );
        println!("{:>6} {:>6}  feature", "round", "index");
        for entry in self.ranking.iter().rev() {
            println!("{:>6} {:>6}  {}", entry.round, entry.index, entry.feature);
        }
    }
}

fn write_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value)
        .map_err(|e| SvmError::SerializationError(e.to_string()))
}
