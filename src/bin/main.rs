//! mcsvm Command Line Interface
//!
//! Trains one-vs-one multiclass SVMs and ranks features by recursive
//! feature elimination on labeled CSV tables.

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{error, info, warn};
use mcsvm::core::Result;
use mcsvm::utils::remove_low_std_features;
use mcsvm::{
    CancellationToken, CsvReader, KernelKind, ObservationTransform, OneVsOneMultiClassSvmTrainer, RfeReport,
    SvmDataset, SvmRfe, TrainerConfig, TrainingReport,
};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "mcsvm")]
#[command(about = "One-vs-one multiclass SVM training and feature ranking")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "mcsvm Contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a multiclass SVM with nested cross-validation
    Train(TrainingArgs),
    /// Rank features by recursive feature elimination
    Rfe(TrainingArgs),
}

#[derive(Args)]
struct TrainingArgs {
    /// Labeled data table (CSV, or tab-separated with a .tsv/.tab extension)
    #[arg(long)]
    data: PathBuf,

    /// Trainer configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Kernel to search; repeat for several (default: every kernel)
    #[arg(short, long = "kernel")]
    kernels: Vec<CliKernel>,

    /// Number of outer evaluation folds
    #[arg(long)]
    evaluation_folds: Option<usize>,

    /// Number of inner hyperparameter search folds
    #[arg(long)]
    train_folds: Option<usize>,

    /// Feature scaling applied before training
    #[arg(long)]
    transform: Option<CliTransform>,

    /// Drop features whose standard deviation is below this value
    #[arg(long)]
    std_threshold: Option<f64>,

    /// Train label pairs and grid points one at a time
    #[arg(long)]
    sequential: bool,

    /// Write the JSON report here
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliKernel {
    Linear,
    Rbf,
    Polynomial,
    Sigmoid,
}

impl From<CliKernel> for KernelKind {
    fn from(kernel: CliKernel) -> Self {
        match kernel {
            CliKernel::Linear => KernelKind::Linear,
            CliKernel::Rbf => KernelKind::Rbf,
            CliKernel::Polynomial => KernelKind::Polynomial,
            CliKernel::Sigmoid => KernelKind::Sigmoid,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliTransform {
    /// Scale every feature onto [0, 1]
    #[value(name = "zero-one")]
    ZeroOne,
    /// Standard score (Z-score) normalization
    #[value(name = "zero-mean")]
    ZeroMean,
}

impl From<CliTransform> for ObservationTransform {
    fn from(transform: CliTransform) -> Self {
        match transform {
            CliTransform::ZeroOne => ObservationTransform::ZeroOne,
            CliTransform::ZeroMean => ObservationTransform::ZeroMeanUnitVariance,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let cancel = CancellationToken::new();
    if let Err(e) = cancel_on_interrupt(cancel.clone()) {
        warn!("Ctrl-C handler not installed: {e}");
    }

    let result = match cli.command {
        Commands::Train(args) => train_command(args, cancel),
        Commands::Rfe(args) => rfe_command(args, cancel),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Cancel `token` on the first Ctrl-C; training stops at its next poll
fn cancel_on_interrupt(token: CancellationToken) -> std::io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    std::thread::Builder::new()
        .name("ctrl-c".to_string())
        .spawn(move || {
            runtime.block_on(async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, stopping training");
                    token.cancel();
                }
            })
        })?;
    Ok(())
}

fn train_command(args: TrainingArgs, cancel: CancellationToken) -> Result<()> {
    let config = load_config(&args)?;
    let dataset = load_dataset(&args)?;

    let trainer = OneVsOneMultiClassSvmTrainer::from_config(&config).with_cancellation(cancel);
    let Some(model) = trainer.train(dataset.observations())? else {
        warn!("Training cancelled");
        return Ok(());
    };
    info!("Training completed successfully");

    let report = TrainingReport::new(&config, &dataset, &model);
    report.print_summary();
    if let Some(output) = &args.output {
        report.save_to_file(output)?;
        info!("Report saved to: {output:?}");
    }
    Ok(())
}

fn rfe_command(args: TrainingArgs, cancel: CancellationToken) -> Result<()> {
    let config = load_config(&args)?;
    let dataset = load_dataset(&args)?;

    let rfe = SvmRfe::new(
        OneVsOneMultiClassSvmTrainer::from_config(&config).with_cancellation(cancel),
    );
    let Some(ranking) = rfe.rank(&dataset)? else {
        warn!("Feature elimination cancelled");
        return Ok(());
    };
    info!("Ranked {} features", ranking.len());

    let report = RfeReport::new(&config, &dataset, &ranking);
    report.print_summary();
    if let Some(output) = &args.output {
        report.save_to_file(output)?;
        info!("Report saved to: {output:?}");
    }
    Ok(())
}

/// Configuration file (or defaults) overridden by command-line flags
fn load_config(args: &TrainingArgs) -> Result<TrainerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {path:?}");
            TrainerConfig::from_json_file(path)?
        }
        None => TrainerConfig::default(),
    };

    let kernels: Vec<KernelKind> = args.kernels.iter().map(|&k| k.into()).collect();
    config.select_kernels(&kernels);
    if let Some(folds) = args.evaluation_folds {
        config.evaluation_fold_count = folds;
    }
    if let Some(folds) = args.train_folds {
        config.train_fold_count = folds;
    }
    if args.sequential {
        config.parallel = false;
    }
    config.validate()?;
    Ok(config)
}

fn load_dataset(args: &TrainingArgs) -> Result<SvmDataset> {
    info!("Loading data from: {:?}", args.data);
    let mut dataset = CsvReader::new()
        .with_delimiter(detect_delimiter(&args.data))
        .from_file(&args.data)?;
    info!(
        "Loaded {} observations with {} features and {} labels",
        dataset.len(),
        dataset.feature_count(),
        dataset.labels().len()
    );

    if let Some(threshold) = args.std_threshold {
        let removed = remove_low_std_features(&mut dataset, threshold)?;
        info!(
            "Removed {} features with standard deviation below {threshold}",
            removed.len()
        );
    }
    if let Some(transform) = args.transform {
        let transform: ObservationTransform = transform.into();
        info!("Using feature scaling: {transform}");
        transform.apply_to(&mut dataset);
    }
    Ok(dataset)
}

fn detect_delimiter(path: &Path) -> char {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("tsv") | Some("tab") => '\t',
        _ => ',',
    }
}
