mod enrich;
mod input;
mod logging;
mod model;
mod pipeline;
mod report;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use crate::enrich::{OraParams, OraRunner, PrerankParams, PrerankRunner};
use crate::input::CnmfDirLoader;
use crate::input::gmt::load_gene_set_library;
use crate::model::config::{EnrichmentVariant, PipelineConfig, TopHitPolicy};
use crate::pipeline::{PipelineError, PipelineReport, run_pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "kira-programenrich",
    version,
    about = "Per-program pathway enrichment of cNMF consensus programs"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank-based enrichment of each program's full gene score ranking
    Prerank(RunArgs),
    /// Over-representation analysis of each program's top genes
    Ora(RunArgs),
}

#[derive(Args, Debug, Clone, Default)]
struct RunArgs {
    /// cNMF output directory
    #[arg(long)]
    cnmf_dir: Option<PathBuf>,
    /// cNMF run name
    #[arg(long)]
    run_name: Option<String>,
    /// Number of programs (K) of the consensus run
    #[arg(short = 'k', long = "programs")]
    k: Option<usize>,
    #[arg(long)]
    density_threshold: Option<f64>,
    /// Gene set library name; read from <gene-set-dir>/<name>.gmt
    #[arg(long)]
    gene_sets: Option<String>,
    #[arg(long)]
    gene_set_dir: Option<PathBuf>,
    /// Output directory
    #[arg(long)]
    out: Option<PathBuf>,
    #[arg(long)]
    min_size: Option<usize>,
    #[arg(long)]
    max_size: Option<usize>,
    /// Raw p-value cutoff (ORA)
    #[arg(long)]
    cutoff: Option<f64>,
    /// Top genes per program submitted to ORA
    #[arg(long)]
    top_genes: Option<usize>,
    #[arg(long)]
    permutations: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    /// Prerank worker threads; 0 uses every core
    #[arg(long)]
    threads: Option<usize>,
    #[arg(long, value_enum)]
    top_hit: Option<TopHitPolicy>,
    /// Skip the aggregated raw results table
    #[arg(long)]
    no_raw_results: bool,
}

impl RunArgs {
    fn apply(self, config: &mut PipelineConfig) {
        if let Some(v) = self.cnmf_dir {
            config.cnmf_output_dir = v;
        }
        if let Some(v) = self.run_name {
            config.run_name = v;
        }
        if let Some(v) = self.k {
            config.program_count = v;
        }
        if let Some(v) = self.density_threshold {
            config.density_threshold = v;
        }
        if let Some(v) = self.gene_sets {
            config.gene_set_database = v;
        }
        if let Some(v) = self.gene_set_dir {
            config.gene_set_dir = v;
        }
        if let Some(v) = self.out {
            config.output_dir = v;
        }
        if let Some(v) = self.min_size {
            config.min_gene_set_size = v;
        }
        if let Some(v) = self.max_size {
            config.max_gene_set_size = v;
        }
        if let Some(v) = self.cutoff {
            config.significance_cutoff = v;
        }
        if let Some(v) = self.top_genes {
            config.top_gene_count = v;
        }
        if let Some(v) = self.permutations {
            config.permutation_count = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if let Some(v) = self.threads {
            config.threads = v;
        }
        if let Some(v) = self.top_hit {
            config.top_hit = v;
        }
        if self.no_raw_results {
            config.write_raw_results = false;
        }
    }
}

fn main() {
    logging::init_tracing();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn build_config(command: Command) -> PipelineConfig {
    let (variant, args) = match command {
        Command::Prerank(args) => (EnrichmentVariant::Prerank, args),
        Command::Ora(args) => (EnrichmentVariant::Ora, args),
    };
    let mut config = PipelineConfig::for_variant(variant);
    args.apply(&mut config);
    config
}

fn run(cli: Cli) -> Result<(), PipelineError> {
    let config = build_config(cli.command);
    config.validate()?;
    tracing::info!(
        "starting cNMF {} pipeline (run {}/{}, gene sets {})",
        config.variant.name(),
        config.cnmf_output_dir.display(),
        config.run_name,
        config.gene_set_database
    );

    let library = Arc::new(load_gene_set_library(
        &config.gene_set_database,
        &config.gene_set_path(),
    )?);
    tracing::debug!(
        "library {} provides {} gene sets",
        library.name,
        library.sets.len()
    );
    let loader = CnmfDirLoader::new(
        &config.cnmf_output_dir,
        config.run_name.clone(),
        config.top_gene_count,
    );

    let report = match config.variant {
        EnrichmentVariant::Prerank => {
            let runner = PrerankRunner::new(library, PrerankParams::from_config(&config))?;
            run_pipeline(&loader, &runner, &config)?
        }
        EnrichmentVariant::Ora => {
            let runner = OraRunner::new(library, OraParams::from_config(&config));
            tracing::debug!("ORA background: {} genes", runner.background_size());
            run_pipeline(&loader, &runner, &config)?
        }
    };
    log_report(&report);
    Ok(())
}

fn log_report(report: &PipelineReport) {
    tracing::info!(
        "pipeline complete: {} summary rows ({} with hits, {} empty, {} failed)",
        report.summary_rows,
        report.succeeded.len(),
        report.empty.len(),
        report.failed.len()
    );
    tracing::info!("summary table: {}", report.paths.summary.display());
    if !report.failed.is_empty() {
        tracing::warn!("failed programs: {:?}", report.failed);
    }
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
