use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnrichmentVariant {
    Prerank,
    Ora,
}

impl EnrichmentVariant {
    pub fn name(self) -> &'static str {
        match self {
            EnrichmentVariant::Prerank => "prerank",
            EnrichmentVariant::Ora => "ora",
        }
    }

    pub fn summary_file(self) -> &'static str {
        match self {
            EnrichmentVariant::Prerank => "GO_all_top_programs.csv",
            EnrichmentVariant::Ora => "ORA_summary_all_programs.csv",
        }
    }

    pub fn raw_results_file(self) -> &'static str {
        match self {
            EnrichmentVariant::Prerank => "GO_prerank_results_res2d.csv",
            EnrichmentVariant::Ora => "ORA_results_all_programs.csv",
        }
    }

    pub fn manifest_file(self) -> &'static str {
        match self {
            EnrichmentVariant::Prerank => "GO_prerank_run_manifest.json",
            EnrichmentVariant::Ora => "ORA_run_manifest.json",
        }
    }
}

/// How the summary picks the representative row of a program's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TopHitPolicy {
    /// First row under the back-end's own ordering.
    FirstRow,
    /// Row with the smallest adjusted p-value; first such row on ties.
    MostSignificant,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    pub variant: EnrichmentVariant,
    pub gene_set_database: String,
    pub program_count: usize,
    pub density_threshold: f64,
    pub min_gene_set_size: usize,
    pub max_gene_set_size: usize,
    pub significance_cutoff: f64,
    pub top_gene_count: usize,
    pub permutation_count: usize,
    pub seed: u64,
    /// Worker threads for the prerank permutations; 0 uses every core.
    pub threads: usize,
    pub top_hit: TopHitPolicy,
    pub write_raw_results: bool,
    pub cnmf_output_dir: PathBuf,
    pub run_name: String,
    pub gene_set_dir: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("program count must be at least 1")]
    ZeroPrograms,
    #[error("density threshold {0} is outside [0, 1]")]
    DensityThreshold(f64),
    #[error("min gene set size {min} exceeds max gene set size {max}")]
    GeneSetSizeRange { min: usize, max: usize },
    #[error("significance cutoff {0} is outside (0, 1]")]
    SignificanceCutoff(f64),
    #[error("top gene count must be at least 1")]
    ZeroTopGenes,
    #[error("permutation count must be at least 1")]
    ZeroPermutations,
    #[error("gene set database name is empty")]
    EmptyDatabase,
}

impl PipelineConfig {
    pub fn prerank_v1() -> Self {
        Self {
            variant: EnrichmentVariant::Prerank,
            gene_set_database: "GO_Biological_Process_2023".to_string(),
            program_count: 46,
            density_threshold: 0.1,
            min_gene_set_size: 15,
            max_gene_set_size: 500,
            significance_cutoff: 0.05,
            top_gene_count: 300,
            permutation_count: 1000,
            seed: 6,
            threads: 0,
            top_hit: TopHitPolicy::FirstRow,
            write_raw_results: true,
            cnmf_output_dir: PathBuf::from("cnmf_run"),
            run_name: "4050run".to_string(),
            gene_set_dir: PathBuf::from("gene_sets"),
            output_dir: PathBuf::from("."),
        }
    }

    pub fn ora_v1() -> Self {
        Self {
            variant: EnrichmentVariant::Ora,
            gene_set_database: "KEGG_2021_Human".to_string(),
            output_dir: PathBuf::from("pathway_analysis_results"),
            ..Self::prerank_v1()
        }
    }

    pub fn for_variant(variant: EnrichmentVariant) -> Self {
        match variant {
            EnrichmentVariant::Prerank => Self::prerank_v1(),
            EnrichmentVariant::Ora => Self::ora_v1(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.program_count == 0 {
            return Err(ConfigError::ZeroPrograms);
        }
        if !(0.0..=1.0).contains(&self.density_threshold) {
            return Err(ConfigError::DensityThreshold(self.density_threshold));
        }
        if self.min_gene_set_size > self.max_gene_set_size {
            return Err(ConfigError::GeneSetSizeRange {
                min: self.min_gene_set_size,
                max: self.max_gene_set_size,
            });
        }
        if !(self.significance_cutoff > 0.0 && self.significance_cutoff <= 1.0) {
            return Err(ConfigError::SignificanceCutoff(self.significance_cutoff));
        }
        if self.top_gene_count == 0 {
            return Err(ConfigError::ZeroTopGenes);
        }
        if self.permutation_count == 0 {
            return Err(ConfigError::ZeroPermutations);
        }
        if self.gene_set_database.trim().is_empty() {
            return Err(ConfigError::EmptyDatabase);
        }
        Ok(())
    }

    pub fn gene_set_path(&self) -> PathBuf {
        self.gene_set_dir.join(format!("{}.gmt", self.gene_set_database))
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/config.rs"]
mod tests;
