use std::collections::HashSet;
use std::sync::Arc;

use crate::enrich::stats::{benjamini_hochberg, combined_score, hypergeom_upper_tail, odds_ratio};
use crate::enrich::{EnrichError, EnrichmentRunner};
use crate::input::gmt::GeneSetLibrary;
use crate::model::config::PipelineConfig;
use crate::model::program::Program;
use crate::model::records::{EnrichmentTable, OraRecord};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OraParams {
    pub p_value_cutoff: f64,
    pub top_n: usize,
}

impl OraParams {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            p_value_cutoff: config.significance_cutoff,
            top_n: config.top_gene_count,
        }
    }
}

/// Hypergeometric over-representation of a program's top genes, with the
/// library's gene union as background.
pub struct OraRunner {
    library: Arc<GeneSetLibrary>,
    background: HashSet<String>,
    params: OraParams,
}

impl OraRunner {
    pub fn new(library: Arc<GeneSetLibrary>, params: OraParams) -> Self {
        let background = library
            .background()
            .into_iter()
            .map(str::to_string)
            .collect();
        Self {
            library,
            background,
            params,
        }
    }

    pub fn background_size(&self) -> usize {
        self.background.len()
    }
}

impl EnrichmentRunner for OraRunner {
    type Record = OraRecord;

    fn name(&self) -> &'static str {
        "ora"
    }

    fn run(&self, program: &Program) -> Result<EnrichmentTable<OraRecord>, EnrichError> {
        if program.top_genes.is_empty() {
            return Err(EnrichError::InvalidInput(format!(
                "{} has an empty top gene list",
                program.label()
            )));
        }

        let mut seen = HashSet::new();
        let query: Vec<&str> = program
            .top_genes
            .iter()
            .take(self.params.top_n)
            .map(String::as_str)
            .filter(|g| self.background.contains(*g))
            .filter(|g| seen.insert(*g))
            .collect();
        if query.is_empty() {
            tracing::debug!("{}: no top gene is in the library background", program.label());
            return Ok(EnrichmentTable::empty());
        }

        let population = self.background.len() as u64;
        let draws = query.len() as u64;

        let mut tested = Vec::new();
        for set in &self.library.sets {
            let members: HashSet<&str> = set.genes.iter().map(String::as_str).collect();
            let overlap: Vec<String> = query
                .iter()
                .filter(|g| members.contains(**g))
                .map(|g| g.to_string())
                .collect();
            if overlap.is_empty() {
                continue;
            }
            let k = overlap.len() as u64;
            let successes = members.len() as u64;
            let p_value = hypergeom_upper_tail(population, successes, draws, k)?;
            let or = odds_ratio(
                k,
                draws - k,
                successes - k,
                population + k - successes - draws,
            );
            tested.push(OraRecord {
                term: set.term.clone(),
                overlap: format!("{}/{}", k, successes),
                p_value,
                adjusted_p_value: f64::NAN,
                odds_ratio: or,
                combined_score: combined_score(p_value, or),
                genes: overlap,
            });
        }

        let p_values: Vec<f64> = tested.iter().map(|r| r.p_value).collect();
        let adjusted = benjamini_hochberg(&p_values);
        for (record, q) in tested.iter_mut().zip(adjusted) {
            record.adjusted_p_value = q;
        }

        let mut rows: Vec<OraRecord> = tested
            .into_iter()
            .filter(|r| r.p_value < self.params.p_value_cutoff)
            .collect();
        rows.sort_by(|a, b| {
            a.adjusted_p_value
                .total_cmp(&b.adjusted_p_value)
                .then(a.p_value.total_cmp(&b.p_value))
                .then_with(|| a.term.cmp(&b.term))
        });
        Ok(EnrichmentTable::new(rows))
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/enrich/ora.rs"]
mod tests;
