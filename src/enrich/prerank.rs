use std::collections::HashMap;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;

use crate::enrich::stats::conservative_ratio;
use crate::enrich::{EnrichError, EnrichmentRunner};
use crate::input::gmt::GeneSetLibrary;
use crate::model::config::PipelineConfig;
use crate::model::program::Program;
use crate::model::records::{EnrichmentTable, PrerankRecord};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrerankParams {
    pub min_size: usize,
    pub max_size: usize,
    pub permutations: usize,
    pub seed: u64,
    pub threads: usize,
}

impl PrerankParams {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            min_size: config.min_gene_set_size,
            max_size: config.max_gene_set_size,
            permutations: config.permutation_count,
            seed: config.seed,
            threads: config.threads,
        }
    }
}

/// Weighted Kolmogorov-Smirnov enrichment over a pre-ranked gene list with a
/// gene-label permutation null.
pub struct PrerankRunner {
    library: Arc<GeneSetLibrary>,
    params: PrerankParams,
    pool: rayon::ThreadPool,
}

struct TestedSet {
    set_idx: usize,
    /// Ranking positions of the member genes.
    hits: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RunningScore {
    es: f64,
    /// Index into the sorted hit positions where the extreme deviation occurs.
    peak: usize,
}

impl PrerankRunner {
    pub fn new(library: Arc<GeneSetLibrary>, params: PrerankParams) -> Result<Self, EnrichError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(params.threads)
            .build()
            .map_err(|e| EnrichError::ThreadPool(e.to_string()))?;
        Ok(Self {
            library,
            params,
            pool,
        })
    }

    fn tested_sets(&self, positions: &HashMap<&str, usize>, n_genes: usize) -> Vec<TestedSet> {
        let mut tested = Vec::new();
        for (set_idx, set) in self.library.sets.iter().enumerate() {
            let mut hits: Vec<usize> = set
                .genes
                .iter()
                .filter_map(|g| positions.get(g.as_str()).copied())
                .collect();
            if hits.len() < self.params.min_size
                || hits.len() > self.params.max_size
                || hits.is_empty()
                || hits.len() >= n_genes
            {
                continue;
            }
            hits.sort_unstable();
            tested.push(TestedSet { set_idx, hits });
        }
        tested
    }

    fn null_distribution(&self, tested: &[TestedSet], weights: &[f64]) -> Vec<Vec<f64>> {
        let n = weights.len();
        let seed = self.params.seed;
        self.pool.install(|| {
            (0..self.params.permutations)
                .into_par_iter()
                .map(|j| {
                    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(j as u64));
                    let mut perm: Vec<usize> = (0..n).collect();
                    perm.shuffle(&mut rng);
                    let mut buf = Vec::new();
                    tested
                        .iter()
                        .map(|t| {
                            buf.clear();
                            buf.extend(t.hits.iter().map(|&p| perm[p]));
                            buf.sort_unstable();
                            running_score(&buf, weights, n).es
                        })
                        .collect::<Vec<f64>>()
                })
                .collect()
        })
    }
}

impl EnrichmentRunner for PrerankRunner {
    type Record = PrerankRecord;

    fn name(&self) -> &'static str {
        "prerank"
    }

    fn run(&self, program: &Program) -> Result<EnrichmentTable<PrerankRecord>, EnrichError> {
        if program.gene_scores.is_empty() {
            return Err(EnrichError::InvalidInput(format!(
                "{} has an empty gene ranking",
                program.label()
            )));
        }

        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut genes: Vec<&str> = Vec::with_capacity(program.gene_scores.len());
        let mut weights: Vec<f64> = Vec::with_capacity(program.gene_scores.len());
        for (gene, score) in &program.gene_scores {
            if positions.contains_key(gene.as_str()) {
                continue;
            }
            positions.insert(gene.as_str(), genes.len());
            genes.push(gene.as_str());
            weights.push(score.abs());
        }
        let n = genes.len();

        let tested = self.tested_sets(&positions, n);
        if tested.is_empty() {
            tracing::debug!(
                "{}: no gene set within size bounds [{}, {}]",
                program.label(),
                self.params.min_size,
                self.params.max_size
            );
            return Ok(EnrichmentTable::empty());
        }

        let observed: Vec<RunningScore> = tested
            .iter()
            .map(|t| running_score(&t.hits, &weights, n))
            .collect();
        let null = self.null_distribution(&tested, &weights);

        let es: Vec<f64> = observed.iter().map(|o| o.es).collect();
        let stats = gsea_statistics(&es, &null);

        let mut rows: Vec<PrerankRecord> = tested
            .iter()
            .zip(observed.iter())
            .zip(stats.into_iter())
            .map(|((t, o), s)| {
                let lead: &[usize] = if o.es >= 0.0 {
                    &t.hits[..=o.peak]
                } else {
                    &t.hits[o.peak..]
                };
                PrerankRecord {
                    term: self.library.sets[t.set_idx].term.clone(),
                    es: o.es,
                    nes: s.nes,
                    nom_p_value: s.nom_p_value,
                    fdr_q_value: s.fdr_q_value,
                    fwer_p_value: s.fwer_p_value,
                    tag_percent: format!("{}/{}", lead.len(), t.hits.len()),
                    lead_genes: lead.iter().map(|&p| genes[p].to_string()).collect(),
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            a.fdr_q_value
                .total_cmp(&b.fdr_q_value)
                .then(b.nes.abs().total_cmp(&a.nes.abs()))
                .then_with(|| a.term.cmp(&b.term))
        });
        Ok(EnrichmentTable::new(rows))
    }
}

/// Extreme deviation of the running sum given ascending hit positions.
fn running_score(hits: &[usize], weights: &[f64], n: usize) -> RunningScore {
    let k = hits.len();
    let mut norm: f64 = hits.iter().map(|&p| weights[p]).sum();
    let unweighted = !(norm > 0.0);
    if unweighted {
        norm = k as f64;
    }
    let miss_step = 1.0 / (n - k) as f64;

    let mut cum = 0.0;
    let mut max = RunningScore { es: 0.0, peak: 0 };
    let mut min = RunningScore { es: 0.0, peak: 0 };
    for (j, &p) in hits.iter().enumerate() {
        let misses = (p - j) as f64 * miss_step;
        let low = cum - misses;
        if low < min.es {
            min = RunningScore { es: low, peak: j };
        }
        let w = if unweighted { 1.0 } else { weights[p] };
        cum += w / norm;
        let high = cum - misses;
        if high > max.es {
            max = RunningScore { es: high, peak: j };
        }
    }
    if max.es >= -min.es { max } else { min }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SetStatistics {
    nes: f64,
    nom_p_value: f64,
    fdr_q_value: f64,
    fwer_p_value: f64,
}

/// NES, nominal p, FDR q and FWER p for every tested set.
/// `null[j][s]` is the enrichment score of set `s` under permutation `j`.
fn gsea_statistics(es: &[f64], null: &[Vec<f64>]) -> Vec<SetStatistics> {
    let n_sets = es.len();
    let n_perm = null.len();

    let mut nes = Vec::with_capacity(n_sets);
    let mut nom_p = Vec::with_capacity(n_sets);
    let mut nes_null = vec![vec![0.0; n_sets]; n_perm];
    for s in 0..n_sets {
        let column: Vec<f64> = null.iter().map(|row| row[s]).collect();
        let (pos_mean, neg_mean) = side_means(&column);
        let e = es[s];
        let (observed_nes, p) = if e >= 0.0 {
            let mean = pos_mean.unwrap_or(e.abs());
            let nes = if mean > 0.0 { e / mean } else { 0.0 };
            let deno = column.iter().filter(|&&x| x >= 0.0).count();
            let nomi = column.iter().filter(|&&x| x >= e).count();
            (nes, conservative_ratio(nomi, deno))
        } else {
            let mean = neg_mean.map(f64::abs).unwrap_or(e.abs());
            let deno = column.iter().filter(|&&x| x < 0.0).count();
            let nomi = column.iter().filter(|&&x| x <= e).count();
            (e / mean, conservative_ratio(nomi, deno))
        };
        nes.push(observed_nes);
        nom_p.push(p);
        for (j, &x) in column.iter().enumerate() {
            nes_null[j][s] = normalize_by_side(x, pos_mean, neg_mean);
        }
    }

    let fdr = fdr_q_values(&nes, &nes_null);
    let fwer = fwer_p_values(&nes, &nes_null);

    (0..n_sets)
        .map(|s| SetStatistics {
            nes: nes[s],
            nom_p_value: nom_p[s],
            fdr_q_value: fdr[s],
            fwer_p_value: fwer[s],
        })
        .collect()
}

fn side_means(values: &[f64]) -> (Option<f64>, Option<f64>) {
    let (mut pos_sum, mut pos_n, mut neg_sum, mut neg_n) = (0.0, 0usize, 0.0, 0usize);
    for &v in values {
        if v >= 0.0 {
            pos_sum += v;
            pos_n += 1;
        } else {
            neg_sum += v;
            neg_n += 1;
        }
    }
    let pos = (pos_n > 0).then(|| pos_sum / pos_n as f64);
    let neg = (neg_n > 0).then(|| neg_sum / neg_n as f64);
    (pos, neg)
}

fn normalize_by_side(x: f64, pos_mean: Option<f64>, neg_mean: Option<f64>) -> f64 {
    let mean = if x >= 0.0 {
        pos_mean
    } else {
        neg_mean.map(f64::abs)
    };
    match mean {
        Some(m) if m > 0.0 => x / m,
        _ => 0.0,
    }
}

fn fdr_q_values(nes: &[f64], nes_null: &[Vec<f64>]) -> Vec<f64> {
    let mut all_null: Vec<f64> = nes_null.iter().flatten().copied().collect();
    all_null.sort_unstable_by(f64::total_cmp);
    let mut order: Vec<usize> = (0..nes.len()).collect();
    order.sort_by(|&a, &b| nes[a].total_cmp(&nes[b]));
    let sorted: Vec<f64> = order.iter().map(|&i| nes[i]).collect();

    let null_split = all_null.partition_point(|x| *x < 0.0);
    let obs_split = sorted.partition_point(|x| *x < 0.0);

    let mut fdr: Vec<f64> = sorted
        .iter()
        .map(|&e| {
            let (null_tail, null_side, obs_tail, obs_side) = if e < 0.0 {
                (
                    all_null.partition_point(|x| *x <= e),
                    null_split,
                    sorted.partition_point(|x| *x <= e),
                    obs_split,
                )
            } else {
                (
                    all_null.len() - all_null.partition_point(|x| *x < e),
                    all_null.len() - null_split,
                    sorted.len() - sorted.partition_point(|x| *x < e),
                    sorted.len() - obs_split,
                )
            };
            let pi_norm = conservative_ratio(null_tail, null_side);
            let pi_obs = conservative_ratio(obs_tail, obs_side);
            if pi_obs > 0.0 {
                (pi_norm / pi_obs).min(1.0)
            } else {
                1.0
            }
        })
        .collect();

    // q-values must not grow as |NES| grows on either side
    for k in (obs_split + 1)..fdr.len() {
        fdr[k] = fdr[k].min(fdr[k - 1]);
    }
    for k in (0..obs_split.saturating_sub(1)).rev() {
        fdr[k] = fdr[k].min(fdr[k + 1]);
    }

    let mut out = vec![0.0; nes.len()];
    for (rank, &i) in order.iter().enumerate() {
        out[i] = fdr[rank];
    }
    out
}

fn fwer_p_values(nes: &[f64], nes_null: &[Vec<f64>]) -> Vec<f64> {
    let max_pos: Vec<f64> = nes_null
        .iter()
        .map(|row| row.iter().copied().filter(|x| *x >= 0.0).fold(0.0, f64::max))
        .collect();
    let min_neg: Vec<f64> = nes_null
        .iter()
        .map(|row| row.iter().copied().filter(|x| *x < 0.0).fold(0.0, f64::min))
        .collect();
    let n_neg = min_neg.iter().filter(|x| **x < 0.0).count();

    nes.iter()
        .map(|&e| {
            if e < 0.0 {
                conservative_ratio(min_neg.iter().filter(|x| **x <= e).count(), n_neg)
            } else {
                conservative_ratio(max_pos.iter().filter(|x| **x >= e).count(), max_pos.len())
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/src_inline/enrich/prerank.rs"]
mod tests;
