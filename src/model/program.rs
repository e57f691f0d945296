/// Dense row-major matrix with string labels on both axes, as written by cNMF.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledMatrix {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl LabeledMatrix {
    pub fn n_rows(&self) -> usize {
        self.row_labels.len()
    }

    pub fn n_cols(&self) -> usize {
        self.col_labels.len()
    }

    pub fn normalize_rows(&mut self) {
        for row in &mut self.values {
            let sum: f64 = row.iter().filter(|v| v.is_finite()).sum();
            if sum > 0.0 {
                for v in row.iter_mut() {
                    *v /= sum;
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub id: usize,
    /// Gene scores in descending order.
    pub gene_scores: Vec<(String, f64)>,
    pub top_genes: Vec<String>,
}

impl Program {
    pub fn label(&self) -> String {
        program_label(self.id)
    }
}

pub fn program_label(id: usize) -> String {
    format!("program_{id}")
}

/// Everything a consensus factorization run produces for one K.
#[derive(Debug, Clone)]
pub struct FactorizationResults {
    /// Cells x programs, rows normalised to sum to 1.
    pub usage: LabeledMatrix,
    /// Programs x genes.
    pub gene_scores: LabeledMatrix,
    /// Programs x genes.
    pub gene_tpm: LabeledMatrix,
    pub top_genes: Vec<Vec<String>>,
}

impl FactorizationResults {
    pub fn from_scores(
        usage: LabeledMatrix,
        gene_scores: LabeledMatrix,
        gene_tpm: LabeledMatrix,
        top_gene_count: usize,
    ) -> Self {
        let top_genes = gene_scores
            .values
            .iter()
            .map(|row| {
                rank_genes(&gene_scores.col_labels, row)
                    .into_iter()
                    .take(top_gene_count)
                    .map(|(g, _)| g)
                    .collect()
            })
            .collect();
        Self {
            usage,
            gene_scores,
            gene_tpm,
            top_genes,
        }
    }

    pub fn n_programs(&self) -> usize {
        self.gene_scores.n_rows()
    }

    pub fn program(&self, id: usize) -> Option<Program> {
        let label = id.to_string();
        let idx = self.gene_scores.row_labels.iter().position(|l| *l == label)?;
        let gene_scores = rank_genes(&self.gene_scores.col_labels, &self.gene_scores.values[idx]);
        let top_genes = self.top_genes.get(idx).cloned().unwrap_or_default();
        Some(Program {
            id,
            gene_scores,
            top_genes,
        })
    }
}

/// Sorts genes by descending score; ties keep column order, non-finite scores are dropped.
pub fn rank_genes(genes: &[String], scores: &[f64]) -> Vec<(String, f64)> {
    let mut ranked: Vec<(String, f64)> = genes
        .iter()
        .zip(scores.iter())
        .filter(|(_, s)| s.is_finite())
        .map(|(g, &s)| (g.clone(), s))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/program.rs"]
mod tests;
