use std::path::{Path, PathBuf};

use crate::input::reader::{read_lines, resolve_plain_or_gz};
use crate::input::{LoadError, ResultLoader};
use crate::model::program::{FactorizationResults, LabeledMatrix};

/// Reads the consensus outputs cNMF leaves under `<output_dir>/<run_name>/`.
#[derive(Debug, Clone)]
pub struct CnmfDirLoader {
    pub output_dir: PathBuf,
    pub run_name: String,
    pub top_gene_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    GeneSpectraScore,
    GeneSpectraTpm,
    ConsensusUsages,
}

impl CnmfDirLoader {
    pub fn new(
        output_dir: impl Into<PathBuf>,
        run_name: impl Into<String>,
        top_gene_count: usize,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            run_name: run_name.into(),
            top_gene_count,
        }
    }

    pub fn run_dir(&self) -> PathBuf {
        self.output_dir.join(&self.run_name)
    }

    pub fn artifact_path(&self, artifact: Artifact, k: usize, density_threshold: f64) -> PathBuf {
        let dt = density_tag(density_threshold);
        let name = &self.run_name;
        let file = match artifact {
            Artifact::GeneSpectraScore => format!("{name}.gene_spectra_score.k_{k}.dt_{dt}.txt"),
            Artifact::GeneSpectraTpm => format!("{name}.gene_spectra_tpm.k_{k}.dt_{dt}.txt"),
            Artifact::ConsensusUsages => format!("{name}.usages.k_{k}.dt_{dt}.consensus.txt"),
        };
        self.run_dir().join(file)
    }

    fn read_artifact(
        &self,
        artifact: Artifact,
        k: usize,
        density_threshold: f64,
    ) -> Result<LabeledMatrix, LoadError> {
        let expected = self.artifact_path(artifact, k, density_threshold);
        let path = resolve_plain_or_gz(&expected).ok_or(LoadError::MissingArtifact {
            k,
            density_threshold,
            path: expected,
        })?;
        tracing::debug!("reading {}", path.display());
        parse_labeled_matrix(&path)
    }
}

impl ResultLoader for CnmfDirLoader {
    fn load(&self, k: usize, density_threshold: f64) -> Result<FactorizationResults, LoadError> {
        let mut gene_scores =
            self.read_artifact(Artifact::GeneSpectraScore, k, density_threshold)?;
        let mut gene_tpm = self.read_artifact(Artifact::GeneSpectraTpm, k, density_threshold)?;
        let mut usage = self.read_artifact(Artifact::ConsensusUsages, k, density_threshold)?;

        check_program_ids(&mut gene_scores.row_labels, k, "gene spectra score rows")?;
        check_program_ids(&mut gene_tpm.row_labels, k, "gene spectra tpm rows")?;
        check_program_ids(&mut usage.col_labels, k, "usage columns")?;
        usage.normalize_rows();

        tracing::info!(
            "loaded cNMF run {} (k={}, dt={}): {} programs, {} genes, {} cells",
            self.run_name,
            k,
            density_threshold,
            gene_scores.n_rows(),
            gene_scores.n_cols(),
            usage.n_rows()
        );

        Ok(FactorizationResults::from_scores(
            usage,
            gene_scores,
            gene_tpm,
            self.top_gene_count,
        ))
    }
}

/// Renders a density threshold the way cNMF names its files (0.1 -> "0_1", 2 -> "2_0").
pub fn density_tag(density_threshold: f64) -> String {
    let mut s = format!("{}", density_threshold);
    if !s.contains('.') {
        s.push_str(".0");
    }
    s.replace('.', "_")
}

/// Checks that `labels` are exactly the program ids 1..=k and rewrites them in
/// integer form ("2.0" becomes "2").
fn check_program_ids(labels: &mut [String], k: usize, what: &str) -> Result<(), LoadError> {
    let mut ids = Vec::with_capacity(labels.len());
    for label in labels.iter() {
        let id = parse_program_id(label).ok_or_else(|| {
            LoadError::Invalid(format!("{what}: program label '{label}' is not an integer"))
        })?;
        ids.push(id);
    }
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    if !sorted.iter().copied().eq(1..=k) {
        return Err(LoadError::Invalid(format!(
            "{what}: expected program ids 1..={k}, found {} labels",
            labels.len()
        )));
    }
    for (label, id) in labels.iter_mut().zip(ids) {
        *label = id.to_string();
    }
    Ok(())
}

fn parse_program_id(label: &str) -> Option<usize> {
    let label = label.trim();
    if let Ok(v) = label.parse::<usize>() {
        return Some(v);
    }
    // pandas may round-trip integer column labels as floats
    let v = label.parse::<f64>().ok()?;
    if v.fract() == 0.0 && v >= 0.0 {
        Some(v as usize)
    } else {
        None
    }
}

pub fn parse_labeled_matrix(path: &Path) -> Result<LabeledMatrix, LoadError> {
    let lines = read_lines(path)?;
    let mut iter = lines.iter().enumerate().filter(|(_, l)| !l.trim().is_empty());

    let (_, header) = iter.next().ok_or_else(|| LoadError::Parse {
        path: path.to_path_buf(),
        msg: "empty file".to_string(),
    })?;
    let col_labels: Vec<String> = header
        .split('\t')
        .skip(1)
        .map(|c| c.trim().to_string())
        .collect();
    if col_labels.is_empty() {
        return Err(LoadError::Parse {
            path: path.to_path_buf(),
            msg: "header has no data columns".to_string(),
        });
    }

    let mut row_labels = Vec::new();
    let mut values = Vec::new();
    for (idx, line) in iter {
        let line_no = idx + 1;
        let mut cols = line.split('\t');
        let label = cols.next().unwrap_or_default().trim().to_string();
        let row: Vec<f64> = cols
            .map(|c| parse_value(c.trim()))
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(|| LoadError::Parse {
                path: path.to_path_buf(),
                msg: format!("line {line_no} has a non-numeric value"),
            })?;
        if row.len() != col_labels.len() {
            return Err(LoadError::Parse {
                path: path.to_path_buf(),
                msg: format!(
                    "line {line_no} has {} values, header has {}",
                    row.len(),
                    col_labels.len()
                ),
            });
        }
        row_labels.push(label);
        values.push(row);
    }

    Ok(LabeledMatrix {
        row_labels,
        col_labels,
        values,
    })
}

fn parse_value(s: &str) -> Option<f64> {
    match s {
        "" | "nan" | "NaN" | "NA" => Some(f64::NAN),
        _ => s.parse::<f64>().ok(),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/cnmf.rs"]
mod tests;
