use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::input::LoadError;
use crate::input::reader::{read_lines, resolve_plain_or_gz};

#[derive(Debug, Error)]
pub enum GeneSetError {
    #[error("gene set library not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error(transparent)]
    Read(#[from] LoadError),
    #[error("gene set library {}: line {line} has no genes", path.display())]
    EmptySet { path: PathBuf, line: usize },
    #[error("gene set library {} contains no gene sets", .0.display())]
    EmptyLibrary(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneSet {
    pub term: String,
    pub description: String,
    pub genes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct GeneSetLibrary {
    pub name: String,
    pub sets: Vec<GeneSet>,
}

impl GeneSetLibrary {
    pub fn from_sets(name: impl Into<String>, sets: Vec<GeneSet>) -> Self {
        Self {
            name: name.into(),
            sets,
        }
    }

    /// Union of all member genes, sorted.
    pub fn background(&self) -> BTreeSet<&str> {
        self.sets
            .iter()
            .flat_map(|s| s.genes.iter().map(String::as_str))
            .collect()
    }
}

pub fn load_gene_set_library(name: &str, path: &Path) -> Result<GeneSetLibrary, GeneSetError> {
    let path =
        resolve_plain_or_gz(path).ok_or_else(|| GeneSetError::NotFound(path.to_path_buf()))?;
    let lines = read_lines(&path)?;
    let mut sets = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut cols = line.split('\t');
        let term = cols.next().unwrap_or_default().trim().to_string();
        let description = cols.next().unwrap_or_default().trim().to_string();
        let mut seen = HashSet::new();
        let genes: Vec<String> = cols
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .filter(|g| seen.insert(g.to_string()))
            .map(str::to_string)
            .collect();
        if genes.is_empty() {
            return Err(GeneSetError::EmptySet {
                path: path.clone(),
                line: idx + 1,
            });
        }
        sets.push(GeneSet {
            term,
            description,
            genes,
        });
    }

    if sets.is_empty() {
        return Err(GeneSetError::EmptyLibrary(path));
    }

    tracing::info!(
        "loaded gene set library {} ({} sets) from {}",
        name,
        sets.len(),
        path.display()
    );
    Ok(GeneSetLibrary::from_sets(name, sets))
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/gmt.rs"]
mod tests;
