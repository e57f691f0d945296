use std::path::PathBuf;

use thiserror::Error;

use crate::model::program::FactorizationResults;

pub mod cnmf;
pub mod gmt;
pub mod reader;

pub use cnmf::CnmfDirLoader;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("missing precomputed artifact for k={k}, dt={density_threshold}: {}", path.display())]
    MissingArtifact {
        k: usize,
        density_threshold: f64,
        path: PathBuf,
    },
    #[error("parse error in {}: {msg}", path.display())]
    Parse { path: PathBuf, msg: String },
    #[error("invalid factorization results: {0}")]
    Invalid(String),
}

/// Source of precomputed consensus factorization results.
pub trait ResultLoader {
    fn load(&self, k: usize, density_threshold: f64) -> Result<FactorizationResults, LoadError>;
}
