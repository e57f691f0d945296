use thiserror::Error;

use crate::model::program::Program;
use crate::model::records::{EnrichmentRecord, EnrichmentTable};

pub mod ora;
pub mod prerank;
pub mod stats;

pub use ora::{OraParams, OraRunner};
pub use prerank::{PrerankParams, PrerankRunner};

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("invalid gene input: {0}")]
    InvalidInput(String),
    #[error("statistics failure: {0}")]
    Statistics(String),
    #[error("thread pool: {0}")]
    ThreadPool(String),
    #[error("back-end panicked: {0}")]
    Panicked(String),
}

/// Boundary to an enrichment back-end. An `Ok` with an empty table means the
/// program was processed but nothing passed the back-end's filters.
pub trait EnrichmentRunner {
    type Record: EnrichmentRecord;

    fn name(&self) -> &'static str;

    fn run(&self, program: &Program) -> Result<EnrichmentTable<Self::Record>, EnrichError>;
}
