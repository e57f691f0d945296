use crate::input::{LoadError, ResultLoader};
use crate::model::config::PipelineConfig;
use crate::model::program::FactorizationResults;

pub fn run_stage1<L: ResultLoader + ?Sized>(
    loader: &L,
    config: &PipelineConfig,
) -> Result<FactorizationResults, LoadError> {
    tracing::info!(
        "loading consensus results for k={} (density threshold {})",
        config.program_count,
        config.density_threshold
    );
    let results = loader.load(config.program_count, config.density_threshold)?;
    if results.n_programs() != config.program_count {
        return Err(LoadError::Invalid(format!(
            "expected {} programs, loaded {}",
            config.program_count,
            results.n_programs()
        )));
    }
    Ok(results)
}
