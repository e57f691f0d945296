use std::panic::{AssertUnwindSafe, catch_unwind};

use serde::Serialize;

use crate::enrich::{EnrichError, EnrichmentRunner};
use crate::model::program::{FactorizationResults, program_label};
use crate::model::records::{EnrichmentRecord, EnrichmentTable, ResultsCollection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Running(usize),
    Done,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProgramOutcome {
    Enriched { n_terms: usize, top_term: String },
    Empty,
    Failed { error: String },
}

#[derive(Debug, Clone)]
pub struct BatchOutcome<R> {
    pub collection: ResultsCollection<R>,
    /// One entry per program id, ascending.
    pub outcomes: Vec<(usize, ProgramOutcome)>,
}

impl<R> BatchOutcome<R> {
    pub fn ids_where(&self, pred: impl Fn(&ProgramOutcome) -> bool) -> Vec<usize> {
        self.outcomes
            .iter()
            .filter(|(_, o)| pred(o))
            .map(|(id, _)| *id)
            .collect()
    }
}

/// Runs the enrichment back-end over programs 1..=K. Per-program failures are
/// recorded and never stop the loop.
pub struct BatchDriver<'a, E: EnrichmentRunner> {
    runner: &'a E,
    program_count: usize,
    state: BatchState,
}

impl<'a, E: EnrichmentRunner> BatchDriver<'a, E> {
    pub fn new(runner: &'a E, program_count: usize) -> Self {
        Self {
            runner,
            program_count,
            state: BatchState::Idle,
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn run(&mut self, results: &FactorizationResults) -> BatchOutcome<E::Record> {
        let mut collection = ResultsCollection::new();
        let mut outcomes = Vec::with_capacity(self.program_count);

        tracing::info!(
            "starting {} enrichment for {} programs",
            self.runner.name(),
            self.program_count
        );
        for id in 1..=self.program_count {
            self.state = BatchState::Running(id);
            tracing::info!("processing program {} of {}", id, self.program_count);

            let outcome = match self.run_one(results, id) {
                Ok(table) if table.is_empty() => {
                    tracing::info!("{} - no significant pathways found", program_label(id));
                    collection.insert(id, table);
                    ProgramOutcome::Empty
                }
                Ok(table) => {
                    let top_term = table.rows[0].term().to_string();
                    tracing::info!("{} - top hit: {}", program_label(id), top_term);
                    let n_terms = table.len();
                    collection.insert(id, table);
                    ProgramOutcome::Enriched { n_terms, top_term }
                }
                Err(err) => {
                    tracing::warn!("error processing {}: {}", program_label(id), err);
                    ProgramOutcome::Failed {
                        error: err.to_string(),
                    }
                }
            };
            outcomes.push((id, outcome));
        }
        self.state = BatchState::Done;

        let batch = BatchOutcome {
            collection,
            outcomes,
        };
        tracing::info!(
            "{} enrichment complete: {} with hits, {} empty, {} failed",
            self.runner.name(),
            batch.ids_where(|o| matches!(o, ProgramOutcome::Enriched { .. })).len(),
            batch.ids_where(|o| matches!(o, ProgramOutcome::Empty)).len(),
            batch.ids_where(|o| matches!(o, ProgramOutcome::Failed { .. })).len()
        );
        batch
    }

    fn run_one(
        &self,
        results: &FactorizationResults,
        id: usize,
    ) -> Result<EnrichmentTable<E::Record>, EnrichError> {
        let program = results.program(id).ok_or_else(|| {
            EnrichError::InvalidInput(format!("program {id} is missing from the loaded results"))
        })?;
        match catch_unwind(AssertUnwindSafe(|| self.runner.run(&program))) {
            Ok(result) => result,
            Err(payload) => Err(EnrichError::Panicked(panic_message(payload.as_ref()))),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_enrich.rs"]
mod tests;
