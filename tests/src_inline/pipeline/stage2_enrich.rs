use std::collections::HashMap;

use super::*;
use crate::model::program::{LabeledMatrix, Program};
use crate::model::records::OraRecord;

enum Script {
    Hit(&'static str),
    Empty,
    Fail,
    Panic,
}

struct ScriptedRunner {
    scripts: HashMap<usize, Script>,
}

impl EnrichmentRunner for ScriptedRunner {
    type Record = OraRecord;

    fn name(&self) -> &'static str {
        "scripted"
    }

    fn run(&self, program: &Program) -> Result<EnrichmentTable<OraRecord>, EnrichError> {
        match self.scripts.get(&program.id) {
            Some(Script::Hit(term)) => Ok(EnrichmentTable::new(vec![record(term)])),
            Some(Script::Empty) | None => Ok(EnrichmentTable::empty()),
            Some(Script::Fail) => Err(EnrichError::Statistics("boom".to_string())),
            Some(Script::Panic) => panic!("back-end exploded"),
        }
    }
}

fn record(term: &str) -> OraRecord {
    OraRecord {
        term: term.to_string(),
        overlap: "1/1".to_string(),
        p_value: 0.01,
        adjusted_p_value: 0.02,
        odds_ratio: 2.0,
        combined_score: 9.2,
        genes: vec!["G1".to_string()],
    }
}

fn results(k: usize) -> FactorizationResults {
    let matrix = |rows: Vec<String>| LabeledMatrix {
        values: rows.iter().map(|_| vec![1.0, 0.5]).collect(),
        row_labels: rows,
        col_labels: vec!["G1".to_string(), "G2".to_string()],
    };
    let ids: Vec<String> = (1..=k).map(|i| i.to_string()).collect();
    FactorizationResults::from_scores(
        LabeledMatrix {
            row_labels: Vec::new(),
            col_labels: ids.clone(),
            values: Vec::new(),
        },
        matrix(ids.clone()),
        matrix(ids),
        10,
    )
}

#[test]
fn test_driver_isolates_failures_and_runs_to_k() {
    let runner = ScriptedRunner {
        scripts: HashMap::from([
            (1, Script::Hit("A")),
            (2, Script::Fail),
            (3, Script::Empty),
            (4, Script::Panic),
            (5, Script::Hit("E")),
        ]),
    };
    let mut driver = BatchDriver::new(&runner, 5);
    assert_eq!(driver.state(), BatchState::Idle);
    let batch = driver.run(&results(5));
    assert_eq!(driver.state(), BatchState::Done);

    assert_eq!(batch.outcomes.len(), 5);
    assert_eq!(batch.collection.keys().copied().collect::<Vec<_>>(), vec![1, 3, 5]);
    assert_eq!(
        batch.ids_where(|o| matches!(o, ProgramOutcome::Enriched { .. })),
        vec![1, 5]
    );
    assert_eq!(batch.ids_where(|o| matches!(o, ProgramOutcome::Empty)), vec![3]);
    assert_eq!(
        batch.ids_where(|o| matches!(o, ProgramOutcome::Failed { .. })),
        vec![2, 4]
    );
    assert_eq!(
        batch.outcomes[3].1,
        ProgramOutcome::Failed {
            error: "back-end panicked: back-end exploded".to_string()
        }
    );
    assert_eq!(
        batch.outcomes[0].1,
        ProgramOutcome::Enriched {
            n_terms: 1,
            top_term: "A".to_string()
        }
    );
}

#[test]
fn test_program_missing_from_results_is_item_failure() {
    let runner = ScriptedRunner {
        scripts: HashMap::from([(1, Script::Hit("A")), (2, Script::Hit("B"))]),
    };
    let mut driver = BatchDriver::new(&runner, 3);
    let batch = driver.run(&results(2));
    assert_eq!(batch.collection.len(), 2);
    assert!(matches!(
        batch.outcomes[2],
        (3, ProgramOutcome::Failed { .. })
    ));
}

#[test]
fn test_all_failures_still_complete() {
    let runner = ScriptedRunner {
        scripts: (1..=4).map(|i| (i, Script::Fail)).collect(),
    };
    let mut driver = BatchDriver::new(&runner, 4);
    let batch = driver.run(&results(4));
    assert!(batch.collection.is_empty());
    assert_eq!(batch.outcomes.len(), 4);
    assert_eq!(driver.state(), BatchState::Done);
}

#[test]
fn test_panic_message_variants() {
    let owned: Box<dyn std::any::Any + Send> = Box::new("owned".to_string());
    assert_eq!(panic_message(owned.as_ref()), "owned");
    let other: Box<dyn std::any::Any + Send> = Box::new(5u8);
    assert_eq!(panic_message(other.as_ref()), "unknown panic");
}
