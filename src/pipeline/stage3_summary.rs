use crate::model::config::TopHitPolicy;
use crate::model::program::program_label;
use crate::model::records::{EnrichmentRecord, ResultsCollection};

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow<R> {
    pub program_id: usize,
    pub top: R,
}

impl<R: EnrichmentRecord> SummaryRow<R> {
    pub fn header() -> Vec<&'static str> {
        let mut header = vec!["Program"];
        header.extend_from_slice(R::summary_header());
        header
    }

    pub fn fields(&self) -> Vec<String> {
        let mut fields = vec![program_label(self.program_id)];
        fields.extend(self.top.summary_fields());
        fields
    }
}

/// One row per program with a non-empty table, ascending by adjusted p-value.
/// Ties keep program order; NaN sorts last.
pub fn summarize<R: EnrichmentRecord>(
    collection: &ResultsCollection<R>,
    policy: TopHitPolicy,
) -> Vec<SummaryRow<R>> {
    let mut rows: Vec<SummaryRow<R>> = collection
        .iter()
        .filter_map(|(&program_id, table)| {
            select_top(&table.rows, policy).map(|top| SummaryRow {
                program_id,
                top: top.clone(),
            })
        })
        .collect();
    rows.sort_by(|a, b| significance_key(&a.top).total_cmp(&significance_key(&b.top)));
    rows
}

pub fn select_top<R: EnrichmentRecord>(rows: &[R], policy: TopHitPolicy) -> Option<&R> {
    match policy {
        TopHitPolicy::FirstRow => rows.first(),
        TopHitPolicy::MostSignificant => rows.iter().reduce(|best, r| {
            if significance_key(r) < significance_key(best) {
                r
            } else {
                best
            }
        }),
    }
}

fn significance_key<R: EnrichmentRecord>(record: &R) -> f64 {
    let p = record.adjusted_p_value();
    if p.is_nan() { f64::INFINITY } else { p }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_summary.rs"]
mod tests;
