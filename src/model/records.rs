use std::collections::BTreeMap;

/// One row of an enrichment results table.
pub trait EnrichmentRecord: Clone + std::fmt::Debug {
    fn term(&self) -> &str;
    fn adjusted_p_value(&self) -> f64;
    fn raw_header() -> &'static [&'static str];
    fn raw_fields(&self) -> Vec<String>;
    /// Columns following `Program` in the summary table.
    fn summary_header() -> &'static [&'static str];
    fn summary_fields(&self) -> Vec<String>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentTable<R> {
    pub rows: Vec<R>,
}

impl<R> EnrichmentTable<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self { rows }
    }

    pub fn empty() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

pub type ResultsCollection<R> = BTreeMap<usize, EnrichmentTable<R>>;

#[derive(Debug, Clone, PartialEq)]
pub struct PrerankRecord {
    pub term: String,
    pub es: f64,
    pub nes: f64,
    pub nom_p_value: f64,
    pub fdr_q_value: f64,
    pub fwer_p_value: f64,
    /// "hits/set size" as matched against the ranking.
    pub tag_percent: String,
    pub lead_genes: Vec<String>,
}

impl EnrichmentRecord for PrerankRecord {
    fn term(&self) -> &str {
        &self.term
    }

    fn adjusted_p_value(&self) -> f64 {
        self.fdr_q_value
    }

    fn raw_header() -> &'static [&'static str] {
        &[
            "Term",
            "ES",
            "NES",
            "NOM p-val",
            "FDR q-val",
            "FWER p-val",
            "Tag %",
            "Lead_genes",
        ]
    }

    fn raw_fields(&self) -> Vec<String> {
        vec![
            self.term.clone(),
            format_stat(self.es),
            format_stat(self.nes),
            format_stat(self.nom_p_value),
            format_stat(self.fdr_q_value),
            format_stat(self.fwer_p_value),
            self.tag_percent.clone(),
            self.lead_genes.join(";"),
        ]
    }

    fn summary_header() -> &'static [&'static str] {
        &["Top_Pathway", "NES", "FDR_q_val"]
    }

    fn summary_fields(&self) -> Vec<String> {
        vec![
            self.term.clone(),
            format_stat(self.nes),
            format_stat(self.fdr_q_value),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OraRecord {
    pub term: String,
    /// "overlap/term size" against the background.
    pub overlap: String,
    pub p_value: f64,
    pub adjusted_p_value: f64,
    pub odds_ratio: f64,
    pub combined_score: f64,
    pub genes: Vec<String>,
}

impl EnrichmentRecord for OraRecord {
    fn term(&self) -> &str {
        &self.term
    }

    fn adjusted_p_value(&self) -> f64 {
        self.adjusted_p_value
    }

    fn raw_header() -> &'static [&'static str] {
        &[
            "Term",
            "Overlap",
            "P-value",
            "Adjusted P-value",
            "Odds Ratio",
            "Combined Score",
            "Genes",
        ]
    }

    fn raw_fields(&self) -> Vec<String> {
        vec![
            self.term.clone(),
            self.overlap.clone(),
            format_stat(self.p_value),
            format_stat(self.adjusted_p_value),
            format_stat(self.odds_ratio),
            format_stat(self.combined_score),
            self.genes.join(";"),
        ]
    }

    fn summary_header() -> &'static [&'static str] {
        &["Top_Pathway", "Adj_P-value", "Combined_Score", "Genes"]
    }

    fn summary_fields(&self) -> Vec<String> {
        vec![
            self.term.clone(),
            format_stat(self.adjusted_p_value),
            format_stat(self.combined_score),
            self.genes.join(";"),
        ]
    }
}

pub fn format_stat(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{}", v)
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/records.rs"]
mod tests;
