use super::*;

#[test]
fn test_format_stat() {
    assert_eq!(format_stat(0.05), "0.05");
    assert_eq!(format_stat(2.0), "2");
    assert_eq!(format_stat(f64::NAN), "NaN");
    assert_eq!(format_stat(f64::INFINITY), "inf");
}

#[test]
fn test_prerank_raw_fields_follow_header() {
    let record = PrerankRecord {
        term: "Hypoxia".to_string(),
        es: -0.5,
        nes: -1.25,
        nom_p_value: 0.01,
        fdr_q_value: 0.02,
        fwer_p_value: 0.03,
        tag_percent: "3/12".to_string(),
        lead_genes: vec!["VEGFA".to_string(), "LDHA".to_string()],
    };
    let fields = record.raw_fields();
    assert_eq!(fields.len(), PrerankRecord::raw_header().len());
    assert_eq!(
        fields,
        vec!["Hypoxia", "-0.5", "-1.25", "0.01", "0.02", "0.03", "3/12", "VEGFA;LDHA"]
    );
    assert_eq!(record.adjusted_p_value(), 0.02);
}

#[test]
fn test_table_helpers() {
    let table: EnrichmentTable<PrerankRecord> = EnrichmentTable::empty();
    assert!(table.is_empty());
    assert_eq!(table.len(), 0);
}
