use super::*;

fn parse(args: &[&str]) -> PipelineConfig {
    let mut argv = vec!["kira-programenrich"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();
    build_config(cli.command)
}

#[test]
fn test_prerank_defaults() {
    let config = parse(&["prerank"]);
    assert_eq!(config.variant, EnrichmentVariant::Prerank);
    assert_eq!(config.gene_set_database, "GO_Biological_Process_2023");
    assert_eq!(config.program_count, 46);
    assert_eq!(config.output_dir, PathBuf::from("."));
    assert!(config.write_raw_results);
}

#[test]
fn test_ora_overrides() {
    let config = parse(&[
        "ora",
        "-k",
        "12",
        "--density-threshold",
        "0.2",
        "--gene-sets",
        "MSigDB_Hallmark_2020",
        "--out",
        "results",
        "--top-genes",
        "150",
        "--cutoff",
        "0.01",
        "--top-hit",
        "most-significant",
        "--no-raw-results",
    ]);
    assert_eq!(config.variant, EnrichmentVariant::Ora);
    assert_eq!(config.program_count, 12);
    assert_eq!(config.density_threshold, 0.2);
    assert_eq!(config.gene_set_database, "MSigDB_Hallmark_2020");
    assert_eq!(config.output_dir, PathBuf::from("results"));
    assert_eq!(config.top_gene_count, 150);
    assert_eq!(config.significance_cutoff, 0.01);
    assert_eq!(config.top_hit, TopHitPolicy::MostSignificant);
    assert!(!config.write_raw_results);
}

#[test]
fn test_prerank_sampling_overrides() {
    let config = parse(&[
        "prerank",
        "--programs",
        "3",
        "--permutations",
        "100",
        "--seed",
        "42",
        "--threads",
        "2",
        "--min-size",
        "5",
        "--max-size",
        "50",
        "--cnmf-dir",
        "runs",
        "--run-name",
        "demo",
    ]);
    assert_eq!(config.program_count, 3);
    assert_eq!(config.permutation_count, 100);
    assert_eq!(config.seed, 42);
    assert_eq!(config.threads, 2);
    assert_eq!(config.min_gene_set_size, 5);
    assert_eq!(config.max_gene_set_size, 50);
    assert_eq!(config.cnmf_output_dir, PathBuf::from("runs"));
    assert_eq!(config.run_name, "demo");
}

#[test]
fn test_missing_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["kira-programenrich"]).is_err());
}

#[test]
fn test_invalid_top_hit_is_rejected() {
    assert!(Cli::try_parse_from(["kira-programenrich", "ora", "--top-hit", "best"]).is_err());
}
