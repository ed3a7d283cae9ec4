// pipeline.rs - End-to-end runs over a synthetic alignment dump

use std::fs;
use std::path::Path;

use hybrid_reads::pipeline::{run, RunSettings};
use hybrid_reads::prelude::*;

const A1: &str = "ACATATGTACGTACGTACGTACGT";
const B1: &str = "ACGTACGTACGTACGTGCGTCCGT";
const A2: &str = "CGCACATACGTACGTATGTAGGTA";
const B2: &str = "GTGCGCACGTACGTACATACTTAC";

fn block(name: &str, aligned1: &str, aligned2: &str, raw1: Option<&str>, qv: char) -> String {
    let raw1 = raw1.map(str::to_string).unwrap_or_else(|| aligned1.replace('-', ""));
    let raw2 = aligned2.replace('-', "");
    let qv1: String = std::iter::repeat(qv).take(raw1.len()).collect();
    let qv2: String = std::iter::repeat(qv).take(raw2.len()).collect();
    format!(
        "$$$\n{name}\t{raw1}\t{qv1}\n{name}_2\t{raw2}\t{qv2}\nr1\t{aligned1}\nr2\t{aligned2}\nA1\t{A1}\nB1\t{B1}\nA2\t{A2}\nB2\t{B2}\n"
    )
}

fn sample_dump() -> String {
    let mut text = String::from("CLUSTAL alignment of sample S0001\n");
    text.push_str(&block(
        "hybrid",
        "ACATATGTACGTAC----------",
        "----------GTACGTGCGTCCGT",
        None,
        'I',
    ));
    text.push_str(&block(
        "plain",
        "GTGCGCACGTACGT----------",
        "----------ACGTACATACTTAC",
        None,
        'I',
    ));
    text.push_str(&block(
        "noisy",
        "ACATATGTACGTAC----------",
        "----------GTACGTGCGTCCGT",
        None,
        '!',
    ));
    text.push_str(&block(
        "shifted",
        "GTGCGCACGTACGT----------",
        "----------ACGTACATACTTAC",
        Some("TTTTTTTTTTTTTT"),
        'I',
    ));
    text.push_str(&block(
        "double",
        "CGCACATAGTACGT----------",
        "----------ACGTACTGTAGGTA",
        None,
        'I',
    ));
    text.push_str("$$$\n");
    text
}

fn settings(input: &Path, output_dir: &Path, dry_run: bool) -> RunSettings {
    RunSettings {
        input: input.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        tag: "S0001".to_string(),
        config: PipelineConfig {
            min_read_length: 8,
            ..PipelineConfig::default()
        },
        dry_run,
        show_progress: false,
    }
}

fn data_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .skip(1)
        .map(str::to_string)
        .collect()
}

#[test]
fn test_full_run_writes_every_category() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("msa_output_S0001.txt");
    fs::write(&input, sample_dump()).unwrap();
    let out = dir.path().join("results");

    let report = run(&settings(&input, &out, false)).unwrap();
    assert_eq!(report.read_pairs, 5);
    assert_eq!(report.allele_names, vec!["A1", "B1", "A2", "B2"]);
    assert_eq!(report.combinations, 6);

    let counters = &report.counters;
    assert_eq!(counters.total, 5);
    assert_eq!(counters.hybrid_one_switch, 1);
    assert_eq!(counters.non_hybrid, 1);
    assert_eq!(counters.rejected, 1);
    assert_eq!(counters.incorrectly_aligned, 1);
    assert_eq!(counters.hybrid_more_switches, 1);
    assert_eq!(counters.zero, 0);

    let paths = report.outputs.unwrap();
    assert_eq!(paths.one_switch, out.join("hybrid_reads_1_switch_S0001.txt"));

    assert_eq!(data_lines(&paths.non_hybrid), vec!["plain\tB2"]);
    assert!(data_lines(&paths.zero).is_empty());
    assert_eq!(data_lines(&paths.more_switches), vec!["double"]);
    assert_eq!(
        data_lines(&paths.one_switch),
        vec![
            "hybrid\tA1\t0-13\t10-23\t0\t2\t2\t0\t6-15\tGTACGTACGT",
            "hybrid\tB1\t0-13\t10-23\t2\t0\t2\t0\t6-15\tGTACGTACGT",
        ]
    );

    let metadata = fs::read_to_string(&paths.metadata).unwrap();
    assert!(metadata.starts_with("Category\tCount\n"));
    assert!(metadata.contains("Incorrectly aligned reads\t1\n"));
    assert!(metadata.contains("Rejected reads\t1\n"));
    assert!(metadata.contains("Total reads\t5\n"));
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("msa_output_S0001.txt");
    fs::write(&input, sample_dump()).unwrap();
    let out = dir.path().join("results");

    let report = run(&settings(&input, &out, true)).unwrap();
    assert!(report.outputs.is_none());
    assert_eq!(report.read_pairs, 5);
    assert!(!out.exists());
}

#[test]
fn test_identical_alleles_abort_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("dup.txt");
    let text = sample_dump().replace(&format!("B2\t{B2}"), &format!("B2\t{A1}"));
    fs::write(&input, text).unwrap();

    let err = run(&settings(&input, dir.path(), false)).unwrap_err();
    assert!(err.contains("A1"), "unexpected error: {}", err);
}

#[test]
fn test_invalid_allele_count_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("three.txt");
    let text = "header\n$$$\nr\tACGTACGT\tIIIIIIII\nr_2\tACGTACGT\tIIIIIIII\nr1\tACGTACGT\nr2\tACGTACGT\nA1\tACGTACGT\nB1\tACGTACGA\nA2\tACGTACGC\n";
    fs::write(&input, text).unwrap();

    let err = run(&settings(&input, dir.path(), false)).unwrap_err();
    assert!(err.contains("Invalid allele set"), "unexpected error: {}", err);
}

#[test]
fn test_duplicate_allele_aborts_even_when_every_pair_matches() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("perfect.txt");
    let text = format!(
        "header\n{}$$$\n",
        block(
            "plain",
            "GTGCGCACGTACGT----------",
            "----------ACGTACATACTTAC",
            None,
            'I',
        )
    )
    .replace(&format!("A1\t{A1}"), &format!("A1\t{B2}"));
    fs::write(&input, text).unwrap();

    let err = run(&settings(&input, dir.path(), false)).unwrap_err();
    assert!(err.contains("'A1' and 'B2'"), "unexpected error: {}", err);
}
