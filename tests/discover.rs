use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value as Json;
use tempfile::tempdir;

fn write_corpus(dir: &Path) {
    fs::write(
        dir.join("orders.csv"),
        "amount,total\n1,100\n1,110\n1,120\n2,130\n2,140\n3,150\n3,160\n4,170\n",
    )
    .expect("write orders.csv");
    fs::write(
        dir.join("invoices.csv"),
        "amount,fee\n1,100\n1,110\n1,120\n2,130\n2,140\n3,150\n3,160\n4,170\n",
    )
    .expect("write invoices.csv");
}

fn run_discover(input: &Path, output: &Path, extra: &[&str]) {
    let mut cmd = Command::cargo_bin("attr-discovery").expect("binary");
    cmd.arg("discover")
        .arg("--input")
        .arg(input)
        .arg("--output")
        .arg(output)
        .args(["--quantiles", "4", "--threshold1", "0.1", "--threshold2", "0.1"])
        .args(extra);
    cmd.assert().success();
}

fn read_report(path: &Path) -> Json {
    let raw = fs::read_to_string(path).expect("read report");
    serde_json::from_str(&raw).expect("parse report JSON")
}

fn all_members(report: &Json) -> Vec<String> {
    report
        .as_object()
        .expect("report object")
        .values()
        .flat_map(|members| members.as_array().expect("member array"))
        .map(|member| member.as_str().expect("member string").to_string())
        .collect()
}

#[test]
fn discover_writes_both_cluster_reports() {
    let corpus = tempdir().expect("corpus dir");
    let output = tempdir().expect("output dir");
    write_corpus(corpus.path());

    run_discover(corpus.path(), output.path(), &[]);

    let distribution = read_report(&output.path().join("distribution_clusters.json"));
    let attribute = read_report(&output.path().join("attribute_clusters.json"));

    // Matching amounts and matching totals pair up; nothing crosses over.
    let attribute_map = attribute.as_object().expect("object");
    assert_eq!(attribute_map.len(), 2);
    let cluster1 = attribute["Cluster 1"].as_array().expect("array");
    assert_eq!(cluster1.len(), 2);
    assert_eq!(cluster1[0], "invoices__amount");
    assert_eq!(cluster1[1], "orders__amount");

    let distribution_map = distribution.as_object().expect("object");
    assert_eq!(distribution_map.len(), 2);
}

#[test]
fn every_column_lands_in_exactly_one_cluster() {
    let corpus = tempdir().expect("corpus dir");
    let output = tempdir().expect("output dir");
    write_corpus(corpus.path());

    run_discover(corpus.path(), output.path(), &[]);

    for report_name in ["distribution_clusters.json", "attribute_clusters.json"] {
        let report = read_report(&output.path().join(report_name));
        let mut members = all_members(&report);
        members.sort();
        assert_eq!(
            members,
            [
                "invoices__amount",
                "invoices__fee",
                "orders__amount",
                "orders__total"
            ],
            "{report_name} must partition the column set"
        );
    }
}

#[test]
fn repeated_runs_produce_identical_reports() {
    let corpus = tempdir().expect("corpus dir");
    write_corpus(corpus.path());

    let first_out = tempdir().expect("first output");
    let second_out = tempdir().expect("second output");
    run_discover(corpus.path(), first_out.path(), &[]);
    run_discover(corpus.path(), second_out.path(), &[]);

    for report_name in ["distribution_clusters.json", "attribute_clusters.json"] {
        let first = fs::read_to_string(first_out.path().join(report_name)).expect("first");
        let second = fs::read_to_string(second_out.path().join(report_name)).expect("second");
        assert_eq!(first, second, "{report_name} must be deterministic");
    }
}

#[test]
fn discover_accepts_a_prebuilt_rank_index() {
    let corpus = tempdir().expect("corpus dir");
    let output = tempdir().expect("output dir");
    write_corpus(corpus.path());
    let ranks_path = corpus.path().join("corpus.ranks");

    Command::cargo_bin("attr-discovery")
        .expect("binary")
        .arg("ranks")
        .arg("--input")
        .arg(corpus.path())
        .arg("--ranks")
        .arg(&ranks_path)
        .assert()
        .success();
    assert!(ranks_path.exists());

    run_discover(
        corpus.path(),
        output.path(),
        &["--ranks", ranks_path.to_str().expect("utf8 path")],
    );
    assert!(output.path().join("attribute_clusters.json").exists());
}

#[test]
fn invalid_quantiles_fail_before_any_work() {
    let corpus = tempdir().expect("corpus dir");
    let output = tempdir().expect("output dir");
    write_corpus(corpus.path());

    Command::cargo_bin("attr-discovery")
        .expect("binary")
        .arg("discover")
        .arg("--input")
        .arg(corpus.path())
        .arg("--output")
        .arg(output.path())
        .args(["--quantiles", "0", "--threshold1", "0.1", "--threshold2", "0.1"])
        .assert()
        .failure()
        .stderr(contains("quantiles"));
    assert!(!output.path().join("attribute_clusters.json").exists());
}

#[test]
fn missing_threshold_arguments_are_rejected() {
    let corpus = tempdir().expect("corpus dir");
    Command::cargo_bin("attr-discovery")
        .expect("binary")
        .arg("discover")
        .arg("--input")
        .arg(corpus.path())
        .arg("--output")
        .arg(corpus.path())
        .args(["--quantiles", "4"])
        .assert()
        .failure();
}
