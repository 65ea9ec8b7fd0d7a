//! Library-level pipeline properties over in-memory tables.

use attr_discovery::data::{Value, infer_data_type};
use attr_discovery::histogram::Binning;
use attr_discovery::ingest::{RawColumn, Table};
use attr_discovery::pipeline::{Discovery, DiscoveryConfig, FailurePolicy};
use attr_discovery::ranks::RankIndex;
use attr_discovery::threshold::CutoffPolicy;

fn raw_column(name: &str, raw: &[&str]) -> RawColumn {
    let values: Vec<Value> = raw.iter().map(|v| Value::parse(v).expect("value")).collect();
    let data_type = infer_data_type(&values);
    RawColumn {
        name: name.to_string(),
        values,
        data_type,
    }
}

fn corpus_index(tables: &[&Table]) -> RankIndex {
    let union: Vec<Value> = tables
        .iter()
        .flat_map(|table| table.columns.iter())
        .flat_map(|column| column.values.iter())
        .cloned()
        .collect();
    RankIndex::build(&union)
}

fn config(threshold1: f64) -> DiscoveryConfig {
    DiscoveryConfig {
        quantiles: 4,
        threshold1,
        threshold2: 0.1,
        policy: CutoffPolicy::LargestGap,
        binning: Binning::EqualFrequency,
        on_solver_failure: FailurePolicy::Abort,
    }
}

fn spread_table() -> Table {
    Table {
        name: "t".to_string(),
        columns: vec![
            raw_column("x1", &["1", "2", "3", "4", "5", "6", "7", "8"]),
            raw_column("x2", &["1", "2", "3", "4", "5", "6", "7", "8"]),
            raw_column("x3", &["1", "1", "2", "2", "3", "3", "4", "4"]),
            raw_column("x4", &["5", "5", "6", "6", "7", "7", "8", "8"]),
            raw_column("x5", &["20", "21", "22", "23"]),
        ],
    }
}

fn distribution_clusters(table: &Table, threshold1: f64) -> Vec<Vec<String>> {
    let index = corpus_index(&[table]);
    let mut discovery = Discovery::new(config(threshold1)).expect("config");
    discovery.add_table(table, &index).expect("add table");
    let outcome = discovery.find_matches(&index).expect("find matches");
    outcome
        .distribution_clusters
        .iter()
        .map(|cluster| cluster.iter().map(ToString::to_string).collect())
        .collect()
}

/// Raising `threshold1` only ever coarsens the distribution clustering:
/// every cluster found under a strict threshold stays inside one cluster of
/// the permissive run.
#[test]
fn permissive_threshold_refines_into_coarser_clusters() {
    let table = spread_table();
    let strict = distribution_clusters(&table, 0.01);
    let permissive = distribution_clusters(&table, 10.0);

    assert!(strict.len() >= permissive.len());
    for cluster in &strict {
        let contained = permissive.iter().any(|coarse| {
            cluster.iter().all(|member| coarse.contains(member))
        });
        assert!(contained, "cluster {cluster:?} was split by a larger threshold");
    }
}

/// Identical columns cluster together even under the strictest threshold,
/// and the far-away column stays a singleton under a permissive one.
#[test]
fn identical_columns_always_pair_and_outliers_stay_out() {
    let table = spread_table();

    let strict = distribution_clusters(&table, 0.01);
    let twins = strict
        .iter()
        .find(|cluster| cluster.contains(&"t__x1".to_string()))
        .expect("x1 cluster");
    assert!(twins.contains(&"t__x2".to_string()));

    let permissive = distribution_clusters(&table, 10.0);
    let outlier = permissive
        .iter()
        .find(|cluster| cluster.contains(&"t__x5".to_string()))
        .expect("x5 cluster");
    assert_eq!(outlier.len(), 1, "disjoint support must stay isolated");
}

/// Attribute clustering refines a distribution cluster whose members share
/// support with a hub column but not with each other.
#[test]
fn attribute_stage_keeps_partition_coverage() {
    let table = Table {
        name: "s".to_string(),
        columns: vec![
            raw_column("low", &["1", "2", "3", "4"]),
            raw_column("mid", &["3", "4", "5", "6"]),
            raw_column("high", &["5", "6", "7", "8"]),
            raw_column("far", &["100", "101", "102", "103"]),
        ],
    };
    let index = corpus_index(&[&table]);
    let mut discovery = Discovery::new(config(5.0)).expect("config");
    discovery.add_table(&table, &index).expect("add table");
    let outcome = discovery.find_matches(&index).expect("find matches");

    let mut members: Vec<String> = outcome
        .attribute_clusters
        .iter()
        .flatten()
        .map(ToString::to_string)
        .collect();
    members.sort();
    assert_eq!(members, ["s__far", "s__high", "s__low", "s__mid"]);
    assert!(outcome.failed_clusters.is_empty());
}
