//! JSON cluster reports.
//!
//! Each report is a single JSON object mapping `"Cluster N"` labels to the
//! member column keys in `table__column` form. Clusters are sorted by
//! descending member count before labeling, with a lexicographic tie-break on
//! the first member so labels are stable across runs.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;

use crate::data::ColumnKey;

pub fn cluster_report(clusters: &[Vec<ColumnKey>]) -> IndexMap<String, Vec<String>> {
    let mut ordered: Vec<&Vec<ColumnKey>> = clusters.iter().collect();
    ordered.sort_by(|a, b| {
        b.len()
            .cmp(&a.len())
            .then_with(|| a.first().cmp(&b.first()))
    });

    ordered
        .iter()
        .enumerate()
        .map(|(idx, cluster)| {
            let label = format!("Cluster {}", idx + 1);
            let members = cluster.iter().map(ToString::to_string).collect();
            (label, members)
        })
        .collect()
}

pub fn write_report(path: &Path, clusters: &[Vec<ColumnKey>]) -> Result<()> {
    let report = cluster_report(clusters);
    let file = File::create(path).with_context(|| format!("Creating report file {path:?}"))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &report)
        .with_context(|| format!("Writing report to {path:?}"))
}
