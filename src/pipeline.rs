//! Two-stage discovery pipeline.
//!
//! Stages run strictly in order, each fully materialized before the next:
//! distribution clustering (pairwise EMD, adaptive cutoffs, connected
//! components), attribute-graph construction per multi-member cluster
//! (intersection EMD, 2-hop closure), correlation optimization per cluster,
//! and final cluster extraction. Pairwise comparisons fan out over a rayon
//! pool and are collected into a read-only distance table before any
//! clustering decision looks at them; per-cluster optimization fans out the
//! same way.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use clap::ValueEnum;
use itertools::Itertools;
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::{
    attribute::{self, SignedGraph},
    column::Column,
    data::ColumnKey,
    emd,
    error::DiscoveryError,
    graph,
    histogram::Binning,
    ingest::Table,
    ranks::RankIndex,
    solver,
    threshold::CutoffPolicy,
};

/// What to do when one cluster's optimization fails: abort the whole run, or
/// omit that cluster from the output with a logged diagnostic. Never silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FailurePolicy {
    Abort,
    Skip,
}

#[derive(Debug, Clone, Copy)]
pub struct DiscoveryConfig {
    /// Histogram bin count, shared by every comparison.
    pub quantiles: usize,
    /// Global cutoff parameter for distribution clustering.
    pub threshold1: f64,
    /// Global cutoff parameter for attribute-graph construction.
    pub threshold2: f64,
    pub policy: CutoffPolicy,
    pub binning: Binning,
    pub on_solver_failure: FailurePolicy,
}

impl DiscoveryConfig {
    pub fn validate(&self) -> Result<(), DiscoveryError> {
        if self.quantiles == 0 {
            return Err(DiscoveryError::Config(
                "quantiles must be positive".to_string(),
            ));
        }
        for (name, value) in [
            ("threshold1", self.threshold1),
            ("threshold2", self.threshold2),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DiscoveryError::Config(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct DiscoveryOutcome {
    pub distribution_clusters: Vec<Vec<ColumnKey>>,
    pub attribute_clusters: Vec<Vec<ColumnKey>>,
    /// Clusters dropped under [`FailurePolicy::Skip`], by member keys.
    pub failed_clusters: Vec<Vec<ColumnKey>>,
}

pub struct Discovery {
    config: DiscoveryConfig,
    columns: Vec<Column>,
}

impl Discovery {
    pub fn new(config: DiscoveryConfig) -> Result<Self, DiscoveryError> {
        config.validate()?;
        Ok(Self {
            config,
            columns: Vec::new(),
        })
    }

    /// Registers a table's columns, resolving ranks through the injected
    /// index. Column keys are constructed here, exactly once. A pre-built
    /// index that covers none of a column's values is rejected; partial
    /// coverage is tolerated but logged, since dropped values skew the
    /// column's histogram.
    pub fn add_table(&mut self, table: &Table, index: &RankIndex) -> Result<(), DiscoveryError> {
        for raw in &table.columns {
            let key = ColumnKey::new(&table.name, &raw.name)?;
            if raw.values.is_empty() {
                warn!("Skipping empty column {key}");
                continue;
            }
            let column = Column::new(key.clone(), raw.values.clone(), raw.data_type, index);
            if column.ranks().is_empty() {
                return Err(DiscoveryError::UncoveredColumn(key));
            }
            let missing = column.size() - column.ranks().len();
            if missing > 0 {
                warn!(
                    "Rank index is missing {missing} of {} value(s) in column {key}",
                    column.size()
                );
            }
            self.columns.push(column);
        }
        Ok(())
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Runs the full two-stage discovery over every registered column.
    pub fn find_matches(&self, index: &RankIndex) -> Result<DiscoveryOutcome, DiscoveryError> {
        self.find_matches_with(index, solver::solve)
    }

    fn find_matches_with<F>(
        &self,
        index: &RankIndex,
        solve: F,
    ) -> Result<DiscoveryOutcome, DiscoveryError>
    where
        F: Fn(&SignedGraph) -> Result<solver::ClusterAssignment, DiscoveryError> + Sync,
    {
        let keys: Vec<ColumnKey> = self.columns.iter().map(|c| c.key().clone()).collect();

        let started = Instant::now();
        let distribution_clusters = self.distribution_clusters(&keys);
        info!(
            "Computed {} distribution cluster(s) over {} column(s) in {:.2?}",
            distribution_clusters.len(),
            keys.len(),
            started.elapsed()
        );

        let started = Instant::now();
        let (edges, failed_clusters) =
            self.attribute_edges(&distribution_clusters, index, &solve)?;
        info!(
            "Solved attribute graphs for {} multi-member cluster(s) in {:.2?}",
            distribution_clusters
                .iter()
                .filter(|c| c.len() > 1)
                .count(),
            started.elapsed()
        );

        let failed: HashSet<&ColumnKey> = failed_clusters.iter().flatten().collect();
        let surviving: Vec<ColumnKey> = keys
            .iter()
            .filter(|key| !failed.contains(key))
            .cloned()
            .collect();
        let attribute_clusters = graph::connected_components(&surviving, &edges);

        Ok(DiscoveryOutcome {
            distribution_clusters,
            attribute_clusters,
            failed_clusters,
        })
    }

    /// Stage one: pairwise EMD fan-out, per-column cutoffs, mutually endorsed
    /// edges, connected components.
    fn distribution_clusters(&self, keys: &[ColumnKey]) -> Vec<Vec<ColumnKey>> {
        let config = &self.config;
        let n = self.columns.len();
        let pairs: Vec<(usize, usize)> = (0..n).tuple_combinations().collect();

        // Fan out, then aggregate: no clustering decision sees a distance
        // before every comparison of the phase has completed.
        let computed: Vec<((usize, usize), f64)> = pairs
            .par_iter()
            .map(|&(i, j)| {
                let distance = emd::quantile_emd(
                    &self.columns[i],
                    &self.columns[j],
                    config.quantiles,
                    config.binning,
                );
                ((i, j), distance)
            })
            .collect();

        let mut peers: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        for ((i, j), distance) in &computed {
            peers[*i].push((*j, *distance));
            peers[*j].push((*i, *distance));
        }
        let cutoffs: Vec<f64> = peers
            .iter()
            .map(|row| {
                let distances: Vec<f64> = row.iter().map(|(_, d)| *d).collect();
                config.policy.cutoff(&distances, config.threshold1)
            })
            .collect();

        let mut edges = Vec::new();
        for ((i, j), distance) in &computed {
            if CutoffPolicy::accepts(*distance, cutoffs[*i], cutoffs[*j]) {
                edges.push((keys[*i].clone(), keys[*j].clone()));
            }
        }
        debug!(
            "Accepted {} of {} candidate edge(s) in distribution stage",
            edges.len(),
            computed.len()
        );
        graph::connected_components(keys, &edges)
    }

    /// Stages two and three: per multi-member cluster, intersection-EMD
    /// distances, signed graph, correlation solve. Returns the same-cluster
    /// edges plus the clusters dropped under the skip policy.
    #[allow(clippy::type_complexity)]
    fn attribute_edges<F>(
        &self,
        distribution_clusters: &[Vec<ColumnKey>],
        index: &RankIndex,
        solve: &F,
    ) -> Result<(Vec<(ColumnKey, ColumnKey)>, Vec<Vec<ColumnKey>>), DiscoveryError>
    where
        F: Fn(&SignedGraph) -> Result<solver::ClusterAssignment, DiscoveryError> + Sync,
    {
        let config = &self.config;
        let positions: HashMap<&ColumnKey, usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| (column.key(), idx))
            .collect();

        let multi: Vec<&Vec<ColumnKey>> = distribution_clusters
            .iter()
            .filter(|cluster| cluster.len() > 1)
            .collect();

        // Clusters are independent: no cross-cluster variables, no shared
        // mutable state beyond this collected result list.
        let results: Vec<Result<(Vec<ColumnKey>, solver::ClusterAssignment), DiscoveryError>> =
            multi
                .par_iter()
                .map(|cluster| {
                    let indices: Vec<usize> =
                        cluster.iter().map(|key| positions[key]).collect();
                    let m = indices.len();
                    let mut distances = vec![vec![0.0; m]; m];
                    for (a, b) in (0..m).tuple_combinations() {
                        let distance = emd::intersection_emd(
                            &self.columns[indices[a]],
                            &self.columns[indices[b]],
                            config.quantiles,
                            config.binning,
                            index,
                        );
                        distances[a][b] = distance;
                        distances[b][a] = distance;
                    }
                    let signed = attribute::build_signed_graph(
                        (*cluster).clone(),
                        &distances,
                        config.policy,
                        config.threshold2,
                    );
                    solve(&signed).map(|assignment| ((*cluster).clone(), assignment))
                })
                .collect();

        let mut edges = Vec::new();
        let mut failed_clusters = Vec::new();
        for result in results {
            match result {
                Ok((members, assignment)) => {
                    for &(i, j) in assignment.same_pairs() {
                        edges.push((members[i].clone(), members[j].clone()));
                    }
                }
                Err(err) => match config.on_solver_failure {
                    FailurePolicy::Abort => return Err(err),
                    FailurePolicy::Skip => {
                        warn!("Omitting cluster from output: {err}");
                        if let DiscoveryError::Solver { cluster, .. } = err {
                            failed_clusters.push(cluster);
                        }
                    }
                },
            }
        }
        Ok((edges, failed_clusters))
    }
}
