//! Signed attribute graph for one distribution cluster.
//!
//! Within a cluster, each column derives a neighbor set from its
//! intersection-EMD distances via the local cutoff policy. The 0/1 adjacency
//! matrix `E` (diagonal forced to 1) is closed over 2-hop paths,
//! `M = E + E·E`, so the optimizer also sees agreement reachable through one
//! intermediate column; `M > 0` labels a pair +1, otherwise -1.

use crate::{data::ColumnKey, threshold::CutoffPolicy};

/// Full signed `n × n` agreement graph, diagonal always +1.
#[derive(Debug)]
pub struct SignedGraph {
    members: Vec<ColumnKey>,
    signs: Vec<i8>,
}

impl SignedGraph {
    pub fn members(&self) -> &[ColumnKey] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn sign(&self, i: usize, j: usize) -> i8 {
        self.signs[i * self.members.len() + j]
    }
}

/// Builds the signed graph from the symmetric intersection-EMD distance
/// matrix of one cluster (`distances[i][j]`, diagonal unused).
pub fn build_signed_graph(
    members: Vec<ColumnKey>,
    distances: &[Vec<f64>],
    policy: CutoffPolicy,
    threshold: f64,
) -> SignedGraph {
    let n = members.len();
    let mut adjacency = vec![0u32; n * n];

    for i in 0..n {
        let peers: Vec<f64> = (0..n)
            .filter(|j| *j != i)
            .map(|j| distances[i][j])
            .collect();
        let cutoff = policy.cutoff(&peers, threshold);
        for j in 0..n {
            if j != i && distances[i][j] <= cutoff {
                adjacency[i * n + j] = 1;
            }
        }
        // A column always neighbors itself.
        adjacency[i * n + i] = 1;
    }

    // M = E + E·E: direct edges plus paths through one intermediate.
    let mut closure = vec![0u32; n * n];
    for i in 0..n {
        for j in 0..n {
            let mut paths = adjacency[i * n + j];
            for k in 0..n {
                paths += adjacency[i * n + k] * adjacency[k * n + j];
            }
            closure[i * n + j] = paths;
        }
    }

    let signs = closure
        .iter()
        .map(|&reachable| if reachable > 0 { 1 } else { -1 })
        .collect();
    SignedGraph { members, signs }
}
