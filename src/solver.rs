//! Correlation clustering as a binary integer program.
//!
//! One binary variable `x_ij` exists for every ordered pair of cluster
//! members, including the diagonal; `x_ij = 0` means "same final cluster".
//! The objective penalizes splitting agreeing pairs and merging disagreeing
//! pairs. Triangle-consistency constraints are deliberately omitted,
//! matching the baseline formulation; the objective is separable, so a
//! feasible integral optimum always exists.

use good_lp::{Expression, Solution, SolverModel, Variable, default_solver, variable, variables};
use log::debug;

use crate::{attribute::SignedGraph, error::DiscoveryError};

/// The solver's same/different decision per unordered member pair.
#[derive(Debug)]
pub struct ClusterAssignment {
    /// Index pairs (i < j) assigned to the same cluster.
    same_pairs: Vec<(usize, usize)>,
}

impl ClusterAssignment {
    pub fn same_pairs(&self) -> &[(usize, usize)] {
        &self.same_pairs
    }
}

pub fn solve(graph: &SignedGraph) -> Result<ClusterAssignment, DiscoveryError> {
    let n = graph.len();
    let mut problem = variables!();
    let mut x: Vec<Variable> = Vec::with_capacity(n * n);
    for _ in 0..n * n {
        x.push(problem.add(variable().integer().min(0).max(1)));
    }

    let mut objective = Expression::from(0.0);
    for i in 0..n {
        for j in 0..n {
            let var = x[i * n + j];
            if graph.sign(i, j) > 0 {
                // Splitting an agreeing pair costs x_ij.
                objective += var;
            } else {
                // Merging a disagreeing pair costs 1 - x_ij.
                objective += Expression::from(1.0) - var;
            }
        }
    }

    let solution = problem
        .minimise(objective)
        .using(default_solver)
        .solve()
        .map_err(|err| DiscoveryError::Solver {
            cluster: graph.members().to_vec(),
            reason: err.to_string(),
        })?;

    // A diagonal variable solving to 1 would mean a column is not its own
    // cluster-mate, which can only come from a non-optimal solution.
    for i in 0..n {
        if solution.value(x[i * n + i]) > 0.5 {
            return Err(DiscoveryError::Solver {
                cluster: graph.members().to_vec(),
                reason: format!("diagonal variable x_{i}{i} did not solve to 0"),
            });
        }
    }

    let mut same_pairs = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            let forward = solution.value(x[i * n + j]) < 0.5;
            let backward = solution.value(x[j * n + i]) < 0.5;
            if forward || backward {
                same_pairs.push((i, j));
            }
        }
    }
    debug!(
        "Solved correlation clustering over {} column(s): {} same-cluster pair(s)",
        n,
        same_pairs.len()
    );
    Ok(ClusterAssignment { same_pairs })
}
