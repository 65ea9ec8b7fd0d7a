use thiserror::Error;

use crate::data::ColumnKey;

/// Typed failures surfaced by the discovery core. CLI-level I/O errors stay
/// on the `anyhow` chain; these are the conditions callers must branch on.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Rejected before any comparison work starts.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The `table__column` naming convention was violated. This is an
    /// internal data-integrity error and aborts the run.
    #[error("malformed column key '{0}': expected 'table__column' with no '__' inside either name")]
    MalformedColumnKey(String),

    /// A pre-built rank index covers none of a column's values, so no
    /// histogram can be formed for it. Rebuilding the index over the
    /// current corpus is the fix.
    #[error("rank index covers no values of column '{0}'; rebuild it over the current corpus")]
    UncoveredColumn(ColumnKey),

    /// The correlation-clustering program did not return an optimal integral
    /// solution for one cluster. Carries the member keys so the caller can
    /// report which cluster was lost.
    #[error("correlation solver failed for cluster [{}]: {reason}", format_members(.cluster))]
    Solver {
        cluster: Vec<ColumnKey>,
        reason: String,
    },
}

fn format_members(members: &[ColumnKey]) -> String {
    members
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
