//! Undirected similarity graph and connected-component extraction.
//!
//! The vertex set is always the complete set of keys passed in, so columns
//! with no accepted edge come back as singleton components. Component
//! membership depends only on the edge set, never on iteration order;
//! members and components are returned sorted so downstream output is
//! deterministic.

use std::collections::HashMap;

use petgraph::unionfind::UnionFind;

use crate::data::ColumnKey;

pub fn connected_components(
    keys: &[ColumnKey],
    edges: &[(ColumnKey, ColumnKey)],
) -> Vec<Vec<ColumnKey>> {
    let positions: HashMap<&ColumnKey, usize> = keys
        .iter()
        .enumerate()
        .map(|(idx, key)| (key, idx))
        .collect();

    let mut sets: UnionFind<usize> = UnionFind::new(keys.len());
    for (a, b) in edges {
        if let (Some(&i), Some(&j)) = (positions.get(a), positions.get(b)) {
            sets.union(i, j);
        }
    }

    let mut grouped: HashMap<usize, Vec<ColumnKey>> = HashMap::new();
    for (idx, key) in keys.iter().enumerate() {
        grouped.entry(sets.find(idx)).or_default().push(key.clone());
    }

    let mut components: Vec<Vec<ColumnKey>> = grouped.into_values().collect();
    for component in &mut components {
        component.sort();
    }
    components.sort();
    components
}
