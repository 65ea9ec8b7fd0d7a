//! Per-column state: identity, raw values, global ranks, and the lazily
//! built standalone histogram.

use std::sync::OnceLock;

use crate::{
    data::{ColumnKey, DataType, Value},
    histogram::{Binning, QuantileHistogram},
    ranks::RankIndex,
};

/// One column of one table, immutable once constructed apart from the cached
/// histogram. Safe to share read-only across parallel comparison workers.
#[derive(Debug)]
pub struct Column {
    key: ColumnKey,
    values: Vec<Value>,
    data_type: DataType,
    /// Ranks resolved through the injected index, sorted ascending.
    ranks: Vec<f64>,
    histogram: OnceLock<QuantileHistogram>,
}

impl Column {
    pub fn new(key: ColumnKey, values: Vec<Value>, data_type: DataType, index: &RankIndex) -> Self {
        let mut ranks: Vec<f64> = values
            .iter()
            .filter_map(|value| index.rank(value))
            .map(f64::from)
            .collect();
        ranks.sort_by(f64::total_cmp);
        Self {
            key,
            values,
            data_type,
            ranks,
            histogram: OnceLock::new(),
        }
    }

    pub fn key(&self) -> &ColumnKey {
        &self.key
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn ranks(&self) -> &[f64] {
        &self.ranks
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// The column's standalone histogram, built on first use. All callers in
    /// one run pass the same configuration, so the first build wins.
    pub fn histogram(&self, quantiles: usize, binning: Binning) -> &QuantileHistogram {
        self.histogram
            .get_or_init(|| QuantileHistogram::from_ranks(&self.ranks, quantiles, binning))
    }
}
