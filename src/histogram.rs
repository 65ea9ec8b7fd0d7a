//! Quantile histograms over ranked column values.
//!
//! A histogram summarizes one column as `q` bins along the global rank axis.
//! Two construction modes exist: a standalone build that derives bin
//! boundaries from the column's own sorted ranks, and a reference-aligned
//! build that scans a second column's ranks through an existing histogram's
//! boundaries so the two share a bin axis and EMD between them is
//! well-defined. The ground-distance matrix between bins is computed once per
//! histogram as the absolute difference between bin representative values.

use clap::ValueEnum;

/// How standalone bin boundaries are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Binning {
    /// Boundaries at rank quantiles, so bins hold roughly equal counts.
    EqualFrequency,
    /// Boundaries evenly spaced between the smallest and largest rank.
    EqualWidth,
}

#[derive(Debug, Clone)]
pub struct QuantileHistogram {
    /// `q + 1` non-decreasing bin boundaries on the rank axis.
    bounds: Vec<f64>,
    /// Representative rank value per bin.
    values: Vec<f64>,
    weights: Vec<f64>,
    total: f64,
    /// Row-major `q × q` ground distances between bin representatives.
    dist: Vec<f64>,
}

impl QuantileHistogram {
    /// Builds a histogram from a column's own sorted ranks.
    ///
    /// Columns with fewer distinct ranks than `quantiles` produce zero-weight
    /// bins; those are retained but contribute no mass.
    pub fn from_ranks(sorted_ranks: &[f64], quantiles: usize, binning: Binning) -> Self {
        debug_assert!(!sorted_ranks.is_empty());
        debug_assert!(quantiles >= 1);
        let n = sorted_ranks.len();
        let lo = sorted_ranks[0];
        let hi = sorted_ranks[n - 1];

        let mut bounds = Vec::with_capacity(quantiles + 1);
        match binning {
            Binning::EqualFrequency => {
                for i in 0..quantiles {
                    bounds.push(sorted_ranks[i * n / quantiles]);
                }
                bounds.push(hi);
            }
            Binning::EqualWidth => {
                let step = (hi - lo) / quantiles as f64;
                for i in 0..quantiles {
                    bounds.push(lo + step * i as f64);
                }
                bounds.push(hi);
            }
        }

        let mut histogram = Self {
            bounds,
            values: vec![0.0; quantiles],
            weights: vec![0.0; quantiles],
            total: 0.0,
            dist: Vec::new(),
        };
        let mut sums = vec![0.0; quantiles];
        for &rank in sorted_ranks {
            if let Some(bin) = histogram.bin_of(rank) {
                histogram.weights[bin] += 1.0;
                sums[bin] += rank;
                histogram.total += 1.0;
            }
        }
        for bin in 0..quantiles {
            histogram.values[bin] = if histogram.weights[bin] > 0.0 {
                sums[bin] / histogram.weights[bin]
            } else {
                (histogram.bounds[bin] + histogram.bounds[bin + 1]) / 2.0
            };
        }
        histogram.dist = ground_distances(&histogram.values);
        histogram
    }

    /// Builds a histogram for `sorted_ranks` on this histogram's bin axis.
    ///
    /// Ranks outside the reference range are dropped; if nothing lands in any
    /// bin the result is empty, signalling no meaningful overlap.
    pub fn aligned(&self, sorted_ranks: &[f64]) -> Self {
        let mut histogram = Self {
            bounds: self.bounds.clone(),
            values: self.values.clone(),
            weights: vec![0.0; self.len()],
            total: 0.0,
            dist: self.dist.clone(),
        };
        for &rank in sorted_ranks {
            if let Some(bin) = histogram.bin_of(rank) {
                histogram.weights[bin] += 1.0;
                histogram.total += 1.0;
            }
        }
        histogram
    }

    /// Bin index for a rank, or `None` when it falls outside the bounds.
    /// Bins are half-open except the last, which includes the upper bound.
    fn bin_of(&self, rank: f64) -> Option<usize> {
        let quantiles = self.len();
        if rank < self.bounds[0] || rank > self.bounds[quantiles] {
            return None;
        }
        let inner = &self.bounds[1..quantiles];
        Some(inner.partition_point(|bound| *bound <= rank))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0.0
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Weights scaled to unit mass. Must not be called on an empty histogram.
    pub fn normalized_weights(&self) -> Vec<f64> {
        debug_assert!(self.total > 0.0);
        self.weights.iter().map(|w| w / self.total).collect()
    }

    /// Ground distance between two bins.
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.dist[i * self.len() + j]
    }
}

fn ground_distances(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut dist = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            dist[i * n + j] = (values[i] - values[j]).abs();
        }
    }
    dist
}
