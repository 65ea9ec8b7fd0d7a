//! Adaptive per-column cutoff derivation.
//!
//! Every column sees a vector of distances to its peers. A single global
//! threshold parameter is turned into a local cutoff per column by a
//! pluggable policy; an edge between two columns is accepted only when the
//! distance sits at or below **both** endpoints' cutoffs, so every edge is
//! mutually endorsed.

use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CutoffPolicy {
    /// The default rule: append the global threshold as a sentinel, sort the
    /// distances, and return the left endpoint of the widest gap between
    /// consecutive entries that stay at or below the threshold. Falls back
    /// to 0.0 when no distance is below the threshold.
    LargestGap,
    /// Mean minus threshold × standard deviation over the finite distances.
    MeanStd,
}

impl CutoffPolicy {
    /// Derives one column's local cutoff from its distance vector. Infinite
    /// distances (no-overlap comparisons) never influence the cutoff and are
    /// never accepted by it.
    pub fn cutoff(&self, distances: &[f64], threshold: f64) -> f64 {
        match self {
            CutoffPolicy::LargestGap => largest_gap_cutoff(distances, threshold),
            CutoffPolicy::MeanStd => mean_std_cutoff(distances, threshold),
        }
    }

    /// Whether an edge with this distance is endorsed by both cutoffs.
    pub fn accepts(distance: f64, cutoff_a: f64, cutoff_b: f64) -> bool {
        distance <= cutoff_a && distance <= cutoff_b
    }
}

fn largest_gap_cutoff(distances: &[f64], threshold: f64) -> f64 {
    let mut sorted: Vec<f64> = distances.to_vec();
    sorted.push(threshold);
    sorted.sort_by(f64::total_cmp);

    let mut cutoff = 0.0;
    let mut widest = 0.0;
    for pair in sorted.windows(2) {
        if pair[1] > threshold {
            break;
        }
        let gap = pair[1] - pair[0];
        if gap > widest {
            widest = gap;
            cutoff = pair[0];
        }
    }
    cutoff
}

fn mean_std_cutoff(distances: &[f64], threshold: f64) -> f64 {
    let finite: Vec<f64> = distances.iter().copied().filter(|d| d.is_finite()).collect();
    if finite.is_empty() {
        return f64::NEG_INFINITY;
    }
    let mean = finite.iter().sum::<f64>() / finite.len() as f64;
    if finite.len() < 2 {
        return mean;
    }
    let variance = finite
        .iter()
        .map(|d| (d - mean) * (d - mean))
        .sum::<f64>()
        / (finite.len() as f64 - 1.0);
    mean - threshold * variance.max(0.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn largest_gap_separates_near_from_far() {
        // One tight group near zero, one stray peer; the widest sub-threshold
        // gap opens right after the tight group.
        let distances = [0.01, 0.02, 0.25, 9.0];
        let cutoff = CutoffPolicy::LargestGap.cutoff(&distances, 0.3);
        assert_eq!(cutoff, 0.02);
        assert!(CutoffPolicy::accepts(0.02, cutoff, cutoff));
        assert!(!CutoffPolicy::accepts(0.25, cutoff, cutoff));
    }

    #[test]
    fn largest_gap_is_zero_when_nothing_is_below_threshold() {
        let distances = [5.0, 7.0, f64::INFINITY];
        assert_eq!(CutoffPolicy::LargestGap.cutoff(&distances, 0.5), 0.0);
    }

    #[test]
    fn infinite_distances_are_never_accepted() {
        let distances = [0.1, f64::INFINITY];
        let cutoff = CutoffPolicy::LargestGap.cutoff(&distances, 0.5);
        assert!(!CutoffPolicy::accepts(f64::INFINITY, cutoff, cutoff));
    }

    #[test]
    fn mean_std_with_no_finite_distances_rejects_everything() {
        let distances = [f64::INFINITY, f64::INFINITY];
        let cutoff = CutoffPolicy::MeanStd.cutoff(&distances, 0.1);
        assert!(!CutoffPolicy::accepts(0.0, cutoff, cutoff));
    }

    #[test]
    fn edges_require_mutual_endorsement() {
        assert!(CutoffPolicy::accepts(0.1, 0.2, 0.15));
        assert!(!CutoffPolicy::accepts(0.1, 0.2, 0.05));
    }

    proptest! {
        /// Raising the global threshold never lowers a column's cutoff, which
        /// is what makes distribution clusters grow monotonically with the
        /// threshold.
        #[test]
        fn largest_gap_cutoff_is_monotone_in_threshold(
            mut distances in proptest::collection::vec(0.0f64..10.0, 1..12),
            threshold in 0.0f64..10.0,
            bump in 0.0f64..5.0,
        ) {
            distances.sort_by(f64::total_cmp);
            let lower = CutoffPolicy::LargestGap.cutoff(&distances, threshold);
            let higher = CutoffPolicy::LargestGap.cutoff(&distances, threshold + bump);
            prop_assert!(higher >= lower);
        }
    }
}
