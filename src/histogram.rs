use std::collections::btree_map;
use std::collections::BTreeMap;

/// Frequency of every count value observed so far plus the running aggregates
/// the summary builders report. The map is ordered so the percentile walk can
/// scan buckets in ascending count order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CountHistogram {
    frequencies: BTreeMap<u64, u32>,
    total_count: u64,
    num_counts: u64,
    max_count: u64,
}

impl CountHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds a single observation in. No validation happens here, callers
    /// filter out sentinel values before calling.
    pub fn add_count(&mut self, count: u64) {
        self.total_count = self.total_count.saturating_add(count);
        self.num_counts += 1;
        if count > self.max_count {
            self.max_count = count;
        }
        self.frequencies
            .entry(count)
            .and_modify(|x| *x += 1)
            .or_insert(1);
    }

    /// Combines the observations from another histogram into this one.
    /// Histograms built over disjoint partitions of a profile can be merged
    /// and summarised once, which matches aggregating the whole profile into
    /// a single histogram.
    pub fn merge(&mut self, other: &Self) {
        for (count, freq) in other.frequencies.iter() {
            self.frequencies
                .entry(*count)
                .and_modify(|x| *x += *freq)
                .or_insert(*freq);
        }
        self.total_count = self.total_count.saturating_add(other.total_count);
        self.num_counts += other.num_counts;
        if other.max_count > self.max_count {
            self.max_count = other.max_count;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Sum of count times frequency over every bucket, saturating at
    /// `u64::MAX`.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Number of observations folded in so far.
    pub fn num_counts(&self) -> u64 {
        self.num_counts
    }

    pub fn max_count(&self) -> u64 {
        self.max_count
    }

    /// Buckets of `(count, frequency)` in ascending count order.
    pub fn iter(&self) -> btree_map::Iter<'_, u64, u32> {
        self.frequencies.iter()
    }
}
