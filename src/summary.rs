use crate::histogram::CountHistogram;
use crate::Kind;
use std::fmt;

/// Cutoff values are percentiles scaled up by this factor, so a cutoff of
/// 500000 asks for the median.
pub const SCALE: u64 = 1_000_000;

/// The cutoff set `llvm-profdata` uses when none is given: 1%, each 10% band,
/// then the progressively hotter 95/99/99.9/99.99/99.999/99.9999% tail.
pub const DEFAULT_CUTOFFS: [u32; 16] = [
    10_000, 100_000, 200_000, 300_000, 400_000, 500_000, 600_000, 700_000, 800_000, 900_000,
    950_000, 990_000, 999_000, 999_900, 999_990, 999_999,
];

/// One row of the detailed summary: the smallest count value at which the
/// cumulative counts reach `cutoff`/[`SCALE`] of the total, and the number of
/// observations at or below that value.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ProfileSummaryEntry {
    pub cutoff: u32,
    pub min_count: u64,
    pub num_counts: u64,
}

/// The finalised statistics for a whole profile. Produced once by a summary
/// builder and read-only from then on.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProfileSummary {
    kind: Kind,
    detailed_summary: Vec<ProfileSummaryEntry>,
    total_count: u64,
    max_count: u64,
    max_internal_block_count: u64,
    max_function_count: u64,
    num_counts: u64,
    num_functions: u64,
}

impl ProfileSummary {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        kind: Kind,
        detailed_summary: Vec<ProfileSummaryEntry>,
        total_count: u64,
        max_count: u64,
        max_internal_block_count: u64,
        max_function_count: u64,
        num_counts: u64,
        num_functions: u64,
    ) -> Self {
        Self {
            kind,
            detailed_summary,
            total_count,
            max_count,
            max_internal_block_count,
            max_function_count,
            num_counts,
            num_functions,
        }
    }

    /// Returns the entry for the smallest precomputed cutoff at least as large
    /// as `percentile`. The table only holds the cutoffs it was built with, so
    /// when the exact percentile is missing the answer rounds up to the next
    /// one, a conservative over-approximation.
    ///
    /// # Panics
    ///
    /// Panics when `percentile` exceeds the largest cutoff in the table, the
    /// summary was built with too little resolution to answer and that is a
    /// contract violation between builder and consumer.
    pub fn entry_for(&self, percentile: u64) -> &ProfileSummaryEntry {
        let idx = self
            .detailed_summary
            .partition_point(|entry| (entry.cutoff as u64) < percentile);
        match self.detailed_summary.get(idx) {
            Some(entry) => entry,
            None => panic!("desired percentile {} exceeds the maximum cutoff", percentile),
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Rows ordered by ascending cutoff; `min_count` and `num_counts` are
    /// non-decreasing across them.
    pub fn detailed_summary(&self) -> &[ProfileSummaryEntry] {
        &self.detailed_summary
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn max_count(&self) -> u64 {
        self.max_count
    }

    /// Largest non-entry counter seen. Always zero for sample profiles.
    pub fn max_internal_block_count(&self) -> u64 {
        self.max_internal_block_count
    }

    pub fn max_function_count(&self) -> u64 {
        self.max_function_count
    }

    pub fn num_counts(&self) -> u64 {
        self.num_counts
    }

    pub fn num_functions(&self) -> u64 {
        self.num_functions
    }
}

impl fmt::Display for ProfileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total functions: {}", self.num_functions)?;
        writeln!(f, "Maximum function count: {}", self.max_function_count)?;
        if self.kind == Kind::Instr {
            writeln!(
                f,
                "Maximum internal block count: {}",
                self.max_internal_block_count
            )?;
        }
        writeln!(f, "Detailed summary:")?;
        writeln!(f, "Total number of blocks: {}", self.num_counts)?;
        writeln!(f, "Total count: {}", self.total_count)?;
        for entry in &self.detailed_summary {
            writeln!(
                f,
                "{} blocks with count >= {} account for {} percentage of the total counts.",
                entry.num_counts,
                entry.min_count,
                entry.cutoff as f64 / (SCALE as f64 / 100.0),
            )?;
        }
        Ok(())
    }
}

/// Walks the histogram once in ascending count order and emits one
/// [`ProfileSummaryEntry`] per cutoff. Cutoffs are sorted first so the cursor
/// never needs to rewind; each target is reached by folding further buckets
/// into the running sums.
///
/// # Panics
///
/// Panics when `cutoffs` is non-empty and the histogram holds no observations,
/// no target can be satisfied in that case.
pub fn compute_detailed_summary(
    hist: &CountHistogram,
    mut cutoffs: Vec<u32>,
) -> Vec<ProfileSummaryEntry> {
    if cutoffs.is_empty() {
        return Vec::new();
    }
    assert!(
        !hist.is_empty(),
        "detailed summary requested over an empty histogram"
    );
    cutoffs.sort_unstable();

    let mut iter = hist.iter();
    let mut counts_seen = 0u64;
    let mut curr_sum = 0u64;
    let mut count = 0u64;

    let mut detailed_summary = Vec::with_capacity(cutoffs.len());
    for cutoff in cutoffs {
        debug_assert!(cutoff < SCALE as u32);
        // The product overflows 64 bits for large totals so the target is
        // computed at 128 bits and narrowed afterwards.
        let desired_count =
            ((hist.total_count() as u128 * cutoff as u128) / SCALE as u128) as u64;
        debug_assert!(desired_count <= hist.total_count());
        while curr_sum < desired_count {
            match iter.next() {
                Some((c, freq)) => {
                    count = *c;
                    curr_sum = curr_sum.saturating_add(count.saturating_mul(*freq as u64));
                    counts_seen += *freq as u64;
                }
                None => break,
            }
        }
        assert!(curr_sum >= desired_count);
        detailed_summary.push(ProfileSummaryEntry {
            cutoff,
            min_count: count,
            num_counts: counts_seen,
        });
    }
    detailed_summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn histogram(buckets: &[(u64, u32)]) -> CountHistogram {
        let mut hist = CountHistogram::new();
        for (count, freq) in buckets {
            for _ in 0..*freq {
                hist.add_count(*count);
            }
        }
        hist
    }

    fn summary_over(buckets: &[(u64, u32)], cutoffs: Vec<u32>) -> ProfileSummary {
        let hist = histogram(buckets);
        let detailed = compute_detailed_summary(&hist, cutoffs);
        ProfileSummary::new(
            Kind::Instr,
            detailed,
            hist.total_count(),
            hist.max_count(),
            0,
            0,
            hist.num_counts(),
            0,
        )
    }

    #[test]
    fn detailed_summary_table() {
        let hist = histogram(&[(1, 100), (5, 50), (100, 1)]);
        assert_eq!(hist.total_count(), 450);
        assert_eq!(hist.num_counts(), 151);

        // Deliberately unsorted, the computation orders them itself.
        let entries = compute_detailed_summary(&hist, vec![999_999, 10_000, 500_000]);
        assert_eq!(
            entries,
            vec![
                ProfileSummaryEntry {
                    cutoff: 10_000,
                    min_count: 1,
                    num_counts: 100
                },
                ProfileSummaryEntry {
                    cutoff: 500_000,
                    min_count: 5,
                    num_counts: 150
                },
                ProfileSummaryEntry {
                    cutoff: 999_999,
                    min_count: 100,
                    num_counts: 151
                },
            ]
        );
    }

    #[test]
    fn targets_are_exact_near_u64_max() {
        let mut hist = CountHistogram::new();
        hist.add_count(5);
        hist.add_count(u64::MAX - 5);
        assert_eq!(hist.total_count(), u64::MAX);

        // A wrapping 64 bit product would make the target tiny and stop the
        // walk at the first bucket.
        let entries = compute_detailed_summary(&hist, vec![999_999]);
        assert_eq!(entries[0].min_count, u64::MAX - 5);
        assert_eq!(entries[0].num_counts, 2);
    }

    #[test]
    fn entries_are_monotonic() {
        let hist = histogram(&[(1, 1000), (2, 500), (3, 80), (10, 30), (1000, 4), (5000, 1)]);
        let entries = compute_detailed_summary(&hist, DEFAULT_CUTOFFS.to_vec());
        assert_eq!(entries.len(), DEFAULT_CUTOFFS.len());
        for pair in entries.windows(2) {
            assert!(pair[0].cutoff < pair[1].cutoff);
            assert!(pair[0].min_count <= pair[1].min_count);
            assert!(pair[0].num_counts <= pair[1].num_counts);
        }
    }

    #[test]
    fn no_cutoffs_no_entries() {
        let entries = compute_detailed_summary(&CountHistogram::new(), vec![]);
        assert!(entries.is_empty());
    }

    #[test]
    #[should_panic(expected = "empty histogram")]
    fn empty_histogram_is_fatal() {
        compute_detailed_summary(&CountHistogram::new(), vec![500_000]);
    }

    #[test]
    fn lookup_rounds_up_to_next_cutoff() {
        let summary = summary_over(
            &[(1, 100), (5, 50), (100, 1)],
            vec![10_000, 500_000, 999_999],
        );

        assert_eq!(summary.entry_for(400_000).cutoff, 500_000);
        assert_eq!(summary.entry_for(400_000).min_count, 5);
        assert_eq!(summary.entry_for(500_000).cutoff, 500_000);
        assert_eq!(summary.entry_for(999_999).min_count, 100);
        assert_eq!(summary.entry_for(1).cutoff, 10_000);
    }

    #[test]
    #[should_panic(expected = "exceeds the maximum cutoff")]
    fn lookup_beyond_table_is_fatal() {
        let summary = summary_over(&[(1, 1)], vec![10_000, 999_999]);
        summary.entry_for(1_000_000);
    }
}
