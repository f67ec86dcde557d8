use crate::histogram::CountHistogram;
use crate::instrumentation_profile::types::*;
use crate::summary::{compute_detailed_summary, ProfileSummary, DEFAULT_CUTOFFS};
use crate::Kind;
use tracing::debug;

/// Accumulates the counters of an instrumentation profile into a histogram
/// and finalises them into a [`ProfileSummary`]. Finalisation consumes the
/// builder so a summary can only be produced once and the builder can't be
/// mutated afterwards.
#[derive(Clone, Debug)]
pub struct InstrProfSummaryBuilder {
    histogram: CountHistogram,
    cutoffs: Vec<u32>,
    num_functions: u64,
    max_function_count: u64,
    max_internal_block_count: u64,
}

impl Default for InstrProfSummaryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InstrProfSummaryBuilder {
    pub fn new() -> Self {
        Self::with_cutoffs(DEFAULT_CUTOFFS.to_vec())
    }

    /// A builder producing entries for the given cutoffs instead of
    /// [`DEFAULT_CUTOFFS`]. The cutoffs don't need to be sorted.
    pub fn with_cutoffs(cutoffs: Vec<u32>) -> Self {
        Self {
            histogram: CountHistogram::new(),
            cutoffs,
            num_functions: 0,
            max_function_count: 0,
            max_internal_block_count: 0,
        }
    }

    /// Folds one function record in, splitting the entry counter from the
    /// internal region counters.
    pub fn add_record(&mut self, record: &InstrProfRecord) {
        if record.counts.is_empty() {
            debug!("skipping record with no counters");
            return;
        }
        self.add_entry_count(record.counts[0]);
        for count in &record.counts[1..] {
            self.add_internal_count(*count);
        }
    }

    fn add_entry_count(&mut self, count: u64) {
        self.num_functions += 1;

        if count == INVALID_COUNT {
            return;
        }
        self.histogram.add_count(count);
        if count > self.max_function_count {
            self.max_function_count = count;
        }
    }

    fn add_internal_count(&mut self, count: u64) {
        if count == INVALID_COUNT {
            return;
        }
        self.histogram.add_count(count);
        if count > self.max_internal_block_count {
            self.max_internal_block_count = count;
        }
    }

    /// Combines the state accumulated by a builder run over a different
    /// partition of the same profile. The detailed summary has to be computed
    /// over the fully merged distribution, tables computed per partition can't
    /// be combined after the fact.
    pub fn merge(&mut self, other: &Self) {
        self.histogram.merge(&other.histogram);
        self.num_functions += other.num_functions;
        self.max_function_count = self.max_function_count.max(other.max_function_count);
        self.max_internal_block_count = self
            .max_internal_block_count
            .max(other.max_internal_block_count);
    }

    pub fn histogram(&self) -> &CountHistogram {
        &self.histogram
    }

    pub fn summary(self) -> ProfileSummary {
        let detailed = compute_detailed_summary(&self.histogram, self.cutoffs);
        ProfileSummary::new(
            Kind::Instr,
            detailed,
            self.histogram.total_count(),
            self.histogram.max_count(),
            self.max_internal_block_count,
            self.max_function_count,
            self.histogram.num_counts(),
            self.num_functions,
        )
    }
}
