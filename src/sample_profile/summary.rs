use crate::histogram::CountHistogram;
use crate::sample_profile::types::*;
use crate::summary::{compute_detailed_summary, ProfileSummary, DEFAULT_CUTOFFS};
use crate::Kind;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Whether the per-context copies of each function should be collapsed before
/// the summary is computed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ContextMergeMode {
    /// Always collapse context copies.
    On,
    /// Summarise the records exactly as given.
    Off,
    /// Collapse only when the profile is marked context-sensitive. Splitting
    /// a function across its calling contexts flattens the count distribution
    /// and drags the hot thresholds down, so merging first is the default for
    /// those profiles.
    FromProfile,
}

impl Default for ContextMergeMode {
    fn default() -> Self {
        Self::FromProfile
    }
}

/// Accumulates a sample-profile call tree into a histogram and finalises it
/// into a [`ProfileSummary`]. Single use, finalisation consumes the builder.
#[derive(Clone, Debug)]
pub struct SampleProfSummaryBuilder {
    histogram: CountHistogram,
    cutoffs: Vec<u32>,
    num_functions: u64,
    max_function_count: u64,
    probe_based: bool,
}

impl Default for SampleProfSummaryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleProfSummaryBuilder {
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
            probe_based: false,
        }
    }

    /// Marks the incoming records as probe based so [`INVALID_PROBE_COUNT`]
    /// body samples get skipped. [`Self::compute_summary_for_profiles`] sets
    /// this from the profile itself, it only needs calling when records are
    /// fed in by hand.
    pub fn set_probe_based(&mut self, probe_based: bool) {
        self.probe_based = probe_based;
    }

    /// Folds one function record in. Each line with samples counts like a
    /// block does in an instrumented profile. Nested call-site records are
    /// folded in recursively with `is_callsite` set, so their samples reach
    /// the histogram without bumping the function-level stats, those belong
    /// to the enclosing top-level function alone.
    pub fn add_record(&mut self, samples: &FunctionSamples, is_callsite: bool) {
        if !is_callsite {
            self.num_functions += 1;
            if samples.head_samples > self.max_function_count {
                self.max_function_count = samples.head_samples;
            }
        }
        for count in samples.body_samples.values() {
            if self.probe_based && *count == INVALID_PROBE_COUNT {
                continue;
            }
            self.histogram.add_count(*count);
        }
        for targets in samples.callsite_samples.values() {
            for callee in targets.values() {
                self.add_record(callee, true);
            }
        }
    }

    /// Feeds every function of `profile` through the builder and finalises.
    ///
    /// # Panics
    ///
    /// Panics when the builder has already accumulated records, the driver
    /// owns the whole ingestion and requires a fresh builder.
    pub fn compute_summary_for_profiles(
        mut self,
        profile: &SampleProfile,
        mode: ContextMergeMode,
    ) -> ProfileSummary {
        assert!(
            self.num_functions == 0,
            "summary driver requires a freshly constructed builder"
        );
        self.probe_based = profile.is_probe_based;

        let merge_contexts = match mode {
            ContextMergeMode::On => true,
            ContextMergeMode::Off => false,
            ContextMergeMode::FromProfile => profile.is_cs,
        };

        if merge_contexts {
            debug!(
                "collapsing {} context records before summarising",
                profile.functions.len()
            );
            let mut contextless: FxHashMap<&str, FunctionSamples> = FxHashMap::default();
            for samples in profile.functions.values() {
                contextless
                    .entry(samples.name.as_str())
                    .or_insert_with(|| FunctionSamples::new(samples.name.clone()))
                    .merge(samples);
            }
            for samples in contextless.values() {
                self.add_record(samples, false);
            }
        } else {
            for samples in profile.functions.values() {
                self.add_record(samples, false);
            }
        }

        self.summary()
    }

    /// Combines the state accumulated by a builder run over a different
    /// partition of the same profile. The detailed summary has to be computed
    /// over the fully merged distribution, tables computed per partition
    /// can't be combined after the fact.
    pub fn merge(&mut self, other: &Self) {
        self.histogram.merge(&other.histogram);
        self.num_functions += other.num_functions;
        self.max_function_count = self.max_function_count.max(other.max_function_count);
    }

    pub fn histogram(&self) -> &CountHistogram {
        &self.histogram
    }

    pub fn summary(self) -> ProfileSummary {
        let detailed = compute_detailed_summary(&self.histogram, self.cutoffs);
        ProfileSummary::new(
            Kind::Sample,
            detailed,
            self.histogram.total_count(),
            self.histogram.max_count(),
            0,
            self.max_function_count,
            self.histogram.num_counts(),
            self.num_functions,
        )
    }
}
