use indexmap::IndexMap;
use std::collections::BTreeMap;

/// Reserved sample value in probe-based profiles meaning the probe produced
/// no usable measurement. Skipped when building summaries.
pub const INVALID_PROBE_COUNT: u64 = u64::MAX;

/// A location inside a function body: line offset from the function start
/// plus the DWARF discriminator distinguishing multiple blocks on one line.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct LineLocation {
    pub line_offset: u32,
    pub discriminator: u32,
}

impl LineLocation {
    pub fn new(line_offset: u32, discriminator: u32) -> Self {
        Self {
            line_offset,
            discriminator,
        }
    }
}

/// The callees sampled at one call site, keyed by callee name. More than one
/// entry means an indirect call with several observed targets.
pub type CallsiteTargets = BTreeMap<String, FunctionSamples>;

/// The samples attributed to one function, with a nested record for every
/// callee inlined into it. In a context-sensitive profile one of these exists
/// per calling context and `name` holds the logical function name shared by
/// all of the copies.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FunctionSamples {
    pub name: String,
    /// Samples attributed to the function entry.
    pub head_samples: u64,
    /// Samples over the whole function body including inlined callees.
    pub total_samples: u64,
    pub body_samples: BTreeMap<LineLocation, u64>,
    pub callsite_samples: BTreeMap<LineLocation, CallsiteTargets>,
}

impl FunctionSamples {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Field-wise additive combine, recursing through nested call sites. This
    /// is how the per-context copies of a function get collapsed into a
    /// single record before summarising.
    pub fn merge(&mut self, other: &Self) {
        if self.name.is_empty() {
            self.name = other.name.clone();
        }
        self.head_samples = self.head_samples.saturating_add(other.head_samples);
        self.total_samples = self.total_samples.saturating_add(other.total_samples);
        for (loc, samples) in other.body_samples.iter() {
            let entry = self.body_samples.entry(*loc).or_insert(0);
            *entry = entry.saturating_add(*samples);
        }
        for (loc, targets) in other.callsite_samples.iter() {
            let own = self.callsite_samples.entry(*loc).or_default();
            for (name, callee) in targets.iter() {
                own.entry(name.clone())
                    .or_insert_with(|| FunctionSamples::new(name.clone()))
                    .merge(callee);
            }
        }
    }
}

/// A fully decoded sample profile: the top-level function records keyed by
/// context string (just the function name when the profile isn't
/// context-sensitive), in the order the reader produced them, plus the format
/// flags the summary builder needs.
#[derive(Clone, Debug, Default)]
pub struct SampleProfile {
    pub functions: IndexMap<String, FunctionSamples>,
    /// Whether each function appears once per calling context.
    pub is_cs: bool,
    /// Whether samples were attributed through pseudo probes, which makes
    /// [`INVALID_PROBE_COUNT`] a reserved value.
    pub is_probe_based: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, head: u64, body: &[(u32, u64)]) -> FunctionSamples {
        let mut fs = FunctionSamples::new(name);
        fs.head_samples = head;
        for (line, samples) in body {
            fs.body_samples.insert(LineLocation::new(*line, 0), *samples);
            fs.total_samples += samples;
        }
        fs
    }

    #[test]
    fn merge_sums_line_samples() {
        let mut a = leaf("foo", 3, &[(1, 10), (2, 20)]);
        let b = leaf("foo", 4, &[(2, 5), (7, 1)]);
        a.merge(&b);

        assert_eq!(a.head_samples, 7);
        assert_eq!(a.total_samples, 36);
        let body = a.body_samples.values().copied().collect::<Vec<_>>();
        assert_eq!(body, vec![10, 25, 1]);
    }

    #[test]
    fn merge_recurses_into_callsites() {
        let mut a = leaf("foo", 1, &[(1, 2)]);
        a.callsite_samples
            .entry(LineLocation::new(3, 0))
            .or_default()
            .insert("bar".into(), leaf("bar", 0, &[(1, 100)]));

        let mut b = leaf("foo", 1, &[(1, 2)]);
        b.callsite_samples
            .entry(LineLocation::new(3, 0))
            .or_default()
            .insert("bar".into(), leaf("bar", 0, &[(1, 11), (2, 1)]));
        // A target only one side saw must survive the merge.
        b.callsite_samples
            .entry(LineLocation::new(3, 0))
            .or_default()
            .insert("baz".into(), leaf("baz", 0, &[(1, 7)]));

        a.merge(&b);
        let targets = &a.callsite_samples[&LineLocation::new(3, 0)];
        assert_eq!(targets.len(), 2);
        let bar = &targets["bar"];
        assert_eq!(bar.body_samples[&LineLocation::new(1, 0)], 111);
        assert_eq!(bar.body_samples[&LineLocation::new(2, 0)], 1);
        assert_eq!(targets["baz"].body_samples[&LineLocation::new(1, 0)], 7);
    }
}
