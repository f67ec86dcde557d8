/// Reserved counter value meaning "no valid measurement". Excluded from the
/// histogram, though a record whose entry counter holds it still counts
/// towards the number of functions.
pub const INVALID_COUNT: u64 = u64::MAX;

/// The decoded counters for one function as a profile reader hands them over.
/// The first counter is the function entry count and the rest are internal
/// region counts (basic blocks for front-end instrumentation).
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct InstrProfRecord {
    pub counts: Vec<u64>,
}

impl InstrProfRecord {
    pub fn new(counts: Vec<u64>) -> Self {
        Self { counts }
    }

    /// Merges the counters from another copy of the same function, saturating
    /// rather than wrapping on overflow. Records with mismatched counter
    /// layouts came from different versions of the function and are left
    /// untouched.
    pub fn merge(&mut self, other: &Self) {
        if self.counts.len() != other.counts.len() {
            return;
        }
        for (own, other) in self.counts.iter_mut().zip(other.counts.iter()) {
            *own = own.saturating_add(*other);
        }
    }
}
