pub mod histogram;
pub mod instrumentation_profile;
pub mod sample_profile;
pub mod summary;

pub use crate::histogram::CountHistogram;
pub use crate::summary::{ProfileSummary, ProfileSummaryEntry, DEFAULT_CUTOFFS, SCALE};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Instr,
    Sample,
}
