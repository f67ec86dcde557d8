pub mod summary;
pub mod types;

pub use summary::{ContextMergeMode, SampleProfSummaryBuilder};
pub use types::{FunctionSamples, LineLocation, SampleProfile, INVALID_PROBE_COUNT};
