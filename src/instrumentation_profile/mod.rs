pub mod summary;
pub mod types;

pub use summary::InstrProfSummaryBuilder;
pub use types::{InstrProfRecord, INVALID_COUNT};
