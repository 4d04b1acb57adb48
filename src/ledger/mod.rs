//! Human-in-the-loop corrections: durable ledger and active-learning queue.

mod correction;
mod queue;
mod store;

pub use correction::Correction;
pub use queue::{ActiveLearningQueue, export_corrections_csv, write_corrections_csv};
pub use store::CorrectionLedger;
