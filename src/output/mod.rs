//! Output writers, progress and console rendering.

mod csv;
mod json;
pub mod progress;
pub mod summary;
mod types;
mod writer;

pub use csv::{CsvWriter, write_history_csv};
pub use json::{JsonResultFile, JsonResultWriter, JsonSettings, JsonSummary};
pub use types::ImageRecord;
pub use writer::OutputWriter;
