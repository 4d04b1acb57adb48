//! Output writer trait definition.

use crate::error::Result;
use crate::output::ImageRecord;

/// Trait for writing routed results.
pub trait OutputWriter {
    /// Write the file header (if applicable).
    fn write_header(&mut self) -> Result<()>;

    /// Write a single image's result.
    fn write_record(&mut self, record: &ImageRecord) -> Result<()>;

    /// Finalize the output (flush, close, etc.).
    fn finalize(&mut self) -> Result<()>;
}
