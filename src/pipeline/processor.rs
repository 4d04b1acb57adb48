//! Single image processing.

use crate::error::Result;
use crate::imaging::decode_image_file;
use crate::output::ImageRecord;
use crate::router::HierarchicalRouter;
use crate::session::{HistoryEntry, SessionContext};
use std::path::Path;
use tracing::{debug, info};

/// Decode one image, route it, and record it in the session history.
///
/// # Arguments
///
/// * `input_path` - Path to the image file
/// * `router` - Router holding the session's ensemble and labels
/// * `session` - Session whose history receives the result unless privacy mode is on
/// * `max_file_size_bytes` - Upload limit fed to the quality gate
pub fn process_image(
    input_path: &Path,
    router: &HierarchicalRouter,
    session: &mut SessionContext,
    max_file_size_bytes: Option<u64>,
) -> Result<ImageRecord> {
    debug!("Processing: {}", input_path.display());

    let decoded = decode_image_file(input_path)?;
    let result = router.process(
        &decoded.image,
        Some(decoded.file_size_bytes),
        max_file_size_bytes,
    )?;

    let record = ImageRecord {
        file_path: input_path.to_path_buf(),
        image_hash: decoded.content_hash,
        file_size_bytes: decoded.file_size_bytes,
        result,
    };

    let entry = HistoryEntry::from_result(&record.image_hash, &record.file_name(), &record.result);
    if !session.record_history(entry) {
        debug!("Privacy mode: not keeping history for {}", record.file_name());
    }

    info!(
        "{}: {} -> {}",
        record.file_name(),
        record.result.species.label,
        record.result.predicted_label()
    );
    Ok(record)
}
