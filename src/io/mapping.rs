//! Read/write best-fit mapping JSON files.
//!
//! A saved mapping lets a later run classify a new test set without
//! re-running the selector. The schema is defined by `domain::MappingFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;

use crate::domain::{BestFitMapping, MappingFile};
use crate::error::AppError;

/// Name recorded in the `tool` field.
pub const TOOL_NAME: &str = "ifit";

/// Wrap a mapping with run metadata.
pub fn mapping_file(mapping: &BestFitMapping, training: &Path, ideal: &Path) -> MappingFile {
    MappingFile {
        tool: TOOL_NAME.to_string(),
        generated_at: Utc::now(),
        training: training.display().to_string(),
        ideal: ideal.display().to_string(),
        fits: mapping.clone(),
    }
}

/// Write a mapping JSON file.
pub fn write_mapping_json(path: &Path, file: &MappingFile) -> Result<(), AppError> {
    let out = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create mapping JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(out, file)
        .map_err(|e| AppError::new(2, format!("Failed to write mapping JSON: {e}")))?;

    log::info!("wrote best-fit mapping ({} entries) to {}", file.fits.len(), path.display());
    Ok(())
}

/// Read a mapping JSON file.
///
/// Repeated training columns are rejected while deserializing.
pub fn read_mapping_json(path: &Path) -> Result<MappingFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open mapping JSON '{}': {e}", path.display())))?;
    let mapping: MappingFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid mapping JSON: {e}")))?;
    Ok(mapping)
}
