// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};
use serde::Serialize;
use crate::extractors::{Metadata, TocItem};
use crate::utils::error::StorageError;

/// Counts collected while converting one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
    pub document: String,
    pub entries: usize,
    pub blocks: usize,
    pub lookup_misses: usize,
    pub lookup_ambiguities: usize,
}

#[derive(Serialize)]
struct TocOutput<'a> {
    metadata: &'a Metadata,
    items: &'a [TocItem],
    report: &'a DocumentReport,
    extraction_timestamp: String,
}

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Output file of a protocol, e.g. `18001-vorspann.json` for period 18, session 1.
    pub fn output_path(&self, metadata: &Metadata) -> PathBuf {
        let filename = format!(
            "{:0>2}{:0>3}-vorspann.json",
            metadata.electoral_period, metadata.session_number
        );
        self.base_dir.join(filename)
    }

    /// Saves the assembled table of contents with its metadata in JSON format
    pub fn save_toc(
        &self,
        metadata: &Metadata,
        items: &[TocItem],
        report: &DocumentReport,
    ) -> Result<PathBuf, StorageError> {
        let file_path = self.output_path(metadata);

        let output = TocOutput {
            metadata,
            items,
            report,
            extraction_timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, json)
            .map_err(StorageError::IoError)?;

        tracing::info!("Wrote file {}", file_path.display());

        Ok(file_path)
    }

    /// Path for the normalized page dump of a document in debug mode
    pub fn debug_path(&self, document_id: &str) -> PathBuf {
        self.base_dir.join(format!("{}-normalized.txt", document_id))
    }
}
