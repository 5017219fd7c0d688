// src/utils/error.rs
use chrono::NaiveDate;
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid fragment dump: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Page index {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Found page numbers and entries don't match on page {page} of {document}: {contents} entries, {references} references")]
    Alignment {
        document: String,
        page: usize,
        contents: usize,
        references: usize,
    },

    #[error("Entry without content on page {page} of {document}")]
    EmptyEntry { document: String, page: usize },

    #[error("Error parsing date. Tried to parse: {0}")]
    DateParse(String),

    #[error("Metadata sanity check failed: {0}")]
    MetadataSanity(String),

    #[error("Page source failed: {0}")]
    Document(#[from] DocumentError),
}

#[derive(Error, Debug)]
pub enum BiographyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Invalid date '{value}' for person {id}")]
    InvalidDate { id: String, value: String },

    #[error("Missing field {field} in biography record")]
    MissingField { field: &'static str },
}

/// Non-fatal outcome of a speaker lookup. Logged, never aborts a document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("No person name found in: {0}")]
    Miss(String),

    #[error("No name of person {id} valid at {date}")]
    NoValidName { id: String, date: NaiveDate },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Biography data failed: {0}")]
    Biography(#[from] BiographyError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Document could not be read: {0}")]
    Document(#[from] DocumentError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
