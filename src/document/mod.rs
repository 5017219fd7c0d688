// src/document/mod.rs
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::utils::error::DocumentError;

/// One raw string fragment from a page's text layer. Reading order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextRun(pub String);

impl TextRun {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TextRun {
    fn from(value: &str) -> Self {
        TextRun(value.to_string())
    }
}

/// Access to the ordered text fragments of a document's pages.
pub trait PageSource {
    /// Stable identifier of the document, used to look up per-document overrides.
    fn document_id(&self) -> &str;

    fn page_count(&self) -> usize;

    /// Returns the fragments of the page at `index` (0-based).
    fn page_runs(&self, index: usize) -> Result<Vec<TextRun>, DocumentError>;
}

/// A text-layer dump of a document: `{ "pages": [["run", ...], ...] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragmentDocument {
    #[serde(skip)]
    pub id: String,
    pub pages: Vec<Vec<TextRun>>,
}

impl FragmentDocument {
    pub fn new(id: impl Into<String>, pages: Vec<Vec<TextRun>>) -> Self {
        Self { id: id.into(), pages }
    }

    /// Parses a fragment dump. The id is not part of the JSON and is given by the caller.
    pub fn from_json(id: impl Into<String>, json: &str) -> Result<Self, DocumentError> {
        let mut document: FragmentDocument = serde_json::from_str(json)?;
        document.id = id.into();
        Ok(document)
    }

    /// Reads `<id>.json`; the document id is the file stem.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let json = std::fs::read_to_string(path)?;
        tracing::debug!("Read fragment dump {} ({} bytes)", path.display(), json.len());
        Self::from_json(id, &json)
    }
}

impl PageSource for FragmentDocument {
    fn document_id(&self) -> &str {
        &self.id
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_runs(&self, index: usize) -> Result<Vec<TextRun>, DocumentError> {
        self.pages
            .get(index)
            .cloned()
            .ok_or(DocumentError::PageOutOfRange { index, count: self.pages.len() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_reads_pages_in_order() {
        let json = r#"{ "pages": [["Deutscher Bundestag", " "], ["Inhalt:"]] }"#;
        let doc = FragmentDocument::from_json("18001", json).unwrap();

        assert_eq!(doc.document_id(), "18001");
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.page_runs(0).unwrap(), vec![TextRun::from("Deutscher Bundestag"), TextRun::from(" ")]);
    }

    #[test]
    fn test_page_out_of_range() {
        let doc = FragmentDocument::new("x", vec![]);
        assert!(matches!(doc.page_runs(3), Err(DocumentError::PageOutOfRange { index: 3, count: 0 })));
    }

    #[test]
    fn test_load_uses_file_stem_as_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("18044.json");
        std::fs::write(&path, r#"{"pages":[["a"]]}"#).unwrap();

        let doc = FragmentDocument::load(&path).unwrap();
        assert_eq!(doc.id, "18044");
        assert_eq!(doc.page_runs(0).unwrap()[0].as_str(), "a");
    }

    #[test]
    fn test_invalid_json_is_reported() {
        assert!(matches!(FragmentDocument::from_json("x", "{"), Err(DocumentError::Json(_))));
    }
}
