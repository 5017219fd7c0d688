// src/extractors/toc.rs
//! Page-by-page extraction of the table-of-contents entries of one document.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use crate::biography::{BiographyStore, SpeakerLookup, SpeakerRecord, SpeakerResolver};
use crate::document::PageSource;
use crate::extractors::blocks::is_block_marker;
use crate::extractors::continuation::ContinuationBuffer;
use crate::extractors::metadata::{extract_metadata, Metadata};
use crate::extractors::normalize::{normalize_page, split_entries, SECTION_DELIMITER};
use crate::extractors::overrides::OverrideTable;
use crate::extractors::references::resolve_page;
use crate::utils::error::{ExtractError, LookupError};

/// One line of the table of contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub content: String,
    pub page_number: String,
    pub page_section: String,
    pub speaker: Option<SpeakerRecord>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractionOptions {
    /// Skip the first pages of every document (useful for debugging a single page).
    pub skip_pages: usize,
}

/// Entries of a document plus what happened while resolving speakers.
#[derive(Debug, Clone, Default)]
pub struct ExtractedEntries {
    pub entries: Vec<Entry>,
    /// Normalized text of every processed page, for debugging.
    pub normalized_pages: Vec<String>,
    pub lookup_misses: usize,
    pub lookup_ambiguities: usize,
}

/// Result of one page and the continuation for the next one.
#[derive(Debug)]
pub struct PageResult {
    pub entries: Vec<Entry>,
    pub carry: ContinuationBuffer,
}

// Everything up to "Inhalt:" on the first page is the protocol header.
static FIRST_PAGE_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^.+(?:Inhalt|I n h a l t ):µ").expect("Failed to compile FIRST_PAGE_HEADER")
});

// Invisible text at the end of the first page.
static INVISIBLE_TOC_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"µInhaltsverzeichnis").expect("Failed to compile INVISIBLE_TOC_TITLE")
});

/// Runs the per-page pipeline over the documents of one electoral period.
pub struct TocExtractor<'a> {
    resolver: SpeakerResolver<'a>,
    overrides: &'a OverrideTable,
    options: ExtractionOptions,
}

impl<'a> TocExtractor<'a> {
    pub fn new(store: &'a BiographyStore, overrides: &'a OverrideTable, options: ExtractionOptions) -> Self {
        Self { resolver: SpeakerResolver::new(store), overrides, options }
    }

    pub fn extract_metadata(&self, source: &dyn PageSource) -> Result<Metadata, ExtractError> {
        let first_page = source.page_runs(0)?;
        extract_metadata(&first_page, source.document_id(), self.overrides)
    }

    /// Extracts the entries of all pages in order. Pages depend on each other through the
    /// continuation buffer, so they are processed strictly one after another.
    pub fn extract_entries(
        &self,
        source: &dyn PageSource,
        metadata: &Metadata,
    ) -> Result<ExtractedEntries, ExtractError> {
        let mut extracted = ExtractedEntries::default();
        let mut carry = ContinuationBuffer::new();

        for index in self.options.skip_pages..source.page_count() {
            let runs = source.page_runs(index)?;
            let normalized = normalize_page(&runs, source.document_id(), self.overrides);

            let page = self.extract_page(&normalized, index, source.document_id(), metadata, carry, &mut extracted)?;
            extracted.entries.extend(page.entries);
            extracted.normalized_pages.push(normalized);
            carry = page.carry;
        }

        if !carry.pending().is_empty() {
            tracing::warn!(
                "Text without page reference left at the end of {}: {}",
                source.document_id(),
                carry.pending()
            );
        }

        tracing::info!("Extracted {} entries from {}", extracted.entries.len(), source.document_id());
        Ok(extracted)
    }

    /// Processes the normalized text of the page at `index` (0-based).
    fn extract_page(
        &self,
        normalized: &str,
        index: usize,
        document_id: &str,
        metadata: &Metadata,
        carry: ContinuationBuffer,
        stats: &mut ExtractedEntries,
    ) -> Result<PageResult, ExtractError> {
        let entries = strip_page_header(split_entries(normalized), index);
        let resolved = resolve_page(&entries, document_id, index + 1)?;
        let (stitched, carry) = carry.stitch(resolved);

        let entries = stitched
            .into_iter()
            .map(|(content, reference)| {
                tracing::debug!("Entry {} {}: {}", reference.page_number, reference.page_section, content);
                let speaker = self.speaker_for(&content, metadata, stats);
                Entry {
                    content,
                    page_number: reference.page_number,
                    page_section: reference.page_section,
                    speaker,
                }
            })
            .collect();

        Ok(PageResult { entries, carry })
    }

    fn speaker_for(&self, content: &str, metadata: &Metadata, stats: &mut ExtractedEntries) -> Option<SpeakerRecord> {
        // Block headers never name a speaker.
        if is_block_marker(content) {
            return None;
        }

        match self.resolver.resolve(content, metadata.date) {
            Ok(SpeakerLookup::Resolved(record)) => Some(record),
            Ok(lookup @ SpeakerLookup::Ambiguous { .. }) => {
                tracing::debug!("Chose {} for ambiguous entry: {}", lookup.record().id, content);
                stats.lookup_ambiguities += 1;
                Some(lookup.into_record())
            }
            Err(e @ LookupError::Miss(_)) => {
                tracing::debug!("{}", e);
                stats.lookup_misses += 1;
                None
            }
            Err(e) => {
                tracing::warn!("{}", e);
                stats.lookup_misses += 1;
                None
            }
        }
    }
}

/// Removes the running header of a page (the protocol header on the first page).
fn strip_page_header(mut entries: Vec<String>, index: usize) -> Vec<String> {
    if entries.is_empty() {
        return entries;
    }

    if index == 0 {
        entries[0] = FIRST_PAGE_HEADER.replace(&entries[0], "").into_owned();
        if let Some(last) = entries.last_mut() {
            *last = INVISIBLE_TOC_TITLE.replace_all(last, "").into_owned();
        }
    } else {
        entries[0] = entries[0]
            .split(SECTION_DELIMITER)
            .skip(2)
            .collect::<Vec<_>>()
            .join(&SECTION_DELIMITER.to_string());
    }

    entries
}
