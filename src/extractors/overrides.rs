// src/extractors/overrides.rs
//! Per-document literal corrections applied around the generic normalization rules.

use std::collections::HashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use crate::extractors::normalize::ENTRY_DELIMITER;
use crate::extractors::references::PAGE_REFERENCE;

/// A pure text-to-text correction.
pub type TextFix = fn(&str) -> String;

/// Pair of corrections for one document: before and after the generic rules.
#[derive(Debug, Clone, Copy)]
pub struct TextOverride {
    pub pre: TextFix,
    pub post: TextFix,
}

impl TextOverride {
    pub fn pre(fix: TextFix) -> Self {
        Self { pre: fix, post: unchanged }
    }

    pub fn post(fix: TextFix) -> Self {
        Self { pre: unchanged, post: fix }
    }
}

/// Lookup table from document identifier to its corrections. Unknown documents are left alone.
#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    entries: HashMap<String, TextOverride>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, document_id: impl Into<String>, fix: TextOverride) {
        self.entries.insert(document_id.into(), fix);
    }

    /// Corrections known for published protocols of the 18th electoral period.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.insert("18001", TextOverride::pre(references_at_page_end));
        table.insert("18044", TextOverride::post(missing_reference_before_annex_24));
        table.insert("18223", TextOverride::post(extra_header_section));
        table
    }

    pub fn apply_pre(&self, document_id: &str, text: &str) -> String {
        match self.entries.get(document_id) {
            Some(fix) => (fix.pre)(text),
            None => text.to_string(),
        }
    }

    pub fn apply_post(&self, document_id: &str, text: &str) -> String {
        match self.entries.get(document_id) {
            Some(fix) => (fix.post)(text),
            None => text.to_string(),
        }
    }
}

fn unchanged(text: &str) -> String {
    text.to_string()
}

static DOTS_ENDING_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\. )+\.µ").expect("Failed to compile DOTS_ENDING_SECTION")
});

static TRAILING_REFERENCE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"[µƒ]{0}(?:µ{0})*µ?$", PAGE_REFERENCE))
        .expect("Failed to compile TRAILING_REFERENCE_BLOCK")
});

/// The page references are printed as one block after all entries. Every dot run closes an
/// entry and the reference block becomes the page's last entry.
/// An entry cut off at the end of such a page has no dot run, so it stays a content entry
/// without reference and the page fails alignment instead of carrying it forward.
fn references_at_page_end(text: &str) -> String {
    let delimiter = ENTRY_DELIMITER.to_string();
    let text = DOTS_ENDING_SECTION.replace_all(text, delimiter.as_str());

    match TRAILING_REFERENCE_BLOCK.find(&text) {
        Some(block) => {
            let head = text[..block.start()].trim_end_matches(ENTRY_DELIMITER);
            let references = block.as_str().trim_start_matches(|c: char| c == 'µ' || c == ENTRY_DELIMITER);
            format!("{}{}{}", head, ENTRY_DELIMITER, references)
        }
        None => text.into_owned(),
    }
}

static ANNEX_24_WITHOUT_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"ƒ(Anlage 24µErklärung nach § 31)").expect("Failed to compile ANNEX_24_WITHOUT_REFERENCE")
});

/// The reference of "Anlage 23" is missing in the print; it is 4027 A.
fn missing_reference_before_annex_24(text: &str) -> String {
    ANNEX_24_WITHOUT_REFERENCE
        .replace(text, "ƒ4027 Aµ${1}")
        .into_owned()
}

/// The header carries an extra section for the joint session with the Bundesrat.
fn extra_header_section(text: &str) -> String {
    text.replacen("µzugleich 955. Sitzung des Bundesratesµ", "µ", 1)
}
