// src/extractors/references.rs
//! Recovers the (page number, page section) references of a page's entries.
//!
//! Two layouts occur. In the leading layout every entry but the first starts with the
//! reference of the entry before it. In the trailing layout the last entry of the page
//! holds all references and nothing else.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use crate::utils::error::ExtractError;

/// Page number followed by up to three section letters, e.g. `123`, `123 A`, `123 B/D`.
/// Groups: 1. page number, 2. page section (may be empty).
pub const PAGE_REFERENCE: &str = r"(\d+) ?((?:[ABCD](?:/[ABCD])?)?)";

static REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(PAGE_REFERENCE).expect("Failed to compile REFERENCE")
});

// "213 AµVersammlung" / "123 B/C" / "3123µBesprechung". Group 3 is the text after the reference.
static LEADING_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?s)^{}(?:µ(.*))?$", PAGE_REFERENCE))
        .expect("Failed to compile LEADING_REFERENCE")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageReference {
    pub page_number: String,
    pub page_section: String,
}

impl PageReference {
    pub fn new(page_number: impl Into<String>, page_section: impl Into<String>) -> Self {
        Self { page_number: page_number.into(), page_section: page_section.into() }
    }

    fn from_captures(caps: &Captures) -> Self {
        Self::new(&caps[1], &caps[2])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLayout {
    /// Nothing but whitespace on the page.
    Blank,
    /// A single entry without any reference; it continues on the next page.
    Unreferenced,
    Leading,
    Trailing,
}

/// References aligned with the content entries of one page.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPage {
    pub layout: PageLayout,
    /// Entry contents, still carrying section delimiters.
    pub contents: Vec<String>,
    pub references: Vec<PageReference>,
    /// Text after the page's last reference. `None` leaves the pending continuation untouched.
    pub leftover: Option<String>,
}

impl ResolvedPage {
    pub fn blank() -> Self {
        Self { layout: PageLayout::Blank, contents: Vec::new(), references: Vec::new(), leftover: None }
    }
}

fn is_blank(entries: &[String]) -> bool {
    entries.iter().all(|entry| entry.trim().is_empty())
}

/// Aligns the logical entries of one page (already split on the entry delimiter) with
/// their references. `page` is 1-based and only used for error reporting.
pub fn resolve_page(entries: &[String], document: &str, page: usize) -> Result<ResolvedPage, ExtractError> {
    if is_blank(entries) {
        tracing::debug!("White page found on page {} of {}. Skipping.", page, document);
        return Ok(ResolvedPage::blank());
    }

    if entries.len() == 1 {
        tracing::debug!("Page {} of {} has no reference, carrying it forward", page, document);
        return Ok(ResolvedPage {
            layout: PageLayout::Unreferenced,
            contents: Vec::new(),
            references: Vec::new(),
            leftover: Some(entries[0].clone()),
        });
    }

    let leading: Option<Vec<Captures>> = entries[1..]
        .iter()
        .map(|entry| LEADING_REFERENCE.captures(entry))
        .collect();

    let resolved = match leading {
        Some(captures) => resolve_leading(&entries[0], &captures),
        None => resolve_trailing(entries),
    };
    tracing::debug!(
        "Page {} of {}: {:?} layout, {} entries",
        page, document, resolved.layout, resolved.contents.len()
    );

    // No content at all is a page without entries, whatever the reference count.
    if is_blank(&resolved.contents) {
        tracing::debug!("Only empty entries on page {} of {}. Skipping.", page, document);
        return Ok(ResolvedPage {
            leftover: resolved.leftover.filter(|text| !text.trim().is_empty()),
            ..ResolvedPage::blank()
        });
    }

    if resolved.layout == PageLayout::Leading
        && resolved.contents[1..].iter().any(|content| content.trim().is_empty())
    {
        return Err(ExtractError::EmptyEntry { document: document.to_string(), page });
    }

    if resolved.contents.len() != resolved.references.len() {
        return Err(ExtractError::Alignment {
            document: document.to_string(),
            page,
            contents: resolved.contents.len(),
            references: resolved.references.len(),
        });
    }

    Ok(resolved)
}

fn resolve_leading(first: &str, captures: &[Captures]) -> ResolvedPage {
    let references = captures.iter().map(PageReference::from_captures).collect();

    let text_after = |caps: &Captures| caps.get(3).map_or("", |m| m.as_str()).to_string();

    let mut contents = vec![first.to_string()];
    contents.extend(captures[..captures.len() - 1].iter().map(text_after));

    // Normally empty. Otherwise the entry is cut off and continues on the next page.
    let leftover = captures.last().map(text_after).unwrap_or_default();

    ResolvedPage { layout: PageLayout::Leading, contents, references, leftover: Some(leftover) }
}

fn resolve_trailing(entries: &[String]) -> ResolvedPage {
    let (reference_entry, contents) = match entries.split_last() {
        Some(split) => split,
        None => return ResolvedPage::blank(),
    };

    let references = REFERENCE
        .captures_iter(reference_entry)
        .map(|caps| PageReference::from_captures(&caps))
        .collect();

    ResolvedPage {
        layout: PageLayout::Trailing,
        contents: contents.to_vec(),
        references,
        leftover: Some(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_leading_layout() {
        let page = resolve_page(&entries(&["Eins", "1 AµZwei", "2 B/CµDrei", "3"]), "18001", 2).unwrap();

        assert_eq!(page.layout, PageLayout::Leading);
        assert_eq!(page.contents, vec!["Eins", "Zwei", "Drei"]);
        assert_eq!(
            page.references,
            vec![PageReference::new("1", "A"), PageReference::new("2", "B/C"), PageReference::new("3", "")]
        );
        assert_eq!(page.leftover, Some(String::new()));
    }

    #[test]
    fn test_trailing_layout() {
        let page = resolve_page(&entries(&["Eins", "Zwei", "Drei", "1 Aµ2 Bµ3 C"]), "18001", 2).unwrap();

        assert_eq!(page.layout, PageLayout::Trailing);
        assert_eq!(page.contents, vec!["Eins", "Zwei", "Drei"]);
        assert_eq!(page.references[2], PageReference::new("3", "C"));
    }

    #[test]
    fn test_trailing_references_without_separator() {
        let page = resolve_page(&entries(&["Eins", "Zwei", "11 A12 B/D"]), "x", 1).unwrap();
        assert_eq!(page.references, vec![PageReference::new("11", "A"), PageReference::new("12", "B/D")]);
    }

    #[test]
    fn test_synthetic_entries_recovered_in_both_layouts() {
        for n in 1..=6 {
            let texts: Vec<String> = (0..n).map(|i| format!("Redeµvon Person {}", i)).collect();
            let refs: Vec<String> = (0..n).map(|i| format!("{} {}", 100 + i, ["A", "B", "C", "D"][i % 4])).collect();

            let mut leading = vec![texts[0].clone()];
            for i in 1..n {
                leading.push(format!("{}µ{}", refs[i - 1], texts[i]));
            }
            leading.push(refs[n - 1].clone());

            let mut trailing = texts.clone();
            trailing.push(refs.join("µ"));

            for layout in [leading, trailing] {
                let page = resolve_page(&layout, "doc", 1).unwrap();
                assert_eq!(page.contents, texts);
                let recovered: Vec<String> = page
                    .references
                    .iter()
                    .map(|r| format!("{} {}", r.page_number, r.page_section))
                    .collect();
                assert_eq!(recovered, refs);
            }
        }
    }

    #[test]
    fn test_cut_off_entry_becomes_leftover() {
        let page = resolve_page(&entries(&["Eins", "1 AµAnsprache des"]), "x", 3).unwrap();
        assert_eq!(page.contents, vec!["Eins"]);
        assert_eq!(page.leftover.as_deref(), Some("Ansprache des"));
    }

    #[test]
    fn test_blank_page() {
        assert_eq!(resolve_page(&entries(&[]), "x", 4).unwrap(), ResolvedPage::blank());
        assert_eq!(resolve_page(&entries(&["", "  "]), "x", 4).unwrap(), ResolvedPage::blank());
        // mismatched counts are fine as long as there is no content
        assert_eq!(resolve_page(&entries(&["", " ", "12 A"]), "x", 4).unwrap(), ResolvedPage::blank());
    }

    #[test]
    fn test_empty_contents_with_matching_references_are_blank() {
        assert_eq!(resolve_page(&entries(&["", "1 A"]), "x", 2).unwrap(), ResolvedPage::blank());
        assert_eq!(resolve_page(&entries(&["", "1 A", "2 B"]), "x", 2).unwrap(), ResolvedPage::blank());
    }

    #[test]
    fn test_empty_page_keeps_cut_off_text() {
        let page = resolve_page(&entries(&["", "1 AµAnsprache des"]), "x", 2).unwrap();
        assert_eq!(page.layout, PageLayout::Blank);
        assert!(page.contents.is_empty());
        assert_eq!(page.leftover.as_deref(), Some("Ansprache des"));
    }

    #[test]
    fn test_single_entry_is_carried() {
        let page = resolve_page(&entries(&["Fortsetzung ohne Seitenzahl"]), "x", 5).unwrap();
        assert_eq!(page.layout, PageLayout::Unreferenced);
        assert!(page.contents.is_empty());
        assert_eq!(page.leftover.as_deref(), Some("Fortsetzung ohne Seitenzahl"));
    }

    #[test]
    fn test_alignment_error_names_page_and_document() {
        let err = resolve_page(&entries(&["Eins", "Zwei", "Drei", "1 A"]), "18099", 7).unwrap_err();
        match err {
            ExtractError::Alignment { document, page, contents, references } => {
                assert_eq!(document, "18099");
                assert_eq!(page, 7);
                assert_eq!(contents, 3);
                assert_eq!(references, 1);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_entry_in_leading_layout() {
        let err = resolve_page(&entries(&["Eins", "1 A", "2 BµZwei"]), "x", 2).unwrap_err();
        assert!(matches!(err, ExtractError::EmptyEntry { page: 2, .. }));
    }
}
