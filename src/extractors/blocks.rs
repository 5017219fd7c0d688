// src/extractors/blocks.rs
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use crate::extractors::toc::Entry;

/// Literal prefixes that open a new block. Every entry is a possible beginning of a block.
const BLOCK_MARKERS: &[&str] = &[
    r"Tagesordnungspunkt \d+: ",
    r"Zusatztagesordnungspunkt \d+: ",
    r"Anlage \d+",
    r"Zur Geschäftsordnung",
];

static BLOCK_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("^(?:{})", BLOCK_MARKERS.join("|"))).expect("Failed to compile BLOCK_MARKER")
});

/// Entries grouped under one agenda item, supplement or annex.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub title: String,
    pub entries: Vec<Entry>,
}

/// One element of the assembled table of contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TocItem {
    Entry(Entry),
    Block(Block),
}

/// The block title an entry starts with, if any.
pub fn block_title(content: &str) -> Option<&str> {
    BLOCK_MARKER.find(content).map(|m| m.as_str())
}

pub fn is_block_marker(content: &str) -> bool {
    BLOCK_MARKER.is_match(content)
}

/// Groups a document's entries into blocks. Entries before the first marker stay flat.
pub fn to_blocks(entries: Vec<Entry>) -> Vec<TocItem> {
    let mut items: Vec<TocItem> = Vec::new();

    for mut entry in entries {
        if let Some(title) = block_title(&entry.content).map(str::to_string) {
            tracing::info!("New entry block found: {}", title);
            entry.content = entry.content[title.len()..].trim_start().to_string();
            items.push(TocItem::Block(Block { title, entries: Vec::new() }));
        }

        match items.last_mut() {
            Some(TocItem::Block(block)) => block.entries.push(entry),
            _ => items.push(TocItem::Entry(entry)),
        }
    }

    items
}
