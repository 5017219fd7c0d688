// src/utils/debug_dump.rs
use std::fs::File;
use std::io::Write;
use std::path::Path;
use regex::Regex;
use crate::utils::error::AppError;

/// Marks highlighted ranges of a text as `[[label:...]]`.
/// Overlapping highlights after the first one are dropped.
pub fn annotate(text: &str, highlights: &[(usize, usize, &str)]) -> String {
    let mut annotated = String::with_capacity(text.len());
    let mut last_pos = 0;
    let mut sorted_highlights = highlights.to_vec();
    sorted_highlights.sort_by_key(|h| h.0); // Sort by position

    for (start, end, label) in sorted_highlights {
        if start < last_pos {
            continue;
        }
        annotated.push_str(&text[last_pos..start]);
        annotated.push_str(&format!("[[{}:{}]]", label, &text[start..end]));
        last_pos = end;
    }

    annotated.push_str(&text[last_pos..]);
    annotated
}

/// Writes every normalized page of a document to a text file, one block per page,
/// with the matches of the given regex patterns highlighted.
pub fn create_debug_dump<P: AsRef<Path>>(
    pages: &[String],
    path: P,
    patterns: &[(&str, &str)],
) -> Result<(), AppError> {
    let compiled = patterns
        .iter()
        .map(|(pattern, label)| {
            Regex::new(pattern)
                .map(|re| (re, *label))
                .map_err(|e| AppError::Config(format!("Invalid regex pattern '{}': {}", pattern, e)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut file = File::create(path.as_ref())?;

    for (index, page) in pages.iter().enumerate() {
        let mut highlights = Vec::new();
        for (re, label) in &compiled {
            for mat in re.find_iter(page) {
                highlights.push((mat.start(), mat.end(), *label));
            }
        }

        writeln!(file, "=== page {} ===", index + 1)?;
        writeln!(file, "{}", annotate(page, &highlights))?;
    }

    tracing::info!("Saved normalized page dump to {}", path.as_ref().display());
    Ok(())
}
