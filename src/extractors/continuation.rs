// src/extractors/continuation.rs
use crate::extractors::normalize::sections_to_text;
use crate::extractors::references::{PageReference, ResolvedPage};

/// Content cut off at the end of the previous page, waiting for the next page's first entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContinuationBuffer(String);

impl ContinuationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &str {
        &self.0
    }

    /// Completes a page: the pending text is prepended to its first entry and the page's
    /// leftover becomes the buffer handed to the next page.
    pub fn stitch(self, page: ResolvedPage) -> (Vec<(String, PageReference)>, ContinuationBuffer) {
        let ResolvedPage { mut contents, references, leftover, .. } = page;

        let carry = match (contents.first_mut(), leftover) {
            (_, None) => self,
            (Some(first), leftover) => {
                *first = join(&self.0, first);
                ContinuationBuffer(leftover.unwrap_or_default())
            }
            (None, Some(leftover)) => ContinuationBuffer(join(&self.0, &leftover)),
        };

        let entries = contents
            .iter()
            .map(|content| sections_to_text(content))
            .zip(references)
            .collect();

        (entries, carry)
    }
}

fn join(pending: &str, text: &str) -> String {
    format!("{} {}", pending, text).trim().to_string()
}
