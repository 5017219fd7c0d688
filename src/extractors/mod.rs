// src/extractors/mod.rs
pub mod blocks;
pub mod continuation;
pub mod metadata;
pub mod normalize;
pub mod overrides;
pub mod references;
pub mod toc;

// Re-export key extraction types for convenience
#[allow(unused_imports)]
pub use blocks::{to_blocks, Block, TocItem};
#[allow(unused_imports)]
pub use metadata::Metadata;
#[allow(unused_imports)]
pub use overrides::{OverrideTable, TextOverride};
#[allow(unused_imports)]
pub use toc::{Entry, ExtractedEntries, ExtractionOptions, TocExtractor};
