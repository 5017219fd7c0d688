// src/main.rs
mod biography;
mod document;
mod extractors;
mod storage;
mod utils;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use clap::Parser;
use tokio::task::JoinSet;
use utils::AppError;
use biography::BiographyStore;
use document::{FragmentDocument, PageSource};
use extractors::{to_blocks, ExtractionOptions, OverrideTable, TocExtractor, TocItem};
use storage::{DocumentReport, StorageManager};

/// Command Line Interface for the plenary protocol table-of-contents extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Electoral period of the protocols, e.g. 18
    period: String,

    /// Directory with the page fragment files (*.json) of the protocols
    input_dir: PathBuf,

    /// Biography XML of the members of parliament (default: ./stammdaten_by_wp/MDB_STAMMDATEN_WP{period}.xml)
    #[arg(short, long)]
    biographies: Option<PathBuf>,

    /// Output directory for the extracted tables of contents
    #[arg(short, long, default_value = "./output")]
    output_dir: String,

    /// Run the extraction without writing any output files
    #[arg(long)]
    no_output: bool,

    /// Process one document after another instead of concurrently
    #[arg(long)]
    sequential: bool,

    /// Skip the first N pages of every document
    #[arg(long, default_value_t = 0)]
    skip_pages: usize,

    /// Only process these documents (file stem, e.g. 18001); can be repeated
    #[arg(long = "only-file")]
    only_files: Vec<String>,

    /// Skip these documents (file stem); can be repeated
    #[arg(long = "skip-file")]
    skip_files: Vec<String>,

    /// Debug mode - save the normalized pages of every document with highlighted references
    #[arg(short, long)]
    debug: bool,
}

#[derive(Debug, Clone, Copy)]
struct BatchConfig {
    options: ExtractionOptions,
    write_output: bool,
    debug: bool,
}

#[derive(Debug, Default)]
struct BatchSummary {
    reports: Vec<DocumentReport>,
    failures: usize,
}

const DEBUG_PATTERNS: [(&str, &str); 3] = [
    (r"ƒ\d+(?: [ABCD](?:/[ABCD])?)?", "ref"),
    (r"(?:Zusatztagesordnungspunkt|Tagesordnungspunkt) \d+:", "block"),
    (r"Anlage \d+", "block"),
];

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    // 3. Load the biographies of the period
    let biographies = args.biographies.clone().unwrap_or_else(|| {
        PathBuf::from(format!("./stammdaten_by_wp/MDB_STAMMDATEN_WP{}.xml", args.period))
    });
    let store = Arc::new(BiographyStore::load(&biographies, &args.period)?);
    if store.is_empty() {
        tracing::warn!("No members of period {} found in {}", store.period(), biographies.display());
    }
    let overrides = Arc::new(OverrideTable::builtin());

    // 4. Initialize storage
    let storage = Arc::new(StorageManager::new(&args.output_dir)?);

    // 5. Find the documents to process
    let inputs = collect_inputs(&args.input_dir, &args.only_files, &args.skip_files)?;
    tracing::info!("Found {} documents in {}", inputs.len(), args.input_dir.display());

    if inputs.is_empty() {
        return Err(AppError::Config(format!("No documents found in {}", args.input_dir.display())));
    }

    let config = BatchConfig {
        options: ExtractionOptions { skip_pages: args.skip_pages },
        write_output: !args.no_output,
        debug: args.debug,
    };

    // 6. Process the documents
    let summary = if args.sequential {
        run_sequential(inputs, &store, &overrides, &storage, config)
    } else {
        run_concurrent(inputs, store, overrides, storage, config).await
    };

    let misses: usize = summary.reports.iter().map(|r| r.lookup_misses).sum();
    let ambiguities: usize = summary.reports.iter().map(|r| r.lookup_ambiguities).sum();
    tracing::info!(
        "Processing finished. Success: {}, Failures: {}, speaker lookup misses: {}, ambiguities: {}",
        summary.reports.len(),
        summary.failures,
        misses,
        ambiguities
    );

    if summary.reports.is_empty() && summary.failures > 0 {
        return Err(AppError::Processing(format!(
            "Failed to extract any table of contents from {} documents",
            summary.failures
        )));
    }

    Ok(())
}

/// Lists the `*.json` fragment files of a directory, sorted by name.
fn collect_inputs(dir: &Path, only: &[String], skip: &[String]) -> Result<Vec<PathBuf>, AppError> {
    let mut inputs = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        if !only.is_empty() && !only.iter().any(|o| o == stem) {
            continue;
        }
        if skip.iter().any(|s| s == stem) {
            tracing::debug!("Skipping {}", stem);
            continue;
        }
        inputs.push(path);
    }

    inputs.sort();
    Ok(inputs)
}

fn run_sequential(
    inputs: Vec<PathBuf>,
    store: &BiographyStore,
    overrides: &OverrideTable,
    storage: &StorageManager,
    config: BatchConfig,
) -> BatchSummary {
    let mut summary = BatchSummary::default();
    for path in inputs {
        record_outcome(&mut summary, &path, process_file(&path, store, overrides, storage, config));
    }
    summary
}

/// Every document is independent, so each one runs on its own blocking task.
async fn run_concurrent(
    inputs: Vec<PathBuf>,
    store: Arc<BiographyStore>,
    overrides: Arc<OverrideTable>,
    storage: Arc<StorageManager>,
    config: BatchConfig,
) -> BatchSummary {
    let mut tasks = JoinSet::new();

    for path in inputs {
        let store = Arc::clone(&store);
        let overrides = Arc::clone(&overrides);
        let storage = Arc::clone(&storage);
        tasks.spawn_blocking(move || {
            let outcome = process_file(&path, &store, &overrides, &storage, config);
            (path, outcome)
        });
    }

    let mut summary = BatchSummary::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((path, outcome)) => record_outcome(&mut summary, &path, outcome),
            Err(e) => {
                tracing::error!("Extraction task failed: {}", e);
                summary.failures += 1;
            }
        }
    }

    summary.reports.sort_by(|a, b| a.document.cmp(&b.document));
    summary
}

fn record_outcome(summary: &mut BatchSummary, path: &Path, outcome: Result<DocumentReport, AppError>) {
    match outcome {
        Ok(report) => summary.reports.push(report),
        Err(e) => {
            tracing::error!("Failed to process {}: {}", path.display(), e);
            summary.failures += 1;
        }
    }
}

/// Runs the whole pipeline for one fragment file.
fn process_file(
    path: &Path,
    store: &BiographyStore,
    overrides: &OverrideTable,
    storage: &StorageManager,
    config: BatchConfig,
) -> Result<DocumentReport, AppError> {
    let document = FragmentDocument::load(path)?;
    tracing::info!("Processing {} ({} pages)", document.document_id(), document.page_count());

    let extractor = TocExtractor::new(store, overrides, config.options);
    let metadata = extractor.extract_metadata(&document)?;
    let extracted = extractor.extract_entries(&document, &metadata)?;

    if config.debug {
        let debug_path = storage.debug_path(document.document_id());
        if let Err(e) = utils::debug_dump::create_debug_dump(&extracted.normalized_pages, &debug_path, &DEBUG_PATTERNS) {
            tracing::warn!("Failed to create debug dump: {}", e);
        }
    }

    let entries = extracted.entries.len();
    let items = to_blocks(extracted.entries);
    let report = DocumentReport {
        document: document.document_id().to_string(),
        entries,
        blocks: items.iter().filter(|item| matches!(item, TocItem::Block(_))).count(),
        lookup_misses: extracted.lookup_misses,
        lookup_ambiguities: extracted.lookup_ambiguities,
    };

    if config.write_output {
        storage.save_toc(&metadata, &items, &report)?;
    }

    Ok(report)
}
