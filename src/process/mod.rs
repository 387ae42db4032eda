// src/process/mod.rs
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

pub mod calendar;
pub mod canonical;
pub mod columns;
pub mod convert;
pub mod date_parser;
pub mod normalize;
pub mod raw_table;
pub mod rider;
pub mod utils;

pub use raw_table::RawTable;

/// Read a delimited export into a `RawTable`.
///
/// The first record is the header row. Records with a different field count
/// than the header are kept as-is (flexible).
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_raw_csv<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path.as_ref()))?;
    let table = read_raw_csv(BufReader::new(file))
        .with_context(|| format!("Failed to read CSV file: {:?}", path.as_ref()))?;
    info!(
        rows = table.num_rows(),
        columns = table.headers.len(),
        "loaded raw table"
    );
    Ok(table)
}

/// Parse CSV text from any reader into a `RawTable`.
pub fn read_raw_csv<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("CSV header row")?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    Ok(RawTable::new(headers, rows))
}

/// Return the first existing `dir/name` across `search_dirs`, in order.
pub fn locate_input<P: AsRef<Path>>(name: &str, search_dirs: &[P]) -> Option<PathBuf> {
    let direct = Path::new(name);
    if direct.is_absolute() {
        return direct.is_file().then(|| direct.to_path_buf());
    }
    for dir in search_dirs {
        let candidate = dir.as_ref().join(name);
        if candidate.is_file() {
            debug!(path = %candidate.display(), "located input");
            return Some(candidate);
        }
    }
    None
}
