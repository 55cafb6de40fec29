// Tabular data ingestion

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{error, info};

use crate::error::IngestError;

/// One parsed tabular file: a header row plus data rows, every row with
/// the same column count as the header.
#[derive(Debug, Clone)]
pub struct RecordSet {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RecordSet {
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

/// Parse one CSV file into a `RecordSet`.
fn parse_file(path: &Path) -> Result<RecordSet, IngestError> {
    let contents = fs::read_to_string(path).map_err(|source| IngestError::Unreadable {
        path: path.to_owned(),
        source,
    })?;

    let mut lines = contents.lines().enumerate();

    let headers: Vec<String> = match lines.next() {
        Some((_, header_line)) => header_line.split(',').map(|h| h.trim().to_owned()).collect(),
        None => return Err(IngestError::EmptyFile(path.to_owned())),
    };

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (line_idx, line) in lines {
        if line.trim().is_empty() {
            continue;
        }

        let row: Vec<String> = line.split(',').map(|v| v.trim().to_owned()).collect();

        if row.len() != headers.len() {
            return Err(IngestError::MalformedRow {
                path: path.to_owned(),
                line: line_idx + 1,
                expected: headers.len(),
                found: row.len(),
            });
        }

        rows.push(row);
    }

    Ok(RecordSet {
        path: path.to_owned(),
        headers,
        rows,
    })
}

/// Read every `*.csv` file in a directory into a `RecordSet`. Logs the
/// file count on success; logs and returns the error on failure.
///
/// Parameters
/// - `directory` - The directory to scan for tabular files
///
/// Returns
/// - One `RecordSet` per CSV file, in path order
pub fn load_directory(directory: &Path) -> Result<Vec<RecordSet>, IngestError> {
    let result = load_directory_inner(directory);

    match &result {
        Ok(sets) => info!("loaded {} tabular files from {:?}", sets.len(), directory),
        Err(err) => error!("tabular ingestion failed: {err}"),
    }

    result
}

fn load_directory_inner(directory: &Path) -> Result<Vec<RecordSet>, IngestError> {
    if !directory.exists() {
        return Err(IngestError::MissingDirectory(directory.to_owned()));
    }
    if !directory.is_dir() {
        return Err(IngestError::NotADirectory(directory.to_owned()));
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(directory)?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("csv"))
        .collect();
    paths.sort();

    paths.iter().map(|path| parse_file(path)).collect()
}
