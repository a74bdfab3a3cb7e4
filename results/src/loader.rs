use std::{
    fs,
    path::{Path, PathBuf},
};

use csv::StringRecord;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::{
    snapshot::SNAPSHOT, Error, Mode, Result, ResultRow, Table, BENCHMARK, MODE, POOL_SIZE, SCORE,
    SCORE_ERROR, THREADS, UNIT,
};

const REQUIRED: [&str; 6] = [BENCHMARK, MODE, THREADS, SCORE, SCORE_ERROR, UNIT];

/// Header names of the result files.
///
/// Only the pool size column is configurable, it follows the name of the
/// benchmark parameter and is optional for a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub pool_size: String,
}

impl Default for Schema {
    fn default() -> Self {
        Self::new(POOL_SIZE)
    }
}

impl Schema {
    pub fn new(pool_size: impl Into<String>) -> Self {
        Self {
            pool_size: pool_size.into(),
        }
    }

    /// Headers as `Record` reads them: trimmed, with the pool size column
    /// under its default name.
    fn canonical(&self, headers: &StringRecord) -> StringRecord {
        headers
            .iter()
            .map(|h| match h.trim() {
                h if h == self.pool_size => POOL_SIZE.to_string(),
                // a column of the default name is not the pool size here
                POOL_SIZE => format!("{POOL_SIZE} (unused)"),
                h => h.to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct Record {
    #[serde(rename = "Benchmark")]
    benchmark: String,
    #[serde(rename = "Mode")]
    mode: Mode,
    #[serde(rename = "Threads")]
    threads: u32,
    #[serde(rename = "Param: poolSize", default)]
    pool_size: Option<u32>,
    #[serde(rename = "Score")]
    score: f64,
    #[serde(rename = "Score Error (99.9%)", deserialize_with = "absent_nan")]
    score_error: Option<f64>,
    #[serde(rename = "Unit")]
    unit: String,
}

/// JMH writes `NaN` as the error of percentile rows
fn absent_nan<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_nan()))
}

impl From<Record> for ResultRow {
    fn from(record: Record) -> Self {
        ResultRow {
            benchmark: record.benchmark,
            mode: record.mode,
            threads: record.threads,
            pool_size: record.pool_size,
            score: record.score,
            score_error: record.score_error,
            unit: record.unit,
            pool: None,
        }
    }
}

/// Files matching `pattern` in glob order. Snapshots are never inputs: files
/// named like the default snapshot and `exclude` are skipped.
pub fn discover(pattern: &str, exclude: Option<&Path>) -> Result<Vec<PathBuf>> {
    let skip = exclude.and_then(|p| fs::canonicalize(p).ok());

    let mut files = Vec::new();
    for entry in glob::glob(pattern)? {
        let path = entry?;
        if !path.is_file() {
            continue;
        }
        let snapshot = path.file_name().is_some_and(|name| name == SNAPSHOT)
            || (skip.is_some() && fs::canonicalize(&path).ok() == skip);
        if snapshot {
            debug!("Skipping snapshot {}", path.display());
            continue;
        }
        files.push(path);
    }

    if files.is_empty() {
        return Err(Error::NoInputFiles(pattern.to_string()));
    }
    Ok(files)
}

/// Read and concatenate `files` in order. Every file must carry the same
/// set of columns as the first one.
pub fn load_all(files: &[PathBuf], schema: &Schema) -> Result<Table> {
    let mut expected: Option<Vec<String>> = None;
    let mut tables = Vec::with_capacity(files.len());

    for file in files {
        let (mut columns, table) = read(file, schema)?;
        columns.sort();
        match &expected {
            None => expected = Some(columns),
            Some(expected) if *expected != columns => {
                return Err(Error::SchemaMismatch {
                    file: file.display().to_string(),
                    expected: expected.clone(),
                    found: columns,
                });
            }
            Some(_) => {}
        }
        debug!("Read {} rows from {}", table.len(), file.display());
        tables.push(table);
    }

    if tables.is_empty() {
        return Err(Error::NoInputFiles(String::new()));
    }
    Ok(Table::concat(tables))
}

pub fn load(file: &Path, schema: &Schema) -> Result<Table> {
    read(file, schema).map(|(_, table)| table)
}

fn read(file: &Path, schema: &Schema) -> Result<(Vec<String>, Table)> {
    let name = file.display().to_string();
    let mut reader = csv::Reader::from_path(file)?;
    let headers = reader.headers()?.clone();
    for column in REQUIRED {
        if !headers.iter().any(|h| h.trim() == column) {
            return Err(Error::MissingColumn {
                file: name,
                column: column.to_string(),
            });
        }
    }
    let canonical = schema.canonical(&headers);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Record = record
            .deserialize(Some(&canonical))
            .map_err(|err| invalid_value(err, &record, &headers, &name))?;
        rows.push(ResultRow::from(row));
    }

    Ok((headers.iter().map(str::to_string).collect(), Table::new(rows)))
}

/// Names the cell a row failed to deserialize at
fn invalid_value(err: csv::Error, record: &StringRecord, headers: &StringRecord, file: &str) -> Error {
    let field = match err.kind() {
        csv::ErrorKind::Deserialize { err, .. } => err.field(),
        _ => None,
    };
    let Some(index) = field.and_then(|f| usize::try_from(f).ok()) else {
        return Error::Csv(err);
    };
    Error::InvalidValue {
        file: file.to_string(),
        line: record.position().map(|p| p.line()).unwrap_or_default(),
        column: headers.get(index).unwrap_or_default().trim().to_string(),
        value: record.get(index).unwrap_or_default().to_string(),
    }
}
