use std::{fmt, str::FromStr};

use comfy_table::presets::UTF8_FULL_CONDENSED;
use serde::{Deserialize, Serialize};

pub mod error;
pub mod extract;
pub mod filter;
pub mod grid;
pub mod loader;
pub mod normalize;
pub mod percentile;
pub mod regression;
pub mod snapshot;

pub use error::{Error, Result};
pub use filter::Predicate;

pub const BENCHMARK: &str = "Benchmark";
pub const MODE: &str = "Mode";
pub const THREADS: &str = "Threads";
pub const SCORE: &str = "Score";
pub const SCORE_ERROR: &str = "Score Error (99.9%)";
pub const UNIT: &str = "Unit";
pub const POOL_SIZE: &str = "Param: poolSize";

/// JMH benchmark mode, as written in the `Mode` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "thrpt")]
    Throughput,
    #[serde(rename = "avgt")]
    AverageTime,
    #[serde(rename = "sample")]
    SampleTime,
    #[serde(rename = "ss")]
    SingleShot,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Throughput => "thrpt",
            Mode::AverageTime => "avgt",
            Mode::SampleTime => "sample",
            Mode::SingleShot => "ss",
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "thrpt" => Ok(Mode::Throughput),
            "avgt" => Ok(Mode::AverageTime),
            "sample" => Ok(Mode::SampleTime),
            "ss" => Ok(Mode::SingleShot),
            other => Err(format!("unknown benchmark mode `{other}`")),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One measurement record of a result file
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub benchmark: String,
    pub mode: Mode,
    pub threads: u32,
    pub pool_size: Option<u32>,
    pub score: f64,
    /// Absent for percentile rows
    pub score_error: Option<f64>,
    pub unit: String,
    /// Derived column, see [`extract::Extractor`]
    pub pool: Option<String>,
}

/// Categorical column of a [`Table`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Benchmark,
    Mode,
    Threads,
    PoolSize,
    Unit,
    Pool,
}

impl Field {
    pub fn value(&self, row: &ResultRow) -> Option<Value> {
        match self {
            Field::Benchmark => Some(Value::from(row.benchmark.as_str())),
            Field::Mode => Some(Value::from(row.mode)),
            Field::Threads => Some(Value::from(row.threads)),
            Field::PoolSize => row.pool_size.map(Value::from),
            Field::Unit => Some(Value::from(row.unit.as_str())),
            Field::Pool => row.pool.as_deref().map(Value::from),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Benchmark => "Benchmark",
            Field::Mode => "Mode",
            Field::Threads => "Threads",
            Field::PoolSize => "Pool Size",
            Field::Unit => "Unit",
            Field::Pool => "Pool",
        }
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "benchmark" => Ok(Field::Benchmark),
            "mode" => Ok(Field::Mode),
            "threads" => Ok(Field::Threads),
            "pool-size" | "pool_size" | "poolsize" => Ok(Field::PoolSize),
            "unit" => Ok(Field::Unit),
            "pool" => Ok(Field::Pool),
            other => Err(format!(
                "unknown field `{other}` (expected benchmark, mode, threads, pool-size, unit or pool)"
            )),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Value of a categorical column.
///
/// Integers order numerically and sort before text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    Int(i64),
    Text(String),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Text(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<Mode> for Value {
    fn from(mode: Mode) -> Self {
        Value::Text(mode.as_str().to_string())
    }
}

/// In-memory result table. Operations never mutate a table in place, they
/// produce a new one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    rows: Vec<ResultRow>,
}

impl Table {
    pub fn new(rows: Vec<ResultRow>) -> Self {
        Self { rows }
    }

    pub fn concat(tables: impl IntoIterator<Item = Table>) -> Self {
        Self {
            rows: tables.into_iter().flat_map(|t| t.rows).collect(),
        }
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<ResultRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows matching `predicate`, in input order
    pub fn filter(&self, predicate: &Predicate) -> Table {
        Table {
            rows: self
                .rows
                .iter()
                .filter(|row| predicate.matches(row))
                .cloned()
                .collect(),
        }
    }

    pub fn map_benchmarks(self, mut f: impl FnMut(&str) -> String) -> Table {
        Table {
            rows: self
                .rows
                .into_iter()
                .map(|mut row| {
                    row.benchmark = f(&row.benchmark);
                    row
                })
                .collect(),
        }
    }

    /// Sorted distinct values of `field`, absent values skipped
    pub fn unique(&self, field: Field) -> Vec<Value> {
        let mut values: Vec<Value> = self.rows.iter().filter_map(|r| field.value(r)).collect();
        values.sort();
        values.dedup();
        values
    }

    /// The one unit shared by every row
    pub fn unit(&self) -> Result<&str> {
        let Some(first) = self.rows.first() else {
            return Err(Error::EmptySelection("unit lookup".to_string()));
        };
        if self.rows.iter().all(|r| r.unit == first.unit) {
            return Ok(&first.unit);
        }
        let units = self
            .unique(Field::Unit)
            .into_iter()
            .map(|v| v.to_string())
            .collect();
        Err(Error::MixedUnits(units))
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opt = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());

        let mut table = comfy_table::Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header([
            BENCHMARK, MODE, THREADS, "Pool Size", SCORE, "Score Error", UNIT, "Pool",
        ]);
        for r in &self.rows {
            table.add_row([
                r.benchmark.clone(),
                r.mode.to_string(),
                r.threads.to_string(),
                opt(r.pool_size.map(|p| p.to_string())),
                r.score.to_string(),
                opt(r.score_error.map(|e| e.to_string())),
                r.unit.clone(),
                opt(r.pool.clone()),
            ]);
        }
        write!(f, "{table}")
    }
}

#[cfg(test)]
pub(crate) fn row(benchmark: &str, mode: Mode, threads: u32, score: f64, unit: &str) -> ResultRow {
    ResultRow {
        benchmark: benchmark.to_string(),
        mode,
        threads,
        pool_size: Some(100),
        score,
        score_error: Some(score / 10.0),
        unit: unit.to_string(),
        pool: None,
    }
}

#[cfg(test)]
mod test {
    use super::{row, Error, Field, Mode, Table, Value};

    #[test]
    fn values_sort_numerically() {
        let table = Table::new(vec![
            row("a", Mode::Throughput, 10, 1.0, "ops/ms"),
            row("b", Mode::Throughput, 2, 1.0, "ops/ms"),
            row("c", Mode::Throughput, 100, 1.0, "ops/ms"),
            row("d", Mode::Throughput, 2, 1.0, "ops/ms"),
        ]);
        assert_eq!(
            table.unique(Field::Threads),
            vec![Value::Int(2), Value::Int(10), Value::Int(100)]
        );
    }

    #[test]
    fn unit_requires_one_value() {
        let table = Table::new(vec![
            row("a", Mode::Throughput, 1, 1.0, "ops/ms"),
            row("b", Mode::Throughput, 1, 1.0, "ops/s"),
        ]);
        match table.unit() {
            Err(Error::MixedUnits(units)) => assert_eq!(units, vec!["ops/ms", "ops/s"]),
            other => panic!("unexpected {other:?}"),
        }

        assert!(matches!(
            Table::default().unit(),
            Err(Error::EmptySelection(_))
        ));

        let single = Table::new(vec![row("a", Mode::Throughput, 1, 1.0, "ops/ms")]);
        assert_eq!(single.unit().unwrap(), "ops/ms");
    }

    #[test]
    fn parse_field_names() {
        assert_eq!("pool-size".parse::<Field>(), Ok(Field::PoolSize));
        assert_eq!("Threads".parse::<Field>(), Ok(Field::Threads));
        assert!("score".parse::<Field>().is_err());
    }

    #[test]
    fn display_aligns_columns() {
        let mut r = row("FastObjectPool", Mode::SampleTime, 10, 2.5, "us/op");
        r.score_error = None;
        let text = Table::new(vec![r]).to_string();

        let header = text.lines().find(|l| l.contains("Benchmark")).unwrap();
        assert!(header.contains("Score Error"));
        let line = text.lines().find(|l| l.contains("FastObjectPool")).unwrap();
        for cell in ["sample", "10", "100", "2.5", "us/op", "-"] {
            assert!(line.contains(cell), "{cell} missing from {line}");
        }

        let widths: Vec<usize> = text.lines().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{text}");
    }
}
