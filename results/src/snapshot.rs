use std::path::Path;

use serde::Serialize;

use crate::{
    loader::Schema, Mode, Result, Table, BENCHMARK, MODE, SCORE, SCORE_ERROR, THREADS, UNIT,
};

/// File name of the normalized results
pub const SNAPSHOT: &str = "all_results.csv";

#[derive(Serialize)]
struct Record<'a> {
    benchmark: &'a str,
    mode: Mode,
    threads: u32,
    pool_size: Option<u32>,
    score: f64,
    score_error: Option<f64>,
    unit: &'a str,
}

/// Write the table as a result file the loader can read back
pub fn write(table: &Table, schema: &Schema, path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record([
        BENCHMARK,
        MODE,
        THREADS,
        schema.pool_size.as_str(),
        SCORE,
        SCORE_ERROR,
        UNIT,
    ])?;
    for row in table.rows() {
        writer.serialize(Record {
            benchmark: &row.benchmark,
            mode: row.mode,
            threads: row.threads,
            pool_size: row.pool_size,
            score: row.score,
            score_error: row.score_error,
            unit: &row.unit,
        })?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use std::fs;

    use tempfile::TempDir;

    use super::write;
    use crate::{loader, row, Mode, Table};

    #[test]
    fn snapshot_reads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("all_results.csv");

        let mut percentile = row("FastObjectPool·p0.99", Mode::SampleTime, 4, 1.5, "us/op");
        percentile.score_error = None;
        percentile.pool_size = None;
        let table = Table::new(vec![
            row("FastObjectPool", Mode::Throughput, 4, 100.0, "ops/ms"),
            percentile,
        ]);

        let schema = loader::Schema::default();
        write(&table, &schema, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Benchmark,Mode,Threads,Param: poolSize,Score,Score Error (99.9%),Unit")
        );
        assert_eq!(lines.next(), Some("FastObjectPool,thrpt,4,100,100.0,10.0,ops/ms"));
        assert_eq!(lines.next(), Some("FastObjectPool·p0.99,sample,4,,1.5,,us/op"));

        assert_eq!(loader::load(&path, &schema).unwrap(), table);
    }
}
