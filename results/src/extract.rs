use regex::Regex;

use crate::{Error, Result, Table};

/// Fills the derived `Pool` column from the benchmark label through a regex
/// with a single named capture group.
#[derive(Debug, Clone)]
pub struct Extractor {
    pattern: Regex,
    group: String,
}

impl Extractor {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)?;
        let names: Vec<&str> = regex.capture_names().flatten().collect();
        let [group] = names.as_slice() else {
            return Err(Error::InvalidExtractor(pattern.to_string()));
        };
        let group = group.to_string();
        Ok(Self {
            pattern: regex,
            group,
        })
    }

    pub fn pool() -> Result<Self> {
        Self::new(r"(?P<Pool>\w+Pool)")
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn extract(&self, label: &str) -> Option<String> {
        self.pattern
            .captures(label)
            .and_then(|c| c.name(&self.group))
            .map(|m| m.as_str().to_string())
    }

    pub fn apply(&self, table: Table) -> Table {
        Table::new(
            table
                .into_rows()
                .into_iter()
                .map(|mut row| {
                    row.pool = self.extract(&row.benchmark);
                    row
                })
                .collect(),
        )
    }
}
