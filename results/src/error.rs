use thiserror::Error;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no result files match `{0}`")]
    NoInputFiles(String),
    #[error("{file}: missing column `{column}`")]
    MissingColumn { file: String, column: String },
    #[error("{file}: columns {found:?} differ from {expected:?} of the first file")]
    SchemaMismatch {
        file: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("{file}:{line}: invalid {column} value `{value}`")]
    InvalidValue {
        file: String,
        line: u64,
        column: String,
        value: String,
    },
    #[error("no rows selected for {0}")]
    EmptySelection(String),
    #[error("rows mix units {0:?}")]
    MixedUnits(Vec<String>),
    #[error("{count} rows for {hue} at {x}{facet}, expected one")]
    DuplicateCell {
        facet: String,
        hue: String,
        x: String,
        count: usize,
    },
    #[error("`{0}` must have exactly one named capture group")]
    InvalidExtractor(String),
    #[error("{0} is not a numeric axis")]
    NonNumericAxis(String),
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("glob: {0}")]
    Glob(#[from] glob::GlobError),
    #[error("regex: {0}")]
    Regex(#[from] regex::Error),
    #[error("regression: {0}")]
    Regression(#[from] linregress::Error),
}
