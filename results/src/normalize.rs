use std::borrow::Cow;

use regex::Regex;

use crate::{Result, Table};

/// Package of the object pool benchmarks
pub const PACKAGE: &str = "com.github.chrishantha.microbenchmark.objectpool";

pub const ON_DEMAND: &str = "OnDemandExpensiveObject";

/// Rewrites a whole label matching `pattern` through `replacement`, which
/// may refer to capture groups as `${1}`.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: Regex,
    replacement: String,
}

impl Rule {
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement: replacement.into(),
        })
    }

    /// Matches `from` exactly, without regex syntax
    pub fn literal(from: &str, to: impl Into<String>) -> Result<Self> {
        Self::new(&format!("^{}$", regex::escape(from)), to)
    }

    pub fn apply<'a>(&self, label: &'a str) -> Cow<'a, str> {
        self.pattern.replace(label, self.replacement.as_str())
    }
}

/// Ordered list of rules. Every rule runs over the output of the previous
/// one, a label no rule matches is kept as is.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Short labels for the object pool benchmarks:
    /// `<pkg>.FastObjectPoolBenchmark.useObject:useObject·p0.99` becomes
    /// `FastObjectPool·p0.99`.
    pub fn object_pool() -> Result<Self> {
        let pkg = regex::escape(PACKAGE);
        let test_object = format!(r"^{pkg}\.TestObjectBenchmark\.expensiveObjectCreate");

        Ok(Self::new(vec![
            Rule::new(&format!(r"^{pkg}\.(.*)Benchmark\.useObject$"), "${1}")?,
            Rule::new(
                &format!(r"^{pkg}\.(.*)Benchmark\.useObject:useObject(.*)$"),
                "${1}${2}",
            )?,
            Rule::literal(
                &format!("{PACKAGE}.TestObjectBenchmark.expensiveObjectCreate"),
                ON_DEMAND,
            )?,
            Rule::new(
                &format!("{test_object}:expensiveObjectCreate(.*)$"),
                format!("{ON_DEMAND}${{1}}"),
            )?,
            // profiler secondaries, e.g. `:·gc.alloc.rate`
            Rule::new(
                &format!("{test_object}:(·.*)$"),
                format!("{ON_DEMAND}${{1}}"),
            )?,
            Rule::new(
                &format!(r"^{pkg}\.(.*)Benchmark\.useObject:(·.*)$"),
                "${1}${2}",
            )?,
            Rule::new(&format!(r"^{pkg}\.(.*)$"), "${1}")?,
        ]))
    }

    pub fn apply(&self, label: &str) -> String {
        self.rules
            .iter()
            .fold(label.to_string(), |label, rule| rule.apply(&label).into_owned())
    }

    pub fn normalize(&self, table: Table) -> Table {
        table.map_benchmarks(|label| self.apply(label))
    }
}
