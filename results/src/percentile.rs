use crate::{Field, Predicate, Table};

/// Percentile of a sampled latency distribution, as tagged by JMH
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Percentile {
    /// Used in chart titles and file names
    pub title: &'static str,
    pub tag: &'static str,
}

pub const PERCENTILES: [Percentile; 7] = [
    Percentile { title: "50", tag: "p0.50" },
    Percentile { title: "90", tag: "p0.90" },
    Percentile { title: "95", tag: "p0.95" },
    Percentile { title: "99", tag: "p0.99" },
    Percentile { title: "99.9", tag: "p0.999" },
    Percentile { title: "99.99", tag: "p0.9999" },
    Percentile { title: "100", tag: "p1.00" },
];

/// Rows of a benchmark's own score and its percentiles. Profiler secondaries
/// such as `FastObjectPool·gc.alloc.rate` are left out, they carry units of
/// their own.
pub fn primary_metrics() -> Predicate {
    (!Predicate::contains(Field::Benchmark, "·"))
        .or(Predicate::contains(Field::Benchmark, "·p0."))
        .or(Predicate::contains(Field::Benchmark, "·p1."))
}

/// Label without its percentile tag and method part:
/// `FooPool:useObject·p0.99` and `FooPool·p0.99` both give `FooPool`.
pub fn base_label(label: &str, tag: &str) -> Option<String> {
    let base = label.strip_suffix(tag)?.trim_end_matches('·');
    let base = base.split(':').next().unwrap_or(base);
    Some(base.to_string())
}

/// Rows tagged with `tag`, relabelled to their base label. Only percentiles
/// present in the input are available.
pub fn extract(table: &Table, tag: &str) -> Table {
    table
        .filter(&Predicate::ends_with(Field::Benchmark, tag))
        .map_benchmarks(|label| base_label(label, tag).unwrap_or_else(|| label.to_string()))
}
