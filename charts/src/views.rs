use results::{
    extract::Extractor,
    grid::Axes,
    normalize::ON_DEMAND,
    percentile::{self, primary_metrics, PERCENTILES},
    Error, Field, Mode, Predicate, Table,
};
use tracing::{debug, info};

use crate::render::{Renderer, YFormat};

/// Primary rows of one mode
pub fn mode(table: &Table, mode: Mode) -> Table {
    table.filter(&Predicate::eq(Field::Mode, mode).and(primary_metrics()))
}

/// Throughput rows of the pool implementations
pub fn pools_only(thrpt: &Table) -> Table {
    thrpt.filter(&!Predicate::eq(Field::Benchmark, ON_DEMAND))
}

/// Sample rows of mean scores; percentile rows carry no score error
pub fn sample_means(sample: &Table) -> Table {
    sample.filter(&Predicate::HasError)
}

pub fn sample_percentiles(sample: &Table) -> Table {
    sample.filter(&!Predicate::HasError)
}

/// Every chart of a results directory. Throughput, sample time and percentile
/// charts are always drawn, so missing rows for them fail the run.
pub fn render_all(renderer: &Renderer, table: &Table, axes: Axes) -> anyhow::Result<()> {
    let secondary = table.len() - table.filter(&primary_metrics()).len();
    if secondary > 0 {
        debug!("{secondary} profiler rows left out of the charts");
    }
    let has_pool_size = !Predicate::is_null(Field::PoolSize);

    let thrpt = required(mode(table, Mode::Throughput), "throughput")?;
    renderer.save_plots(&pools_only(&thrpt), axes, "Throughput Comparison", "thrpt-all")?;
    renderer.regression(&thrpt, Field::Threads, "Throughput vs Threads", "lmplot_thrpt_vs_threads")?;
    if let Some(sized) = optional(thrpt.filter(&has_pool_size), "throughput with a pool size") {
        renderer.regression(
            &sized,
            Field::PoolSize,
            "Throughput vs Pool Sizes",
            "lmplot_thrpt_vs_pool_sizes",
        )?;
    }

    let sample = mode(table, Mode::SampleTime);
    let means = required(sample_means(&sample), "sample time")?;
    renderer.save_plots(&means, axes, "Sample Time Comparison", "sample-all")?;
    renderer.regression(&means, Field::Threads, "Sample Time vs Threads", "lmplot_sample_vs_threads")?;
    if let Some(sized) = optional(means.filter(&has_pool_size), "sample time with a pool size") {
        renderer.regression(
            &sized,
            Field::PoolSize,
            "Sample Time vs Pool Sizes",
            "lmplot_sample_vs_pool_sizes",
        )?;
    }

    for p in PERCENTILES {
        let latency = required(percentile::extract(&sample, p.tag), p.tag)?;
        renderer.bar(
            &latency,
            axes,
            &format!("{}th Percentile Latency Comparison", p.title),
            &format!("latency{}", p.title),
            YFormat::Fixed(2),
        )?;
    }

    let percentiles = Extractor::pool()?.apply(sample_percentiles(&sample));
    for pool in percentiles.unique(Field::Pool) {
        renderer.bar(
            &percentiles.filter(&Predicate::eq(Field::Pool, pool.clone())),
            axes,
            &format!("Latency Percentiles for {pool}"),
            &format!("{pool}-latency"),
            YFormat::Thousands,
        )?;
    }

    if let Some(avgt) = optional(mode(table, Mode::AverageTime), "average time") {
        renderer.save_plots(&avgt, axes, "Average Time Comparison", "avgt-all")?;
    }
    if let Some(ss) = optional(mode(table, Mode::SingleShot), "single shot time") {
        renderer.save_plots(&ss, axes, "Single Shot Time Comparison", "ss-all")?;
    }
    Ok(())
}

fn required(table: Table, what: &str) -> results::Result<Table> {
    if table.is_empty() {
        return Err(Error::EmptySelection(format!("{what} charts")));
    }
    Ok(table)
}

fn optional(table: Table, what: &str) -> Option<Table> {
    if table.is_empty() {
        info!("No {what} results, skipping its charts");
        return None;
    }
    Some(table)
}
