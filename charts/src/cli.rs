use std::path::PathBuf;

use clap::Parser;
use results::{grid::Axes, snapshot::SNAPSHOT, Field, POOL_SIZE};

/// Benchmark Result Charts
///
/// Run inside a results directory to chart every JMH result file in it.
#[derive(Debug, Clone, Parser)]
pub struct Args {
    /// Result files to read
    #[arg(short, long, default_value = "*.csv")]
    pub pattern: String,

    /// Directory the charts and the snapshot are written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Chart file name, `{name}` is replaced by the chart name
    #[arg(long, default_value = "{name}.png")]
    pub filename: String,

    /// Field on the x axis of bar charts
    #[arg(short, default_value = "threads")]
    pub x: Field,

    /// Field of the colored series of bar charts
    #[arg(long, default_value = "benchmark")]
    pub hue: Field,

    /// Field of the panels of bar charts
    #[arg(long, default_value = "pool-size")]
    pub col: Field,

    /// Draw bar charts in a single panel
    #[arg(long)]
    pub no_col: bool,

    /// Header of the pool size parameter column
    #[arg(long, default_value = POOL_SIZE)]
    pub pool_size_column: String,

    /// File name of the normalized results snapshot
    #[arg(long, default_value = SNAPSHOT)]
    pub snapshot: PathBuf,

    /// Do not write the snapshot
    #[arg(long)]
    pub no_snapshot: bool,

    /// Print the rows behind every chart
    #[arg(long)]
    pub print_data: bool,

    /// Width of one chart panel in pixels
    #[arg(long, default_value_t = 600)]
    pub width: u32,

    /// Height of one chart panel in pixels
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Log debug messages
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn axes(&self) -> Axes {
        Axes {
            x: self.x,
            hue: self.hue,
            col: (!self.no_col).then_some(self.col),
        }
    }

    pub fn snapshot_path(&self) -> Option<PathBuf> {
        (!self.no_snapshot).then(|| self.output_dir.join(&self.snapshot))
    }
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use clap::Parser;
    use results::Field;

    use super::Args;

    #[test]
    fn defaults() {
        let args = Args::parse_from(["charts"]);
        let axes = args.axes();
        assert_eq!(axes.x, Field::Threads);
        assert_eq!(axes.hue, Field::Benchmark);
        assert_eq!(axes.col, Some(Field::PoolSize));
        assert_eq!(args.pattern, "*.csv");
        assert_eq!(args.pool_size_column, "Param: poolSize");
        assert_eq!(args.snapshot_path(), Some(PathBuf::from("./all_results.csv")));
    }

    #[test]
    fn layout_flags() {
        let args = Args::parse_from([
            "charts",
            "-p",
            "results-*-threads.csv",
            "-x",
            "pool-size",
            "--col",
            "threads",
            "--no-snapshot",
        ]);
        assert_eq!(args.axes().x, Field::PoolSize);
        assert_eq!(args.axes().col, Some(Field::Threads));
        assert_eq!(args.snapshot_path(), None);

        let args = Args::parse_from(["charts", "--no-col"]);
        assert_eq!(args.axes().col, None);

        assert!(Args::try_parse_from(["charts", "--hue", "score"]).is_err());
    }
}
