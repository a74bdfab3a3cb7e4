use anyhow::Context;
use clap::Parser;
use tracing::{info, Level};

use results::{
    loader::{self, Schema},
    normalize::RuleSet,
    snapshot,
};

pub mod cli;
pub mod render;
pub mod views;

use cli::Args;
use render::Renderer;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .without_time()
        .init();

    let snapshot_path = args.snapshot_path();
    let files = loader::discover(&args.pattern, snapshot_path.as_deref())?;
    info!("Creating charts using data in following files:");
    for file in &files {
        info!("{}", file.display());
    }
    info!("Creating charts...");

    let schema = Schema::new(&args.pool_size_column);
    let table = RuleSet::object_pool()?.normalize(loader::load_all(&files, &schema)?);

    if let Some(path) = &snapshot_path {
        snapshot::write(&table, &schema, path)
            .with_context(|| format!("writing snapshot {}", path.display()))?;
        info!("Wrote {} rows to {}", table.len(), path.display());
    }

    let renderer = Renderer::new(&args)?;
    views::render_all(&renderer, &table, args.axes())?;

    info!("Done");
    Ok(())
}
