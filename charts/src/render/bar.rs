use std::path::Path;

use anyhow::Context;
use plotters::prelude::*;
use results::{
    grid::{Axes, Grid, Sparse},
    Table, Value,
};
use tracing::warn;

use super::{
    color, context, Renderer, YFormat, CAPTION_FONT_SIZE, COL_WRAP, LABEL_FONT_SIZE,
    TITLE_FONT_SIZE, TITLE_HEIGHT,
};

/// Share of an x slot covered by its bars
const GROUP_WIDTH: f64 = 0.8;
const CAP_WIDTH: u32 = 6;

#[derive(Debug, Clone, PartialEq)]
struct Bar {
    center: f64,
    width: f64,
    score: f64,
    error: Option<f64>,
}

impl Bar {
    fn left(&self) -> f64 {
        self.center - self.width / 2.0 + 0.01
    }

    fn right(&self) -> f64 {
        self.center + self.width / 2.0 - 0.01
    }
}

impl Renderer {
    /// One bar per (x, hue) in every facet, duplicate rows averaged
    pub fn bar(
        &self,
        table: &Table,
        axes: Axes,
        title: &str,
        name: &str,
        format: YFormat,
    ) -> anyhow::Result<()> {
        let unit = table.unit().with_context(|| format!("chart `{title}`"))?;
        let path = self.start(table, title, name);
        let grid = Grid::build(table, axes).with_context(|| format!("chart `{title}`"))?;
        let bars = bars(&grid, false)?;
        self.draw_bars(&grid, &bars, unit, title, &path, format)
            .with_context(|| context(title, &path))
    }

    /// Bars with whiskers from the score error of their single row. Series
    /// with missing x values are drawn as far as they go and returned.
    pub fn bar_with_error_bars(
        &self,
        table: &Table,
        axes: Axes,
        title: &str,
        name: &str,
    ) -> anyhow::Result<Vec<Sparse>> {
        let unit = table.unit().with_context(|| format!("chart `{title}`"))?;
        let path = self.start(table, title, name);
        let grid = Grid::build(table, axes).with_context(|| format!("chart `{title}`"))?;
        let bars = bars(&grid, true).with_context(|| format!("chart `{title}`"))?;
        let sparse = grid.sparse();
        for series in &sparse {
            warn!("Missing bars in {title}: {series}");
        }
        self.draw_bars(&grid, &bars, unit, title, &path, YFormat::Thousands)
            .with_context(|| context(title, &path))?;
        Ok(sparse)
    }

    fn draw_bars(
        &self,
        grid: &Grid,
        bars: &[Vec<Vec<Bar>>],
        unit: &str,
        title: &str,
        path: &Path,
        format: YFormat,
    ) -> anyhow::Result<()> {
        let facets = grid.facets().len();
        let cols = facets.min(COL_WRAP);
        let rows = facets.div_ceil(COL_WRAP);
        let (width, height) = self.panel;

        let root = BitMapBackend::new(
            path,
            (width * cols as u32, height * rows as u32 + TITLE_HEIGHT),
        )
        .into_drawing_area();
        root.fill(&WHITE)?;
        let root = root.titled(title, ("sans-serif", TITLE_FONT_SIZE))?;
        let panels = root.split_evenly((rows, cols));

        let errors = bars.iter().flatten().flatten().any(|b| b.error.is_some());
        let y_max = match grid.max_score(errors) {
            max if max > 0.0 => max * 1.1,
            _ => 1.0,
        };
        let xs = grid.xs();
        let x_desc = grid.axes().x.label();
        let y_desc = format!("Score ({unit})");

        for (f, (panel, hues)) in panels.iter().zip(bars).enumerate() {
            let mut chart = ChartBuilder::on(panel)
                .caption(
                    grid.facet_title(f).unwrap_or_default(),
                    ("sans-serif", CAPTION_FONT_SIZE),
                )
                .margin(10)
                .x_label_area_size(40)
                .y_label_area_size(80)
                .build_cartesian_2d(-0.5..(xs.len() as f64 - 0.5), 0f64..y_max)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(xs.len() + 1)
                .x_label_formatter(&|x| tick_label(xs, *x))
                .y_label_formatter(&|y| format.format(*y))
                .x_desc(x_desc)
                .y_desc(y_desc.as_str())
                .label_style(("sans-serif", LABEL_FONT_SIZE))
                .draw()?;

            for (h, series) in hues.iter().enumerate() {
                let color = color(h);
                chart
                    .draw_series(series.iter().map(|b| {
                        Rectangle::new([(b.left(), 0.0), (b.right(), b.score)], color.filled())
                    }))?
                    .label(grid.hues()[h].to_string())
                    .legend(move |(x, y)| {
                        Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
                    });

                chart.draw_series(series.iter().filter_map(|b| {
                    let error = b.error?;
                    Some(ErrorBar::new_vertical(
                        b.center,
                        b.score - error,
                        b.score,
                        b.score + error,
                        BLACK.filled(),
                        CAP_WIDTH,
                    ))
                }))?;
            }

            if f + 1 == facets {
                chart
                    .configure_series_labels()
                    .position(SeriesLabelPosition::UpperLeft)
                    .background_style(WHITE.mix(0.8))
                    .border_style(BLACK)
                    .label_font(("sans-serif", LABEL_FONT_SIZE))
                    .draw()?;
            }
        }

        root.present()?;
        Ok(())
    }
}

/// Bars of every facet and hue. With `errors` each bar comes from exactly one
/// row and carries its score error, otherwise duplicate rows are averaged.
fn bars(grid: &Grid, errors: bool) -> results::Result<Vec<Vec<Vec<Bar>>>> {
    let slots = grid.hues().len();
    let width = GROUP_WIDTH / slots as f64;

    (0..grid.facets().len())
        .map(|f| {
            (0..slots)
                .map(|h| {
                    let offset = (h as f64 - (slots as f64 - 1.0) / 2.0) * width;
                    let mut series = Vec::new();
                    for x in 0..grid.xs().len() {
                        let bar = if errors {
                            grid.single(f, h, x)?.map(|row| (row.score, row.score_error))
                        } else {
                            grid.mean(f, h, x).map(|score| (score, None))
                        };
                        let Some((score, error)) = bar.filter(|(score, _)| score.is_finite())
                        else {
                            continue;
                        };
                        series.push(Bar {
                            center: x as f64 + offset,
                            width,
                            score,
                            error: error.filter(|e| e.is_finite()),
                        });
                    }
                    Ok(series)
                })
                .collect::<results::Result<Vec<_>>>()
        })
        .collect()
}

fn tick_label(xs: &[Value], x: f64) -> String {
    let index = x.round();
    if index < 0.0 || (x - index).abs() > 1e-6 {
        return String::new();
    }
    xs.get(index as usize).map(Value::to_string).unwrap_or_default()
}

#[cfg(test)]
mod test {
    use std::fs;

    use results::{grid::Axes, grid::Grid, Error, Mode, ResultRow, Table, Value};
    use tempfile::TempDir;

    use super::{bars, tick_label, Bar};
    use crate::render::{renderer, YFormat};

    const PNG: &[u8] = b"\x89PNG";

    fn row(benchmark: &str, threads: u32, score: f64) -> ResultRow {
        ResultRow {
            benchmark: benchmark.to_string(),
            mode: Mode::Throughput,
            threads,
            pool_size: Some(100),
            score,
            score_error: Some(1.0),
            unit: "ops/ms".to_string(),
            pool: None,
        }
    }

    #[test]
    fn partial_series_keeps_slots() {
        let table = Table::new(vec![
            row("FastObjectPool", 1, 10.0),
            row("FastObjectPool", 2, 20.0),
            row("ViburObjectPool", 1, 30.0),
        ]);
        let grid = Grid::build(&table, Axes::default()).unwrap();
        let bars = bars(&grid, true).unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].len(), 2);

        let fast = &bars[0][0];
        assert_eq!(fast.len(), 2);
        assert!((fast[0].center + 0.2).abs() < 1e-9);
        assert!((fast[1].center - 0.8).abs() < 1e-9);
        assert_eq!(fast[1].score, 20.0);
        assert_eq!(fast[1].error, Some(1.0));

        // the missing point leaves its slot empty
        let vibur = &bars[0][1];
        assert_eq!(vibur.len(), 1);
        assert!((vibur[0].center - 0.2).abs() < 1e-9);
        assert!((vibur[0].width - 0.4).abs() < 1e-9);
        assert_eq!(vibur[0].score, 30.0);

        assert_eq!(grid.sparse().len(), 1);
        assert_eq!(grid.sparse()[0].hue, Value::from("ViburObjectPool"));
    }

    #[test]
    fn means_without_whiskers() {
        let table = Table::new(vec![
            row("FastObjectPool", 1, 10.0),
            row("FastObjectPool", 1, 30.0),
        ]);
        let grid = Grid::build(&table, Axes::default()).unwrap();

        let plain = bars(&grid, false).unwrap();
        assert_eq!(
            plain[0][0],
            vec![Bar { center: 0.0, width: 0.8, score: 20.0, error: None }]
        );
        assert!(matches!(bars(&grid, true), Err(Error::DuplicateCell { .. })));
    }

    #[test]
    fn ticks_only_at_slots() {
        let xs = [Value::Int(1), Value::Int(2), Value::Int(4)];
        assert_eq!(tick_label(&xs, 0.0), "1");
        assert_eq!(tick_label(&xs, 2.0000000001), "4");
        assert_eq!(tick_label(&xs, 0.5), "");
        assert_eq!(tick_label(&xs, -0.5), "");
        assert_eq!(tick_label(&xs, 3.0), "");
    }

    #[test]
    fn sparse_chart_is_rendered() {
        let dir = TempDir::new().unwrap();
        let table = Table::new(vec![
            row("FastObjectPool", 1, 10.0),
            row("FastObjectPool", 2, 20.0),
            row("ViburObjectPool", 1, 30.0),
        ]);

        let sparse = renderer(dir.path())
            .bar_with_error_bars(&table, Axes::default(), "Throughput Comparison", "thrpt")
            .unwrap();
        assert_eq!(sparse.len(), 1);
        assert_eq!(sparse[0].hue, Value::from("ViburObjectPool"));
        assert_eq!((sparse[0].expected, sparse[0].found), (2, 1));

        let png = fs::read(dir.path().join("thrpt.png")).unwrap();
        assert!(png.starts_with(PNG));
    }

    #[test]
    fn existing_chart_is_overwritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latency99.png");
        fs::write(&path, "stale").unwrap();

        let table = Table::new(vec![row("FastObjectPool", 1, 0.25), row("ViburObjectPool", 1, 0.5)]);
        renderer(dir.path())
            .bar(&table, Axes::default(), "99th Percentile", "latency99", YFormat::Fixed(2))
            .unwrap();
        assert!(fs::read(&path).unwrap().starts_with(PNG));
    }

    #[test]
    fn mixed_units_are_not_drawn() {
        let dir = TempDir::new().unwrap();
        let mut gc = row("FastObjectPool·gc.alloc.rate", 1, 512.0);
        gc.unit = "MB/sec".to_string();
        let table = Table::new(vec![row("FastObjectPool", 1, 10.0), gc]);

        let err = renderer(dir.path())
            .bar(&table, Axes::default(), "Throughput", "thrpt", YFormat::Thousands)
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::MixedUnits(_))));
        assert!(!dir.path().join("thrpt.png").exists());
    }
}
