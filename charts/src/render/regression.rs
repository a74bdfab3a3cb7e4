use std::{
    f64::consts::{FRAC_PI_2, TAU},
    path::Path,
};

use anyhow::Context;
use plotters::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use results::{
    regression::{scatter_series, Series},
    Field, Table,
};

use super::{color, context, Renderer, YFormat, LABEL_FONT_SIZE, TITLE_FONT_SIZE, TITLE_HEIGHT};

/// Scatter jitter in data units, both axes
const JITTER: f64 = 0.1;
const JITTER_SEED: u64 = 17;
const MARKER_SIZE: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Marker {
    Circle,
    TriangleDown,
    TriangleUp,
    TriangleLeft,
    TriangleRight,
    Plus,
    Square,
    Pentagon,
    Star,
    Cross,
    Diamond,
}

const MARKERS: [Marker; 11] = [
    Marker::Circle,
    Marker::TriangleDown,
    Marker::TriangleUp,
    Marker::TriangleLeft,
    Marker::TriangleRight,
    Marker::Plus,
    Marker::Square,
    Marker::Pentagon,
    Marker::Star,
    Marker::Cross,
    Marker::Diamond,
];

impl Marker {
    /// Line markers are stroked, the others filled
    fn is_line(self) -> bool {
        matches!(self, Marker::Plus | Marker::Star | Marker::Cross)
    }

    /// Vertices in pixels around the data point. Line markers are one path
    /// running through the center between strokes.
    fn outline(self, size: i32) -> Vec<(i32, i32)> {
        let s = size;
        match self {
            Marker::Circle => polygon(16, s, 0.0),
            Marker::TriangleDown => vec![(-s, -s), (s, -s), (0, s)],
            Marker::TriangleUp => vec![(-s, s), (s, s), (0, -s)],
            Marker::TriangleLeft => vec![(s, -s), (s, s), (-s, 0)],
            Marker::TriangleRight => vec![(-s, -s), (-s, s), (s, 0)],
            Marker::Plus => vec![(-s, 0), (s, 0), (0, 0), (0, -s), (0, s)],
            Marker::Square => vec![(-s, -s), (s, -s), (s, s), (-s, s)],
            Marker::Pentagon => polygon(5, s, -FRAC_PI_2),
            Marker::Star => {
                let d = s * 7 / 10;
                vec![(-s, 0), (s, 0), (0, 0), (-d, -s), (d, s), (0, 0), (d, -s), (-d, s)]
            }
            Marker::Cross => vec![(-s, -s), (s, s), (0, 0), (s, -s), (-s, s)],
            Marker::Diamond => vec![(0, -s), (s, 0), (0, s), (-s, 0)],
        }
    }
}

fn polygon(corners: usize, radius: i32, start: f64) -> Vec<(i32, i32)> {
    (0..corners)
        .map(|i| {
            let angle = start + TAU * i as f64 / corners as f64;
            let r = f64::from(radius);
            ((r * angle.cos()).round() as i32, (r * angle.sin()).round() as i32)
        })
        .collect()
}

impl Renderer {
    /// Score against a numeric field, one jittered scatter and least-squares
    /// line per benchmark
    pub fn regression(&self, table: &Table, x: Field, title: &str, name: &str) -> anyhow::Result<()> {
        let unit = table.unit().with_context(|| format!("chart `{title}`"))?;
        let path = self.start(table, title, name);
        let series =
            scatter_series(table, x, Field::Benchmark).with_context(|| format!("chart `{title}`"))?;
        self.draw_regression(&series, x, unit, title, &path)
            .with_context(|| context(title, &path))
    }

    fn draw_regression(
        &self,
        series: &[Series],
        x: Field,
        unit: &str,
        title: &str,
        path: &Path,
    ) -> anyhow::Result<()> {
        let (x_min, x_max) = bounds(series.iter().flat_map(|s| s.points.iter().map(|p| p.0)));
        let (y_min, y_max) = bounds(series.iter().flat_map(|s| s.points.iter().map(|p| p.1)));
        let x_pad = ((x_max - x_min) * 0.05).max(1.0);
        let y_top = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

        // a single larger panel
        let (width, height) = self.panel;
        let root = BitMapBackend::new(path, (width * 4 / 3, height * 4 / 3 + TITLE_HEIGHT))
            .into_drawing_area();
        root.fill(&WHITE)?;
        let root = root.titled(title, ("sans-serif", TITLE_FONT_SIZE))?;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d((x_min - x_pad)..(x_max + x_pad), y_min.min(0.0)..y_top)?;

        chart
            .configure_mesh()
            .x_desc(x.label())
            .y_desc(format!("Score ({unit})"))
            .y_label_formatter(&|y| YFormat::Thousands.format(*y))
            .label_style(("sans-serif", LABEL_FONT_SIZE))
            .draw()?;

        let mut rng = StdRng::seed_from_u64(JITTER_SEED);
        for (i, s) in series.iter().enumerate() {
            let color = color(i);
            let style = color.filled();
            let points: Vec<(f64, f64)> = s
                .points
                .iter()
                .map(|&(px, py)| {
                    (
                        px + rng.gen_range(-JITTER..=JITTER),
                        py + rng.gen_range(-JITTER..=JITTER),
                    )
                })
                .collect();

            let marker = MARKERS[i % MARKERS.len()];
            let outline = marker.outline(MARKER_SIZE);
            let anno = if marker.is_line() {
                chart.draw_series(points.iter().map(|&p| {
                    EmptyElement::at(p) + PathElement::new(outline.clone(), color.stroke_width(2))
                }))?
            } else {
                chart.draw_series(
                    points
                        .iter()
                        .map(|&p| EmptyElement::at(p) + Polygon::new(outline.clone(), style)),
                )?
            };
            anno.label(s.label.to_string())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));

            if let Some(fit) = s.fit()? {
                let (lo, hi) = bounds(s.points.iter().map(|p| p.0));
                chart.draw_series(LineSeries::new(
                    [(lo, fit.at(lo)), (hi, fit.at(hi))],
                    color.stroke_width(2),
                ))?;
            }
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(("sans-serif", LABEL_FONT_SIZE))
            .draw()?;

        root.present()?;
        Ok(())
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
            (min.min(v), max.max(v))
        });
    if min > max {
        (0.0, 0.0)
    } else {
        (min, max)
    }
}
