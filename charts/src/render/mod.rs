use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use plotters::style::RGBColor;
use results::{grid::Axes, Table};
use tracing::info;

use crate::cli::Args;

pub mod bar;
pub mod regression;

const TITLE_FONT_SIZE: u32 = 28;
const CAPTION_FONT_SIZE: u32 = 20;
const LABEL_FONT_SIZE: u32 = 15;
const TITLE_HEIGHT: u32 = 50;
/// Panels per row of a faceted chart
const COL_WRAP: usize = 2;

/// First colors of matplotlib's tab20
const PALETTE: [RGBColor; 11] = [
    RGBColor(31, 119, 180),
    RGBColor(174, 199, 232),
    RGBColor(255, 127, 14),
    RGBColor(255, 187, 120),
    RGBColor(44, 160, 44),
    RGBColor(152, 223, 138),
    RGBColor(214, 39, 40),
    RGBColor(255, 152, 150),
    RGBColor(148, 103, 189),
    RGBColor(197, 176, 213),
    RGBColor(140, 86, 75),
];

fn color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

/// Y axis tick labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YFormat {
    /// Digits grouped by thousands, `12,345.5`
    Thousands,
    /// Fixed number of decimals
    Fixed(usize),
}

impl YFormat {
    pub fn format(&self, value: f64) -> String {
        match *self {
            YFormat::Thousands => thousands(value),
            YFormat::Fixed(decimals) => format!("{value:.decimals$}"),
        }
    }
}

fn thousands(value: f64) -> String {
    // drop float noise of tick positions
    let value = (value * 1e6).round() / 1e6;
    let text = value.abs().to_string();
    let (int, frac) = match text.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(text.len() + int.len() / 3 + 1);
    if value < 0.0 {
        grouped.push('-');
    }
    for (i, digit) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(frac) = frac {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

/// Where charts are written
#[derive(Debug, Clone)]
pub struct Output {
    dir: PathBuf,
    template: String,
}

impl Output {
    pub fn new(dir: impl Into<PathBuf>, template: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            template: template.into(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(self.template.replace("{name}", name))
    }
}

pub struct Renderer {
    output: Output,
    panel: (u32, u32),
    print_data: bool,
}

impl Renderer {
    pub fn new(args: &Args) -> anyhow::Result<Self> {
        fs::create_dir_all(&args.output_dir).with_context(|| {
            format!("creating output directory {}", args.output_dir.display())
        })?;
        Ok(Self {
            output: Output::new(&args.output_dir, &args.filename),
            panel: (args.width, args.height),
            print_data: args.print_data,
        })
    }

    /// Bar chart with and without error bars. The plain one averages
    /// duplicate rows and is the reference for the error bar version.
    pub fn save_plots(&self, table: &Table, axes: Axes, title: &str, name: &str) -> anyhow::Result<()> {
        self.bar(table, axes, title, name, YFormat::Thousands)?;
        self.bar_with_error_bars(table, axes, title, &format!("{name}-with-error-bars"))?;
        Ok(())
    }

    fn start(&self, table: &Table, title: &str, name: &str) -> PathBuf {
        let path = self.output.path(name);
        info!("Creating chart: {title}, filename: {}.", path.display());
        if self.print_data {
            println!("{table}");
        }
        path
    }
}

fn context(title: &str, path: &Path) -> String {
    format!("rendering `{title}` to {}", path.display())
}

#[cfg(test)]
pub(crate) fn renderer(dir: &Path) -> Renderer {
    use clap::Parser;

    let args = Args::parse_from(["charts", "--width", "240", "--height", "200"]);
    Renderer {
        output: Output::new(dir, &args.filename),
        panel: (args.width, args.height),
        print_data: false,
    }
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use super::{color, thousands, Output, YFormat, PALETTE};

    #[test]
    fn thousands_separator() {
        assert_eq!(thousands(0.0), "0");
        assert_eq!(thousands(999.0), "999");
        assert_eq!(thousands(1000.0), "1,000");
        assert_eq!(thousands(1234567.0), "1,234,567");
        assert_eq!(thousands(12345.5), "12,345.5");
        assert_eq!(thousands(-2500.25), "-2,500.25");
        assert_eq!(thousands(20000.000000001), "20,000");
    }

    #[test]
    fn fixed_decimals() {
        assert_eq!(YFormat::Fixed(2).format(1.0), "1.00");
        assert_eq!(YFormat::Fixed(2).format(0.126), "0.13");
        assert_eq!(YFormat::Thousands.format(4096.0), "4,096");
    }

    #[test]
    fn output_template() {
        let output = Output::new("charts", "{name}.png");
        assert_eq!(output.path("thrpt-all"), PathBuf::from("charts/thrpt-all.png"));

        let output = Output::new(".", "run1-{name}.png");
        assert_eq!(
            output.path("FastObjectPool-latency"),
            PathBuf::from("./run1-FastObjectPool-latency.png")
        );
    }

    #[test]
    fn palette_wraps() {
        assert_eq!(color(0), PALETTE[0]);
        assert_eq!(color(PALETTE.len() + 1), PALETTE[1]);
    }
}
