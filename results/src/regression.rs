use linregress::{FormulaRegressionBuilder, RegressionDataBuilder};

use crate::{Error, Field, Result, Table, Value};

/// Least-squares line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    pub slope: f64,
    pub intercept: f64,
}

impl Fit {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Ordinary least squares of `y ~ x` over `points`. `None` with fewer than
/// two distinct x values.
pub fn linear_fit(points: &[(f64, f64)]) -> Result<Option<Fit>> {
    let mut xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    xs.sort_by(f64::total_cmp);
    xs.dedup();
    if xs.len() < 2 {
        return Ok(None);
    }

    let data = RegressionDataBuilder::new().build_from([
        ("Y", points.iter().map(|p| p.1).collect::<Vec<f64>>()),
        ("X", points.iter().map(|p| p.0).collect()),
    ])?;
    let params = FormulaRegressionBuilder::new()
        .data(&data)
        .formula("Y ~ X")
        .fit_without_statistics()?;

    Ok(Some(Fit {
        intercept: params[0],
        slope: params[1],
    }))
}

/// Scores of one hue value against a numeric axis
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: Value,
    pub points: Vec<(f64, f64)>,
}

impl Series {
    pub fn fit(&self) -> Result<Option<Fit>> {
        linear_fit(&self.points)
    }
}

/// One series per `hue` value, in sorted order, with `x` as a numeric axis.
/// Rows with an absent `x` or `hue` value or a non-finite score are left out.
pub fn scatter_series(table: &Table, x: Field, hue: Field) -> Result<Vec<Series>> {
    let mut series: Vec<Series> = table
        .unique(hue)
        .into_iter()
        .map(|label| Series {
            label,
            points: Vec::new(),
        })
        .collect();

    for row in table.rows() {
        let (Some(x_value), Some(label)) = (x.value(row), hue.value(row)) else {
            continue;
        };
        if !row.score.is_finite() {
            continue;
        }
        let x_value = x_value
            .as_f64()
            .ok_or_else(|| Error::NonNumericAxis(x.label().to_string()))?;
        if let Some(s) = series.iter_mut().find(|s| s.label == label) {
            s.points.push((x_value, row.score));
        }
    }

    series.retain(|s| !s.points.is_empty());
    if series.is_empty() {
        return Err(Error::EmptySelection(format!(
            "Score vs {}",
            x.label()
        )));
    }
    Ok(series)
}
