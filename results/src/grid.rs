use std::{collections::BTreeMap, fmt};

use tracing::debug;

use crate::{Error, Field, Result, ResultRow, Table, Value};

/// Fields a chart is laid out by: the x axis, the colored series and the
/// panel (facet) each row is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Axes {
    pub x: Field,
    pub hue: Field,
    pub col: Option<Field>,
}

impl Default for Axes {
    fn default() -> Self {
        Self {
            x: Field::Threads,
            hue: Field::Benchmark,
            col: Some(Field::PoolSize),
        }
    }
}

/// Rows partitioned by (facet, hue, x), every axis in sorted order.
#[derive(Debug)]
pub struct Grid<'a> {
    axes: Axes,
    xs: Vec<Value>,
    hues: Vec<Value>,
    /// `[None]` when the chart has a single panel
    facets: Vec<Option<Value>>,
    cells: BTreeMap<(usize, usize, usize), Vec<&'a ResultRow>>,
}

/// A (facet, hue) series missing some x values
#[derive(Debug, Clone, PartialEq)]
pub struct Sparse {
    pub facet: Option<Value>,
    pub hue: Value,
    pub expected: usize,
    pub found: usize,
}

impl fmt::Display for Sparse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hue)?;
        if let Some(facet) = &self.facet {
            write!(f, " ({facet})")?;
        }
        write!(f, ": expected {} rows, found {}", self.expected, self.found)
    }
}

impl<'a> Grid<'a> {
    /// Rows with an absent x, hue or facet value are left out.
    pub fn build(table: &'a Table, axes: Axes) -> Result<Self> {
        let keyed: Vec<_> = table
            .rows()
            .iter()
            .filter_map(|row| {
                let x = axes.x.value(row)?;
                let hue = axes.hue.value(row)?;
                let facet = match axes.col {
                    Some(col) => Some(col.value(row)?),
                    None => None,
                };
                Some((facet, hue, x, row))
            })
            .collect();

        let dropped = table.len() - keyed.len();
        if dropped > 0 {
            debug!("{dropped} rows without {:?} values left out", axes);
        }
        if keyed.is_empty() {
            return Err(Error::EmptySelection(format!(
                "{} by {}",
                axes.x.label(),
                axes.hue.label()
            )));
        }

        let xs = sorted(keyed.iter().map(|k| k.2.clone()));
        let hues = sorted(keyed.iter().map(|k| k.1.clone()));
        let facets = sorted(keyed.iter().map(|k| k.0.clone()));

        let mut cells: BTreeMap<_, Vec<&ResultRow>> = BTreeMap::new();
        for (facet, hue, x, row) in keyed {
            let key = (index(&facets, &facet), index(&hues, &hue), index(&xs, &x));
            cells.entry(key).or_default().push(row);
        }

        Ok(Self {
            axes,
            xs,
            hues,
            facets,
            cells,
        })
    }

    pub fn axes(&self) -> Axes {
        self.axes
    }

    pub fn xs(&self) -> &[Value] {
        &self.xs
    }

    pub fn hues(&self) -> &[Value] {
        &self.hues
    }

    pub fn facets(&self) -> &[Option<Value>] {
        &self.facets
    }

    pub fn rows(&self, facet: usize, hue: usize, x: usize) -> &[&'a ResultRow] {
        self.cells
            .get(&(facet, hue, x))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Mean score of a cell
    pub fn mean(&self, facet: usize, hue: usize, x: usize) -> Option<f64> {
        let rows = self.rows(facet, hue, x);
        if rows.is_empty() {
            return None;
        }
        Some(rows.iter().map(|r| r.score).sum::<f64>() / rows.len() as f64)
    }

    /// The only row of a cell
    pub fn single(&self, facet: usize, hue: usize, x: usize) -> Result<Option<&'a ResultRow>> {
        match self.rows(facet, hue, x) {
            [] => Ok(None),
            [row] => Ok(Some(*row)),
            rows => Err(Error::DuplicateCell {
                facet: self.facets[facet]
                    .as_ref()
                    .map(|v| format!(" in {} = {v}", self.col_label()))
                    .unwrap_or_default(),
                hue: self.hues[hue].to_string(),
                x: format!("{} = {}", self.axes.x.label(), self.xs[x]),
                count: rows.len(),
            }),
        }
    }

    /// Every (facet, hue) series with fewer rows than x values
    pub fn sparse(&self) -> Vec<Sparse> {
        let mut sparse = Vec::new();
        for (f, facet) in self.facets.iter().enumerate() {
            for (h, hue) in self.hues.iter().enumerate() {
                let found: usize = (0..self.xs.len()).map(|x| self.rows(f, h, x).len()).sum();
                if found < self.xs.len() {
                    sparse.push(Sparse {
                        facet: facet.clone(),
                        hue: hue.clone(),
                        expected: self.xs.len(),
                        found,
                    });
                }
            }
        }
        sparse
    }

    /// Largest bar top, whiskers included when `errors` is set
    pub fn max_score(&self, errors: bool) -> f64 {
        self.cells
            .values()
            .flatten()
            .map(|r| {
                let error = if errors {
                    r.score_error.unwrap_or(0.0)
                } else {
                    0.0
                };
                r.score + error
            })
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max)
    }

    pub fn facet_title(&self, facet: usize) -> Option<String> {
        self.facets[facet]
            .as_ref()
            .map(|v| format!("{} = {v}", self.col_label()))
    }

    fn col_label(&self) -> &'static str {
        self.axes.col.map(|c| c.label()).unwrap_or_default()
    }
}

fn sorted<T: Ord>(values: impl Iterator<Item = T>) -> Vec<T> {
    let mut values: Vec<T> = values.collect();
    values.sort();
    values.dedup();
    values
}

fn index<T: Ord>(sorted: &[T], value: &T) -> usize {
    sorted.binary_search(value).unwrap_or_else(|i| i)
}

#[cfg(test)]
mod test {
    use super::{Axes, Grid, Sparse};
    use crate::{row, Error, Field, Mode, Predicate, Table, Value};

    fn table() -> Table {
        let mut rows = Vec::new();
        for threads in [10, 1, 2] {
            for (benchmark, score) in [("FastObjectPool", 10.0), ("ViburObjectPool", 20.0)] {
                rows.push(row(benchmark, Mode::Throughput, threads, score * threads as f64, "ops/ms"));
            }
        }
        Table::new(rows)
    }

    #[test]
    fn axes_are_sorted() {
        let table = table();
        let grid = Grid::build(&table, Axes::default()).unwrap();
        assert_eq!(grid.xs(), &[Value::Int(1), Value::Int(2), Value::Int(10)]);
        assert_eq!(
            grid.hues(),
            &[Value::from("FastObjectPool"), Value::from("ViburObjectPool")]
        );
        assert_eq!(grid.facets(), &[Some(Value::Int(100))]);
        assert_eq!(grid.facet_title(0).as_deref(), Some("Pool Size = 100"));

        assert_eq!(grid.mean(0, 1, 2), Some(200.0));
        assert_eq!(grid.single(0, 0, 0).unwrap().map(|r| r.score), Some(10.0));
        assert!(grid.sparse().is_empty());
        assert_eq!(grid.max_score(false), 200.0);
        assert_eq!(grid.max_score(true), 220.0);
    }

    #[test]
    fn duplicates_are_averaged() {
        let table = Table::new(vec![
            row("FastObjectPool", Mode::Throughput, 1, 10.0, "ops/ms"),
            row("FastObjectPool", Mode::Throughput, 1, 20.0, "ops/ms"),
        ]);
        let grid = Grid::build(&table, Axes::default()).unwrap();
        assert_eq!(grid.mean(0, 0, 0), Some(15.0));
        match grid.single(0, 0, 0) {
            Err(Error::DuplicateCell { count, .. }) => assert_eq!(count, 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_point_is_reported_once() {
        let table = table().filter(
            &!Predicate::eq(Field::Benchmark, "ViburObjectPool")
                .and(Predicate::eq(Field::Threads, 2u32)),
        );
        let grid = Grid::build(&table, Axes::default()).unwrap();

        assert_eq!(
            grid.sparse(),
            vec![Sparse {
                facet: Some(Value::Int(100)),
                hue: Value::from("ViburObjectPool"),
                expected: 3,
                found: 2,
            }]
        );
        assert_eq!(
            grid.sparse()[0].to_string(),
            "ViburObjectPool (100): expected 3 rows, found 2"
        );
        // the remaining cells are still there
        assert_eq!(grid.single(0, 1, 0).unwrap().map(|r| r.score), Some(20.0));
        assert_eq!(grid.single(0, 1, 1).unwrap(), None);
        assert_eq!(grid.single(0, 1, 2).unwrap().map(|r| r.score), Some(200.0));
    }

    #[test]
    fn absent_values_leave_the_grid() {
        let mut on_demand = row("OnDemandExpensiveObject", Mode::Throughput, 1, 1.0, "ops/ms");
        on_demand.pool_size = None;
        let table = Table::new(vec![
            on_demand,
            row("FastObjectPool", Mode::Throughput, 1, 2.0, "ops/ms"),
        ]);

        let grid = Grid::build(&table, Axes::default()).unwrap();
        assert_eq!(grid.hues(), &[Value::from("FastObjectPool")]);

        let single_panel = Axes {
            col: None,
            ..Axes::default()
        };
        let grid = Grid::build(&table, single_panel).unwrap();
        assert_eq!(grid.hues().len(), 2);
        assert_eq!(grid.facets(), &[None::<Value>]);
        assert_eq!(grid.facet_title(0), None);
    }

    #[test]
    fn empty_selection() {
        let table = Table::default();
        assert!(matches!(
            Grid::build(&table, Axes::default()),
            Err(Error::EmptySelection(_))
        ));
    }
}
