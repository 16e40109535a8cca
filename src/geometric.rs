//! Geometric table reconstructor (4.G): groups text events into rows (by
//! y) within tables (by enclosing rectangle), when no structure tree is
//! available. A greedy, single-pass heuristic — nothing more.

use crate::interpreter::{Rectangle, TextEvent};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GeoCell {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GeoRow {
    pub y: f64,
    pub cells: Vec<GeoCell>,
}

/// An inferred table. `rows` preserves insertion order; row y-keys are not
/// sorted.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GeoTable {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    rows: Vec<GeoRow>,
}

impl GeoTable {
    fn new(rect: &Rectangle) -> Self {
        GeoTable {
            min_x: rect.x,
            min_y: rect.y,
            max_x: rect.max_x(),
            max_y: rect.max_y(),
            rows: Vec::new(),
        }
    }

    fn matches(&self, rect: &Rectangle) -> bool {
        let top = rect.max_y();
        self.min_x <= rect.x && rect.x <= self.max_x && self.min_y <= top && top <= self.max_y
    }

    fn row_or_create(&mut self, y: f64) -> &mut GeoRow {
        if let Some(idx) = self.rows.iter().position(|r| r.y == y) {
            return &mut self.rows[idx];
        }
        self.rows.push(GeoRow { y, cells: Vec::new() });
        self.rows.last_mut().expect("just pushed")
    }

    pub fn rows(&self) -> &[GeoRow] {
        &self.rows
    }

    pub fn get_data(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.cells.iter().map(|c| c.text.clone()).collect())
            .collect()
    }

    pub fn show(&self) {
        for row in self.get_data() {
            println!("{}", row.join("|"));
        }
    }
}

/// Accumulates [`TextEvent`]s into [`GeoTable`]s across one or more pages.
#[derive(Debug, Default)]
pub struct GeometricReconstructor {
    tables: Vec<GeoTable>,
}

impl GeometricReconstructor {
    pub fn new() -> Self {
        GeometricReconstructor { tables: Vec::new() }
    }

    /// Feed one text event. Events without a current rectangle are dropped;
    /// a missing `x`/`y` on an otherwise-kept event defaults to `0.0`.
    pub fn ingest(&mut self, event: &TextEvent) {
        if event.text.is_empty() {
            return;
        }
        let Some(rect) = event.rect else {
            return;
        };
        let x = event.x.unwrap_or(0.0);
        let y = event.y.unwrap_or(0.0);

        let idx = match self.tables.iter().position(|t| t.matches(&rect)) {
            Some(idx) => {
                self.tables[idx].min_y = rect.y;
                idx
            }
            None => {
                self.tables.push(GeoTable::new(&rect));
                self.tables.len() - 1
            }
        };

        let table = &mut self.tables[idx];
        let row = table.row_or_create(y);
        row.cells.push(GeoCell {
            x,
            y,
            text: event.text.clone(),
        });
    }

    pub fn into_tables(self) -> Vec<GeoTable> {
        self.tables
    }
}
