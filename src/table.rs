//! The public `Table` surface unifying structured and geometric results.

use crate::geometric::GeoTable;
use crate::structured::StructuredTable;

/// A reconstructed table, either declared via the logical structure tree or
/// inferred geometrically.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Table {
    Structured(StructuredTable),
    Geometric(GeoTable),
}

impl Table {
    /// Rows × cell-strings.
    pub fn get_data(&self) -> Vec<Vec<String>> {
        match self {
            Table::Structured(t) => t.get_data(),
            Table::Geometric(t) => t.get_data(),
        }
    }

    /// Prints pipe-delimited rows to stdout.
    pub fn show(&self) {
        match self {
            Table::Structured(t) => t.show(),
            Table::Geometric(t) => t.show(),
        }
    }
}
