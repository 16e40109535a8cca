//! Table reconstruction engine for PDF content streams.
//!
//! Given a parsed PDF object graph (supplied by the caller through the
//! [`ObjectGraph`] trait), this crate reconstructs logical tables from
//! either a tagged-PDF logical structure tree or, failing that, geometric
//! inference over `re` rectangles and text-positioning operators.
//!
//! The low-level PDF parser, decryption, page iteration and file I/O are
//! all out of scope here; see [`object_graph::ObjectGraph`] for the exact
//! boundary this crate consumes.

pub mod cmap;
pub mod content;
mod driver;
pub mod error;
pub mod font_cache;
pub mod geometric;
pub mod interpreter;
pub mod object_graph;
pub mod structured;
pub mod table;
mod text_decoder;

pub use content::Operand;
pub use driver::{
    search_tables, search_tables_with_cache, search_tables_with_cache_and_limits,
    search_tables_with_limits,
};
pub use error::{Result, TableError};
pub use font_cache::{FontCache, FontSet};
pub use geometric::{GeoCell, GeoRow, GeoTable, GeometricReconstructor};
pub use interpreter::{Interpreter, Mode, Rectangle, TextEvent};
pub use object_graph::{ContentOp, Dict, Object, ObjId, ObjectGraph, PageRef};
pub use structured::{Limits, StructuredTable, StructuredWalker};
pub use table::Table;
