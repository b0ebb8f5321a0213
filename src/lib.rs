//! An insertion-ordered lookup table on hand-managed storage, and the metro
//! network model built on top of it.

pub mod config;
pub mod log;
pub mod metro;
pub mod table;
pub mod ui;

pub use table::OrderedTable;
