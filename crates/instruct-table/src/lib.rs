//! Decision-table compiler for the instruct system.
//!
//! A decision table is a spreadsheet whose structure is implicit: a header
//! row of contiguous condition labels, a skipped column, consequence labels,
//! a `BINDING` row of expression templates, and one row per rule. This crate
//! reads such a sheet into a [`Grid`], detects the layout, extracts the rule
//! rows and compiles them into an [`instruct_core::RuleSet`].

pub mod compile;
pub mod grid;
pub mod layout;
pub mod rows;
pub mod sheet;
pub mod types;

pub use compile::{compile_rules, compile_sheet, compile_table};
pub use grid::{Cell, CellValue, Extent, Grid, Position};
pub use layout::{TableHead, TableLayout, detect_layout};
pub use rows::{RuleRecord, RuleRecords, extract_rules};
pub use sheet::{SheetFormat, decode_sheet, find_sheet, list_sheets, load_sheet, sheet_id};
pub use types::{ErrorKind, Result, TableError, TableSyntax};
