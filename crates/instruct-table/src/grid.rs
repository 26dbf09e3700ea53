//! The sparse cell grid a decision table is read into.

use std::fmt;

use instruct_core::value::format_number;
use serde::Serialize;

/// A scalar cell value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// The text substituted into binding templates: text verbatim, integral
    /// numbers without a fractional part, booleans as `true` / `false`.
    pub fn render(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Bool(b) => b.to_string(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Zero-based (row, column) coordinate. Ordering is row-major, which is the
/// canonical visiting order of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub row: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letter(self.column), self.row + 1)
    }
}

/// Spreadsheet column name for a zero-based column: 0 → `A`, 26 → `AA`.
pub fn column_letter(column: u32) -> String {
    let mut n = column as u64 + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push(b'A' + rem);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub position: Position,
    pub value: CellValue,
}

impl Cell {
    pub fn new(row: u32, column: u32, value: impl Into<CellValue>) -> Self {
        Self {
            position: Position::new(row, column),
            value: value.into(),
        }
    }
}

/// Inclusive rectangle bounding the meaningful part of a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Extent {
    pub start: Position,
    pub end: Position,
}

impl Extent {
    pub fn contains(&self, p: Position) -> bool {
        (self.start.row..=self.end.row).contains(&p.row)
            && (self.start.column..=self.end.column).contains(&p.column)
    }
}

/// An immutable sparse grid of cells in canonical order.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    extent: Extent,
    cells: Vec<Cell>,
}

impl Grid {
    /// Builds a grid over `extent`. Cells are sorted row-major; cells outside
    /// the extent are dropped and, for duplicate positions, the last one wins.
    pub fn new(extent: Extent, cells: impl IntoIterator<Item = Cell>) -> Self {
        let mut cells: Vec<Cell> = cells
            .into_iter()
            .filter(|c| extent.contains(c.position))
            .collect();
        cells.sort_by_key(|c| c.position);
        cells.dedup_by(|later, kept| {
            if later.position == kept.position {
                std::mem::swap(&mut later.value, &mut kept.value);
                true
            } else {
                false
            }
        });
        Self { extent, cells }
    }

    /// Builds a grid whose extent is the bounding box of its cells, anchored
    /// at `A1`.
    pub fn from_cells(cells: impl IntoIterator<Item = Cell>) -> Self {
        let cells: Vec<Cell> = cells.into_iter().collect();
        let end = Position::new(
            cells.iter().map(|c| c.position.row).max().unwrap_or(0),
            cells.iter().map(|c| c.position.column).max().unwrap_or(0),
        );
        Self::new(
            Extent {
                start: Position::new(0, 0),
                end,
            },
            cells,
        )
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// All cells in canonical order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, position: Position) -> Option<&CellValue> {
        self.cells
            .binary_search_by_key(&position, |c| c.position)
            .ok()
            .map(|i| &self.cells[i].value)
    }
}
