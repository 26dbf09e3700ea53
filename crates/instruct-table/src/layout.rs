//! Layout detection: locate the condition/consequence split and the
//! binding templates.
//!
//! The detector walks the grid in canonical order through three phases:
//!
//! 1. **Header.** Starting from the extent's top-left position, each cell
//!    one column to the right of the previous header cell extends the
//!    header. The first cell that skips a column marks the gap; columns
//!    left of the gap are conditions, the rest are consequences.
//! 2. **Marker.** Cells are skipped until one reads as the marker literal.
//! 3. **Bindings.** Every following cell on the marker's row contributes a
//!    template for its column.
//!
//! Everything visited is consumed. The remaining cells, starting at the
//! first cell after the binding row, are the rule rows.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::grid::{Cell, Grid};
use crate::types::{Result, TableError, TableSyntax};

/// Columns `< gap_column` hold conditions; columns `>= gap_column` hold
/// consequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableLayout {
    pub gap_column: u32,
}

impl TableLayout {
    pub fn is_condition(&self, column: u32) -> bool {
        column < self.gap_column
    }
}

/// Everything the detector learns from the top of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableHead {
    pub layout: TableLayout,
    /// Row holding the marker.
    pub binding_row: u32,
    /// Column → template.
    pub bindings: BTreeMap<u32, String>,
}

/// Detects the table layout and binding templates, returning them with the
/// unconsumed cells.
pub fn detect_layout<'g>(grid: &'g Grid, syntax: &TableSyntax) -> Result<(TableHead, &'g [Cell])> {
    let cells = grid.cells();
    let origin = grid.extent().start;
    let mut cursor = 0;

    // Phase 1: contiguous header run.
    let mut last = origin;
    let gap_column = loop {
        let Some(cell) = cells.get(cursor) else {
            return Err(TableError::NoGap { row: origin.row });
        };
        cursor += 1;
        if cell.position == origin {
            continue;
        }
        if cell.position.row != last.row {
            return Err(TableError::NoGap { row: origin.row });
        }
        if cell.position.column == last.column + 1 {
            last = cell.position;
            continue;
        }
        break last.column + 1;
    };
    debug!(gap_column, "header gap found");

    // Phase 2: marker.
    let binding_row = loop {
        let Some(cell) = cells.get(cursor) else {
            return Err(TableError::MissingMarker {
                marker: syntax.marker.clone(),
            });
        };
        cursor += 1;
        if cell.value.render() == syntax.marker {
            break cell.position.row;
        }
    };

    // Phase 3: templates on the marker row.
    let mut bindings = BTreeMap::new();
    while let Some(cell) = cells.get(cursor) {
        if cell.position.row != binding_row {
            break;
        }
        bindings.insert(cell.position.column, cell.value.render());
        cursor += 1;
    }
    debug!(binding_row, bindings = bindings.len(), "binding row captured");

    let head = TableHead {
        layout: TableLayout { gap_column },
        binding_row,
        bindings,
    };
    Ok((head, &cells[cursor..]))
}
