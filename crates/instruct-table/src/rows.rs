//! Rule row extraction.
//!
//! Each row below the binding row is one rule. The leftmost cell of a row
//! names the rule; its other cells are routed to the condition or
//! consequence side of the layout's gap.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::grid::{Cell, CellValue};
use crate::layout::TableLayout;

/// The raw cell text of one rule, keyed by column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleRecord {
    pub conditions: BTreeMap<u32, String>,
    pub consequences: BTreeMap<u32, String>,
}

/// Rule records in the order their names first appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleRecords {
    entries: Vec<(String, RuleRecord)>,
}

impl RuleRecords {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&RuleRecord> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleRecord)> {
        self.entries.iter().map(|(n, r)| (n.as_str(), r))
    }

    /// Starts a fresh record for `name` and returns its index. A name that
    /// already exists keeps its position but loses its earlier contents.
    fn start(&mut self, name: String, row: u32) -> usize {
        match self.entries.iter().position(|(n, _)| *n == name) {
            Some(index) => {
                warn!(rule = %name, row = row + 1, "duplicate rule name, earlier row overwritten");
                self.entries[index].1 = RuleRecord::default();
                index
            }
            None => {
                self.entries.push((name, RuleRecord::default()));
                self.entries.len() - 1
            }
        }
    }
}

/// Spreadsheet booleans written as text become script literals. Only the
/// exact upper-case spellings are recognised.
fn normalize_consequence(value: &CellValue) -> String {
    match value.as_text() {
        Some("TRUE") => "true".to_string(),
        Some("FALSE") => "false".to_string(),
        _ => value.render(),
    }
}

/// Groups the remaining cells into rule records.
pub fn extract_rules(cells: &[Cell], layout: &TableLayout) -> RuleRecords {
    let mut records = RuleRecords::default();
    let mut current: Option<(u32, usize)> = None;

    for cell in cells {
        let row = cell.position.row;
        let index = match current {
            Some((current_row, index)) if current_row == row => index,
            _ => {
                let index = records.start(cell.value.render(), row);
                current = Some((row, index));
                continue;
            }
        };
        let record = &mut records.entries[index].1;
        let column = cell.position.column;
        if layout.is_condition(column) {
            record.conditions.insert(column, cell.value.render());
        } else {
            record
                .consequences
                .insert(column, normalize_consequence(&cell.value));
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LAYOUT: TableLayout = TableLayout { gap_column: 3 };

    #[test]
    fn routes_cells_by_gap() {
        let cells = [
            Cell::new(2, 0, "big"),
            Cell::new(2, 1, 150.0),
            Cell::new(2, 2, "'US'"),
            Cell::new(2, 4, "TRUE"),
            Cell::new(3, 0, "small"),
            Cell::new(3, 4, "FALSE"),
        ];
        let records = extract_rules(&cells, &LAYOUT);
        let names: Vec<&str> = records.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["big", "small"]);

        let big = records.get("big").unwrap();
        assert_eq!(
            big.conditions,
            BTreeMap::from([(1, "150".to_string()), (2, "'US'".to_string())])
        );
        assert_eq!(big.consequences, BTreeMap::from([(4, "true".to_string())]));
        assert_eq!(
            records.get("small").unwrap().consequences,
            BTreeMap::from([(4, "false".to_string())])
        );
    }

    #[test]
    fn normalization_is_exact_match_only() {
        let cells = [
            Cell::new(0, 0, "r"),
            Cell::new(0, 3, "True"),
            Cell::new(0, 4, "TRUE "),
            Cell::new(0, 5, "TRUE"),
            Cell::new(0, 6, true),
        ];
        let records = extract_rules(&cells, &LAYOUT);
        let consequences = &records.get("r").unwrap().consequences;
        assert_eq!(consequences[&3], "True");
        assert_eq!(consequences[&4], "TRUE ");
        assert_eq!(consequences[&5], "true");
        assert_eq!(consequences[&6], "true");
    }

    #[test]
    fn condition_side_is_not_normalized() {
        let cells = [Cell::new(0, 0, "r"), Cell::new(0, 1, "TRUE")];
        let records = extract_rules(&cells, &LAYOUT);
        assert_eq!(records.get("r").unwrap().conditions[&1], "TRUE");
    }

    #[test]
    fn duplicate_name_overwrites_but_keeps_position() {
        let cells = [
            Cell::new(0, 0, "a"),
            Cell::new(0, 1, "1"),
            Cell::new(1, 0, "b"),
            Cell::new(1, 1, "2"),
            Cell::new(2, 0, "a"),
            Cell::new(2, 2, "3"),
        ];
        let records = extract_rules(&cells, &LAYOUT);
        let names: Vec<&str> = records.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(
            records.get("a").unwrap().conditions,
            BTreeMap::from([(2, "3".to_string())])
        );
    }

    #[test]
    fn numeric_names_render_as_integers() {
        let records = extract_rules(&[Cell::new(0, 0, 7.0)], &LAYOUT);
        assert!(records.get("7").is_some());
    }
}
