//! Sheet files: format detection, decoding into a [`Grid`], and discovery
//! in a rules directory.

use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::grid::{Cell, CellValue, Extent, Grid, Position};
use crate::types::{Result, TableError};

/// File formats a decision table can be authored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetFormat {
    Xlsx,
    Xlsm,
    Xls,
    Ods,
    Csv,
}

impl SheetFormat {
    pub const ALL: [SheetFormat; 5] = [
        SheetFormat::Xlsx,
        SheetFormat::Xlsm,
        SheetFormat::Xls,
        SheetFormat::Ods,
        SheetFormat::Csv,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Xlsm => "xlsm",
            Self::Xls => "xls",
            Self::Ods => "ods",
            Self::Csv => "csv",
        }
    }

    /// Case-insensitive lookup by file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(ext))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| TableError::UnknownFormat(path.display().to_string()))
    }
}

impl fmt::Display for SheetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for SheetFormat {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(s.trim_start_matches('.'))
            .ok_or_else(|| TableError::UnknownFormat(s.to_string()))
    }
}

/// Decodes sheet bytes into a grid. Workbooks use their first worksheet;
/// csv fields are read as text with the extent anchored at `A1`.
pub fn decode_sheet(bytes: &[u8], format: SheetFormat) -> Result<Grid> {
    match format {
        SheetFormat::Csv => decode_csv(bytes),
        SheetFormat::Xlsx | SheetFormat::Xlsm | SheetFormat::Xls | SheetFormat::Ods => {
            decode_workbook(bytes)
        }
    }
}

fn decode_workbook(bytes: &[u8]) -> Result<Grid> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(TableError::EmptyWorkbook)??;
    Ok(range_to_grid(&range))
}

fn range_to_grid(range: &Range<Data>) -> Grid {
    let (Some(start), Some(end)) = (range.start(), range.end()) else {
        return Grid::from_cells([]);
    };
    let extent = Extent {
        start: Position::new(start.0, start.1),
        end: Position::new(end.0, end.1),
    };
    // used_cells() positions are relative to the range start.
    let cells = range.used_cells().filter_map(|(row, col, data)| {
        convert_value(data).map(|value| Cell {
            position: Position::new(start.0 + row as u32, start.1 + col as u32),
            value,
        })
    });
    let grid = Grid::new(extent, cells);
    debug!(cells = grid.len(), "decoded worksheet");
    grid
}

/// Empty cells and empty strings are absent from the grid.
fn convert_value(data: &Data) -> Option<CellValue> {
    match data {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::DateTime(dt) => Some(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
        Data::Error(e) => Some(CellValue::Text(e.to_string())),
    }
}

fn decode_csv(bytes: &[u8]) -> Result<Grid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut cells = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        for (column, field) in record.iter().enumerate() {
            if !field.is_empty() {
                cells.push(Cell::new(row as u32, column as u32, field));
            }
        }
    }
    Ok(Grid::from_cells(cells))
}

/// Reads and decodes a sheet file, detecting the format from its extension.
pub fn load_sheet(path: &Path) -> Result<Grid> {
    let format = SheetFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    decode_sheet(&bytes, format)
}

/// The id a sheet is registered under: its file stem.
pub fn sheet_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn is_sheet_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.') || n.starts_with("~$"));
    !hidden && path.is_file() && SheetFormat::from_path(path).is_ok()
}

/// Resolves a sheet by name.
///
/// Search order:
/// 1. The name as a path (absolute, or relative to the working directory)
/// 2. The name inside `rules_dir`
/// 3. `rules_dir/<name>.<ext>` for every supported extension
pub fn find_sheet(name: &str, rules_dir: &Path) -> Result<PathBuf> {
    let exact = Path::new(name);
    if exact.is_file() {
        return Ok(exact.to_path_buf());
    }
    let relative = rules_dir.join(name);
    if relative.is_file() {
        return Ok(relative);
    }
    for format in SheetFormat::ALL {
        let candidate = rules_dir.join(format!("{}.{}", name, format.extension()));
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    Err(TableError::sheet_not_found(name, rules_dir))
}

/// Lists the sheet files in `rules_dir`, sorted by file name. A missing
/// directory has no sheets.
pub fn list_sheets(rules_dir: &Path) -> Result<Vec<PathBuf>> {
    if !rules_dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut sheets = Vec::new();
    for entry in std::fs::read_dir(rules_dir)? {
        let path = entry?.path();
        if is_sheet_file(&path) {
            sheets.push(path);
        }
    }
    sheets.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(sheets)
}
