//! Table syntax settings and the compiler's error type.

use std::fmt;
use std::path::PathBuf;

use instruct_core::ExprError;
use serde::{Deserialize, Serialize};

use crate::grid::column_letter;

/// Literal marking the binding row.
pub const DEFAULT_MARKER: &str = "BINDING";

/// Token in a binding template replaced by the rule's cell value.
pub const DEFAULT_PLACEHOLDER: &str = "$value";

/// The two literals a decision table is written with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TableSyntax {
    /// Cell text that marks the binding row.
    pub marker: String,
    /// Token substituted inside binding templates.
    pub placeholder: String,
}

impl Default for TableSyntax {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

/// Broad classification of a [`TableError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// The header row has no contiguity break.
    Layout,
    /// The binding row is missing, or a rule uses an unbound column.
    Binding,
    /// A substituted template is not a valid expression.
    Expression,
    /// The sheet could not be found, read or decoded.
    Sheet,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Layout => "layout",
            Self::Binding => "binding",
            Self::Expression => "expression",
            Self::Sheet => "sheet",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while reading or compiling a decision table.
///
/// Every variant aborts compilation of the whole sheet; no partial rule set
/// is ever returned.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The header row ended (or the sheet ran out) before a skipped column
    /// separated conditions from consequences.
    #[error("layout error: header row {} has no gap between conditions and consequences", .row + 1)]
    NoGap { row: u32 },

    #[error("binding error: no '{marker}' row found")]
    MissingMarker { marker: String },

    #[error("binding error: rule '{rule}' uses column {} which has no binding", letter(.column))]
    MissingBinding { rule: String, column: u32 },

    #[error("expression error in rule '{rule}' column {}: {source} (in `{fragment}`)", letter(.column))]
    Expression {
        rule: String,
        column: u32,
        fragment: String,
        source: ExprError,
    },

    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("workbook has no worksheets")]
    EmptyWorkbook,

    #[error("unsupported sheet format: {0}")]
    UnknownFormat(String),

    #[error("sheet '{name}' not found in {}", .dir.display())]
    SheetNotFound { name: String, dir: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the table crate.
pub type Result<T> = std::result::Result<T, TableError>;

fn letter(column: &u32) -> String {
    column_letter(*column)
}

impl TableError {
    pub fn missing_binding(rule: impl Into<String>, column: u32) -> Self {
        Self::MissingBinding {
            rule: rule.into(),
            column,
        }
    }

    pub fn sheet_not_found(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self::SheetNotFound {
            name: name.into(),
            dir: dir.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoGap { .. } => ErrorKind::Layout,
            Self::MissingMarker { .. } | Self::MissingBinding { .. } => ErrorKind::Binding,
            Self::Expression { .. } => ErrorKind::Expression,
            Self::Workbook(_)
            | Self::Csv(_)
            | Self::EmptyWorkbook
            | Self::UnknownFormat(_)
            | Self::SheetNotFound { .. }
            | Self::Io(_) => ErrorKind::Sheet,
        }
    }

    /// Returns `true` for a missing marker or a missing column binding.
    pub fn is_binding(&self) -> bool {
        self.kind() == ErrorKind::Binding
    }

    pub fn is_layout(&self) -> bool {
        self.kind() == ErrorKind::Layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_spreadsheet_columns() {
        let err = TableError::missing_binding("domestic", 3);
        assert_eq!(
            err.to_string(),
            "binding error: rule 'domestic' uses column D which has no binding"
        );
        assert!(err.is_binding());
        assert_eq!(TableError::NoGap { row: 0 }.kind(), ErrorKind::Layout);
        assert_eq!(
            TableError::NoGap { row: 0 }.to_string(),
            "layout error: header row 1 has no gap between conditions and consequences"
        );
    }

    #[test]
    fn syntax_defaults() {
        let syntax = TableSyntax::default();
        assert_eq!(syntax.marker, "BINDING");
        assert_eq!(syntax.placeholder, "$value");
    }
}
