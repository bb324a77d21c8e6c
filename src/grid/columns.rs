// src/grid/columns.rs

use super::codec::{format_cell, ColumnType};
use serde_json::Value;

/// A report grid column: header text, row field it reads, and the value
/// family used to format it (plain text when absent).
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub header: &'static str,
    pub field: &'static str,
    pub ty: Option<ColumnType>,
}

impl ColumnDef {
    /// Render this column's cell from a row object.
    pub fn render(&self, row: &Value) -> String {
        let cell = row.get(self.field).unwrap_or(&Value::Null);
        let shown = match self.ty {
            Some(ty) => format_cell(ty, cell),
            None => cell.clone(),
        };
        match shown {
            Value::Null => String::new(),
            Value::String(s) => s,
            other => other.to_string(),
        }
    }
}

/// Column set of the save-age report grid.
pub const SAVE_AGE_COLUMNS: &[ColumnDef] = &[
    ColumnDef {
        header: "Birthdate",
        field: "birthdate",
        ty: None,
    },
    ColumnDef {
        header: "Relationship",
        field: "relationship",
        ty: None,
    },
    ColumnDef {
        header: "Tobacco",
        field: "tobacco_disposition",
        ty: None,
    },
    ColumnDef {
        header: "Issue Age",
        field: "issue_age",
        ty: Some(ColumnType::Number0),
    },
    ColumnDef {
        header: "Save Age Effective Date",
        field: "save_age_effective_date",
        ty: None,
    },
    ColumnDef {
        header: "New Effective Date",
        field: "new_effective_date",
        ty: None,
    },
    ColumnDef {
        header: "Save Age Rate",
        field: "save_age_rate",
        ty: Some(ColumnType::DollarsAndCents),
    },
    ColumnDef {
        header: "New Rate",
        field: "new_rate",
        ty: Some(ColumnType::DollarsAndCents),
    },
    ColumnDef {
        header: "Diff",
        field: "diff",
        ty: Some(ColumnType::DollarsAndCents),
    },
];
