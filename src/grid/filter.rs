// src/grid/filter.rs
//
// Compact query-string encoding of the grid's filter and sort models.
// Filters become `col::op::value` predicates joined by `;;`; sorts become a
// comma list of column ids with a `-` prefix for descending. An OR-combined
// filter cannot be expressed in this encoding, so the whole filter is
// dropped: unfiltered data beats wrongly-filtered data.

/// A single column predicate, e.g. `greaterThan` / `30`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPredicate {
    pub op: String,
    pub value: String,
}

impl FilterPredicate {
    pub fn new(op: impl Into<String>, value: impl Into<String>) -> Self {
        FilterPredicate {
            op: op.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Join {
    And,
    Or,
}

/// The filter state of one column: either a lone predicate or several
/// joined by a logical operator.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnFilter {
    Single(FilterPredicate),
    Combined {
        operator: Join,
        conditions: Vec<FilterPredicate>,
    },
}

/// Per-column filter state in the order columns were filtered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterModel {
    columns: Vec<(String, ColumnFilter)>,
}

impl FilterModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column_id: impl Into<String>, filter: ColumnFilter) {
        self.columns.push((column_id.into(), filter));
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, ColumnFilter)> {
        self.columns.iter()
    }
}

/// Serialize a filter model, or `None` when it cannot be represented.
/// Any OR-joined column suppresses the entire filter rather than risking a
/// query that silently means something else.
pub fn serialize_filters(model: &FilterModel) -> Option<String> {
    let mut predicates = Vec::new();
    for (column_id, filter) in model.iter() {
        match filter {
            ColumnFilter::Single(p) => {
                predicates.push(format!("{}::{}::{}", column_id, p.op, p.value));
            }
            ColumnFilter::Combined { operator: Join::Or, .. } => return None,
            ColumnFilter::Combined {
                operator: Join::And,
                conditions,
            } => {
                for p in conditions {
                    predicates.push(format!("{}::{}::{}", column_id, p.op, p.value));
                }
            }
        }
    }
    Some(predicates.join(";;"))
}

/// One entry of the grid's sort model, in priority order.
#[derive(Debug, Clone, PartialEq)]
pub struct SortItem {
    pub col_id: String,
    pub descending: bool,
}

impl SortItem {
    pub fn asc(col_id: impl Into<String>) -> Self {
        SortItem {
            col_id: col_id.into(),
            descending: false,
        }
    }

    pub fn desc(col_id: impl Into<String>) -> Self {
        SortItem {
            col_id: col_id.into(),
            descending: true,
        }
    }
}

/// `[diff desc, issue_age asc]` → `"-diff,issue_age"`.
pub fn serialize_sort(model: &[SortItem]) -> String {
    model
        .iter()
        .map(|s| {
            if s.descending {
                format!("-{}", s.col_id)
            } else {
                s.col_id.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
