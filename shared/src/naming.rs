//! Identifier allocation and display names

use crate::models::{Table, TableId};

/// Default prefix for table display names
pub const TABLE_NAME_PREFIX: &str = "T-";

/// Next free table id: one past the current maximum, or 1 for an empty plan
///
/// Ids are only unique within the list passed in. Two sessions working from
/// stale copies of the same plan can hand out the same id.
pub fn next_table_id(tables: &[Table]) -> TableId {
    tables.iter().map(|t| t.id).max().map_or(1, |max| max + 1)
}

/// Display name for a table id, e.g. `1 -> "T-1"`
pub fn table_name(id: TableId) -> String {
    table_name_with_prefix(id, TABLE_NAME_PREFIX)
}

/// Display name for a table id with a custom prefix
pub fn table_name_with_prefix(id: TableId, prefix: &str) -> String {
    format!("{prefix}{id}")
}

/// Identifier for a newly drawn wall line
pub fn next_line_id(now_millis: i64) -> String {
    format!("line-{now_millis}")
}
