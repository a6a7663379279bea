use serde::Serialize;

/// How a grid column renders and sorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Text,
    Integer,
}

/// One displayable column of the record grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescription {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl ColumnDescription {
    fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Text,
        }
    }

    fn integer(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Integer,
        }
    }
}

/// Columns available for a given line layout, in display order.
///
/// Thread, Type and Class only exist when the layout captures them; the
/// rest are always present. The order is fixed so grid configuration can
/// index into it.
pub fn available_columns(
    include_thread: bool,
    include_type: bool,
    include_class: bool,
) -> Vec<ColumnDescription> {
    let mut columns = Vec::with_capacity(8);
    columns.push(ColumnDescription::text("DateText"));
    if include_thread {
        columns.push(ColumnDescription::text("Thread"));
    }
    if include_type {
        columns.push(ColumnDescription::text("Type"));
    }
    if include_class {
        columns.push(ColumnDescription::text("Class"));
    }
    columns.push(ColumnDescription::text("Message"));
    columns.push(ColumnDescription::integer("LineInFile"));
    columns.push(ColumnDescription::integer("ItemNumber"));
    columns.push(ColumnDescription::integer("Bookmark"));
    columns
}
