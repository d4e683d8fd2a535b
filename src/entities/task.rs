use super::{ColumnDef, ColumnType, TableDescriptor};

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("name", ColumnType::String).required(),
    ColumnDef::new("description", ColumnType::String),
    ColumnDef::new("dueDate", ColumnType::Date),
    ColumnDef::new("isCompleted", ColumnType::Boolean),
];

pub static TASK: TableDescriptor = TableDescriptor::new("Task", "Tasks", COLUMNS);
