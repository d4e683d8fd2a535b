use super::{ColumnDef, ColumnType, TableDescriptor};

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("name", ColumnType::String),
    ColumnDef::new("code", ColumnType::String).unique(),
    ColumnDef::new("email", ColumnType::String),
];

pub static PATIENT: TableDescriptor = TableDescriptor::new("patient", "patients", COLUMNS);
