use super::{ColumnDef, ColumnType, TableDescriptor};

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("name", ColumnType::String).required(),
    ColumnDef::new("date", ColumnType::Date),
    ColumnDef::new("description", ColumnType::String),
    ColumnDef::new("patientId", ColumnType::Integer),
];

pub static ENCOUNTER: TableDescriptor = TableDescriptor::new("encounter", "encounters", COLUMNS);
