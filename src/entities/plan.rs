use super::{ColumnDef, ColumnType, TableDescriptor};

// `decription` is the column's actual name in the deployed schema.
const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("name", ColumnType::String),
    ColumnDef::new("decription", ColumnType::String),
    ColumnDef::new("code", ColumnType::String),
    ColumnDef::new("validityInDays", ColumnType::String),
    ColumnDef::new("minimumUser", ColumnType::Integer),
    ColumnDef::new("maximumUser", ColumnType::Integer),
    ColumnDef::new("perUserAmount", ColumnType::Integer),
    ColumnDef::new("markup", ColumnType::Integer),
    ColumnDef::new("discount", ColumnType::Integer),
    ColumnDef::new("validFrom", ColumnType::Date),
    ColumnDef::new("validTo", ColumnType::Date),
];

pub static PLAN: TableDescriptor = TableDescriptor::new("Plan", "Plans", COLUMNS);
