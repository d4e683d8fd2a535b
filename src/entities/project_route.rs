use super::{ColumnDef, ColumnType, TableDescriptor};

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("route_name", ColumnType::String).required(),
    ColumnDef::new("method", ColumnType::String).required(),
    ColumnDef::new("uri", ColumnType::String).required(),
];

pub static PROJECT_ROUTE: TableDescriptor = TableDescriptor::new("projectRoute", "projectRoutes", COLUMNS);
