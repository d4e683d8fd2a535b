use super::{ColumnDef, ColumnType, TableDescriptor};

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("routeId", ColumnType::Integer).required(),
    ColumnDef::new("roleId", ColumnType::Integer),
];

pub static ROUTE_ROLE: TableDescriptor = TableDescriptor::new("routeRole", "routeRoles", COLUMNS);
