use super::{ColumnDef, ColumnType, TableDescriptor};

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("orderId", ColumnType::String),
    ColumnDef::new("item", ColumnType::String),
    ColumnDef::new("uom", ColumnType::String),
    ColumnDef::new("qty", ColumnType::Integer),
];

pub static ORDER_ITEM: TableDescriptor = TableDescriptor::new("orderItem", "orderItems", COLUMNS);
