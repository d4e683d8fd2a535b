use super::{ColumnDef, ColumnType, TableDescriptor};

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("comment", ColumnType::String),
    ColumnDef::new("upvoteCount", ColumnType::Integer),
    ColumnDef::new("downVoteCount", ColumnType::Integer),
    ColumnDef::new("commentTime", ColumnType::Date),
    ColumnDef::new("parentItem", ColumnType::Integer),
];

pub static COMMENT: TableDescriptor = TableDescriptor::new("Comment", "Comments", COLUMNS);
