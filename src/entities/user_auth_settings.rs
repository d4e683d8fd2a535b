use super::{ColumnDef, ColumnDefault, ColumnType, TableDescriptor};

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("userId", ColumnType::Integer),
    ColumnDef::new("loginOTP", ColumnType::String),
    ColumnDef::new("expiredTimeOfLoginOTP", ColumnType::Date),
    ColumnDef::new("resetPasswordCode", ColumnType::String),
    ColumnDef::new("expiredTimeOfResetPasswordCode", ColumnType::Date),
    ColumnDef::new("loginRetryLimit", ColumnType::Integer).default_value(ColumnDefault::Integer(0)),
    ColumnDef::new("loginReactiveTime", ColumnType::Date),
];

pub static USER_AUTH_SETTINGS: TableDescriptor = TableDescriptor::new("userAuthSettings", "userAuthSettings", COLUMNS);
