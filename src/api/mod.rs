pub mod format;

pub use format::{format_date_value, format_datetime, row_to_api_value, rows_to_api_values};
