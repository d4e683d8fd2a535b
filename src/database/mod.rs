pub mod manager;
pub mod memory;
pub mod postgres;
pub mod record;
pub mod repository;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use record::{Operation, Record, RecordError};
pub use repository::{Page, PageOptions, Repository};
pub use store::{Row, Store};
