pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod entities;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod validation;

pub use database::{MemoryStore, PageOptions, Repository, Store};
pub use entities::TableDescriptor;
pub use handlers::AppState;
pub use routes::app;
