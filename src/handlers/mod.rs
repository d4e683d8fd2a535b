// handlers/mod.rs - HTTP adapter over the generic controllers
//
// public/     → no principal required (/, /health)
// admin/      → principal header required (/admin/:entity/*)
// controller  → entity-agnostic actions shared by every admin route

pub mod admin;
pub mod body;
pub mod controller;
pub mod public;

use std::sync::Arc;

use crate::database::Store;

/// Shared handles injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}
