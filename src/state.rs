//! Shared application state for all routes.

use crate::store::ResourceStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Opened once at startup and shared by every request.
    pub store: Arc<dyn ResourceStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }
}
