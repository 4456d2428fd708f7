//! Application state for the web layer.

use crate::service::LineService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Line and station orchestration service
    pub service: LineService,
}

impl AppState {
    /// Create a new app state.
    pub fn new(service: LineService) -> Self {
        Self { service }
    }
}
