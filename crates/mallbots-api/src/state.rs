//! Shared application state.

use std::sync::Arc;

use mallbots_core::scope::ScopeProvider;
use mallbots_stores::application::scope::StoresScope;

/// Source of per-request units of work for the stores context.
pub type StoresScopes = dyn ScopeProvider<Context = StoresScope>;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Opens one scope per request.
    pub scopes: Arc<StoresScopes>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(scopes: Arc<StoresScopes>) -> Self {
        Self { scopes }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
