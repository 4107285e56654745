//! Shared application state for axum handlers.

use std::sync::Arc;

use wothub_app::registry::ThingRegistry;

/// Notifications buffered per stream client when none is configured.
pub const DEFAULT_STREAM_BUFFER: usize = 64;

/// Application state shared across all axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Things served by this process.
    pub registry: Arc<ThingRegistry>,
    /// Notifications buffered per stream client before it is dropped.
    pub stream_buffer: usize,
}

impl AppState {
    #[must_use]
    pub fn new(registry: ThingRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            stream_buffer: DEFAULT_STREAM_BUFFER,
        }
    }

    #[must_use]
    pub fn with_stream_buffer(mut self, stream_buffer: usize) -> Self {
        self.stream_buffer = stream_buffer;
        self
    }
}
