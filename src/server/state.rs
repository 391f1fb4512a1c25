//! Server shared state
//!
//! Holds the resolver shared by all request handlers.

use crate::resolve::Resolver;
use std::time::Instant;

/// Shared state for the HTTP server
pub struct AppState<S, G, L> {
    /// Address resolver (owns the cache store)
    pub resolver: Resolver<S, G, L>,

    started_at: Instant,
}

impl<S, G, L> AppState<S, G, L> {
    /// Create new application state
    pub fn new(resolver: Resolver<S, G, L>) -> Self {
        Self {
            resolver,
            started_at: Instant::now(),
        }
    }

    /// Seconds since the state was created
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
