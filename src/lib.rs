//! where-am-i: Cached Reverse Geocoding
//!
//! A library and CLI tool that turns coordinates (or an IP address) into a
//! human-readable address, keeping answers in a TTL cache keyed by rounded
//! coordinates so nearby lookups share one upstream request.
//!
//! ## Features
//!
//! - Coordinate normalization into stable cache keys
//! - Bounded in-memory store and durable file-backed store
//! - Nominatim reverse geocoding and ipapi.co IP location
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use where_am_i::coord::normalize::key_for;
//! use where_am_i::Coordinates;
//!
//! // Nearby positions collapse onto one key
//! assert_eq!(key_for(40.712812, -74.006014), "40.71281:-74.00601");
//!
//! let coords = Coordinates::parse("40.7128", "-74.0060").unwrap();
//! assert_eq!(coords.cache_key(5), "40.7128:-74.006");
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod format;
pub mod geo;
pub mod resolve;
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use coord::Coordinates;
pub use error::{Error, Result};
pub use resolve::{ResolveRequest, Resolution, Resolver, Source};
