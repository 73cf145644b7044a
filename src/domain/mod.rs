//! Domain layer with core business entities and port definitions.

/// Connection health definitions.
pub mod connection;
/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use connection::{ConnectionHealth, ConnectionStatus};
pub use entities::{Listing, PreloadOutcome, SkipReason};
pub use errors::QueryError;
pub use ports::{BackendPort, ImageFetchPort};
