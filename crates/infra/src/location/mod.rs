//! External location service access.
//!
//! The engine only needs one capability from the location service: resolve an
//! id into a `LocationRef`, distinguishing "does not exist" from "could not
//! ask". Results are never cached.

use async_trait::async_trait;
use thiserror::Error;

use equipstock_core::LocationId;
use equipstock_stock::LocationRef;

pub mod http;
pub mod in_memory;

pub use http::HttpLocationResolver;
pub use in_memory::InMemoryLocationDirectory;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocationError {
    /// The location service answered that the id does not exist.
    #[error("location {0} not found")]
    NotFound(LocationId),

    /// Transport failure, timeout, unexpected status or undecodable body.
    #[error("{0}")]
    Unavailable(String),
}

#[async_trait]
pub trait LocationResolver: Send + Sync {
    async fn resolve(&self, id: LocationId) -> Result<LocationRef, LocationError>;
}
