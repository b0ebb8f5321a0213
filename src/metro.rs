//! The metro network: stations grouped into lines, with transition stations
//! acting as transfer hubs between lines.
//!
//! Every registry here is built on [`OrderedTable`](crate::table::OrderedTable)
//! or a hash map keyed by name, and each layer enforces the uniqueness the
//! table itself leaves to its callers.

mod hub;
mod line;
mod station;
mod system;

pub use hub::{Transfer, TransferHub, MAX_CONNECTIONS};
pub use line::Line;
pub use station::{Station, StationKind};
pub use system::MetroSystem;

/// Errors raised by metro network operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("station `{station}` already exists on line `{line}`")]
    StationExists { line: String, station: String },

    #[error("station `{station}` not found on line `{line}`")]
    StationNotFound { line: String, station: String },

    #[error("a line named `{0}` already exists")]
    LineExists(String),

    #[error("line `{0}` not found")]
    LineNotFound(String),

    #[error("transition station `{0}` not found")]
    TransitionNotFound(String),

    #[error("station `{0}` is not a transition station")]
    NotATransition(String),

    #[error("transfer hub `{0}` already has {max} connections", max = MAX_CONNECTIONS)]
    HubFull(String),

    #[error("unknown station kind `{0}` (expected `direct` or `transition`)")]
    UnknownStationKind(String),
}

pub type Result<T> = core::result::Result<T, Error>;
