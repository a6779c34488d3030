//! Client side of the access layer
//!
//! A [`FetchUnit`] exposes `{data, loading, error}` for one entity list and a
//! `refetch()` operation. Units are built from a [`FetcherConfig`] by
//! [`create_fetcher`] over any [`Transport`]; [`HttpTransport`] talks to the
//! entity routes with reqwest.

pub mod endpoint;
pub mod error;
pub mod fetcher;
pub mod state;
pub mod transport;

pub use endpoint::Endpoint;
pub use error::FetchError;
pub use fetcher::{FetchUnit, FetcherConfig, create_fetcher};
pub use state::{FetchPhase, FetchState};
pub use transport::{HttpTransport, Transport};
