//! Onslip Client - typed access to the Onslip 360 POS API
//!
//! Provides Hawk-signed HTTP calls, the wire types, the name encodings the
//! floor editor stores on the POS, and an injectable [`OnslipApi`] trait.

pub mod api;
pub mod config;
pub mod error;
pub mod hawk;
pub mod http;
pub mod tags;
pub mod types;

#[cfg(feature = "mock")]
pub mod mock;

pub use api::{Filter, OnslipApi};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use tags::{PaidName, PositionTag, StateTag};
pub use types::*;
