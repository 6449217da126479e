//! Core module - configuration and error definitions
//!
//! - [`Config`] - environment-driven settings
//! - [`ServiceError`] - failure of a service or session operation

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{ErrorKind, ServiceError, ServiceResult};
