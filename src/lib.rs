//! Storefront API client with single-flight session refresh.
//!
//! Every request goes through [`AuthenticatedClient::send`]. A `401` whose body carries the
//! expiry marker triggers one refresh call no matter how many requests observed it; the
//! affected requests are replayed once afterwards. When the refresh fails, all of them fail
//! with the same cause and a [`SessionInvalidated`] notification is broadcast.

mod client;
pub mod config;
pub mod errors;
pub mod request_context;
pub mod retry;
pub mod session;
pub mod telemetry;
pub mod types;

pub use client::{AuthenticatedClient, is_expiry_body};
pub use config::{Config, ConfigLocation, read_config};
pub use errors::Error;
pub use session::{SessionInvalidated, SessionState, UserIdentity};
pub use types::{ApiRequest, ApiResponse, resource_path};
