//! `central-client` is an async HTTP client for the central organizational
//! directory API.
//!
//! The crate wraps three read endpoints under `/api/central/v1`:
//! - [`CentralClient::get_memberships_by_identity`]
//! - [`CentralClient::get_user_by_identity`]
//! - [`CentralClient::get_application_by_key`]
//!
//! Responses with a malformed body are retried with jittered exponential
//! backoff until one decodes. There is no attempt limit; bound a call with
//! `tokio::time::timeout` if the service may keep misbehaving.

mod backoff;
mod classify;
mod client;
mod decode;
mod error;
mod options;
mod request;
mod types;

pub use client::{CentralClient, ClientOverrides};
pub use error::CentralError;
pub use options::ClientOptions;
pub use types::{Application, Membership, Organization, Role, User};

pub type Result<T> = std::result::Result<T, CentralError>;
