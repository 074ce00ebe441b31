//! Backend access
//!
//! - [`client`] - [`ApiClient`]: base URL, bearer token, JSON calls, auth
//! - [`resource`] - [`RemoteResource`]: a backend collection plus its local mirror

pub mod client;
pub mod resource;

pub use client::ApiClient;
pub use resource::{
    Action, HttpBackend, OpState, ReconcilePolicy, Record, RecordBackend, RemoteResource,
};
