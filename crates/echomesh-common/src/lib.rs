//! # echomesh Common
//!
//! Shared types for the echomesh workspace: the protocol surface (dispatch
//! outcomes, error taxonomy, correlation ids) and the plain-value
//! configuration handed to the serving process at construction time.
//!
//! Everything here is deliberately transport-free; the cluster and server
//! crates decide how these values travel.

pub mod config;
pub mod protocol;

pub use config::ServeConfig;
pub use protocol::{DispatchOutcome, MeshError, Result};
