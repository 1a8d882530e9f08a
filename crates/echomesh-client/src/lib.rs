//! # echomesh Client
//!
//! Small HTTP client for the echomesh boundary, used by the CLI and the
//! integration tests. Each request builds a fresh connection, so concurrent
//! calls never serialize behind a shared stream.

pub mod client;

pub use client::MeshClient;
