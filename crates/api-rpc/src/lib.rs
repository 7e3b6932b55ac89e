//! JSON-RPC API Layer
//!
//! Thin adapter between the wire protocol and the core services: request
//! parsing, error-code mapping, and the long-poll event endpoint.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use server::{RpcServer, RpcServerConfig};
