//! Courier - minimal concurrent HTTP/1.1 server
//!
//! Core library: request parsing, handler routing, the response writing
//! contract, and the accept loop.

pub mod config;
pub mod handlers;
pub mod http;
pub mod routing;
pub mod server;
