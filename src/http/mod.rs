//! HTTP protocol implementation.
//!
//! This module implements the one-request-per-connection HTTP/1.1 exchange.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`connection`**: Reads one request, routes it, and closes the socket
//! - **`parser`**: Parses incoming HTTP requests from byte buffers
//! - **`request`**: Immutable HTTP request representation
//! - **`response`**: In-memory HTTP responses with builder pattern
//! - **`writer`**: The framing contract handlers write responses through
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Wire format
//!
//! Every response ends with `Connection: close` and the socket is closed
//! after it. Malformed requests and unrouted paths both receive:
//!
//! ```text
//! HTTP/1.1 404 Not Found\r\n
//! Content-Length: 0\r\n
//! Connection: close\r\n
//! \r\n
//! ```

pub mod request;
pub mod response;
pub mod parser;
pub mod connection;
pub mod writer;
pub mod mime;
