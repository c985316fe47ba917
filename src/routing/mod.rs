//! Request routing
//!
//! This module holds the handler capability and the registry that maps a
//! request's method and path to it.

pub mod handler;
pub mod table;

pub use handler::Handler;
pub use table::HandlerTable;
