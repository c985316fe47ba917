//! Accept loop and worker pool.

pub mod listener;

pub use listener::{Server, ServerSettings};
