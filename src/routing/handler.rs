//! The handler capability invoked for a routed request.

use async_trait::async_trait;

use crate::http::request::Request;
use crate::http::writer::ResponseWriter;

/// Produces one complete response for a matched `(method, path)`.
///
/// A single handler instance is shared by every connection routed to it,
/// so it may run concurrently with itself.
///
/// Implementations write through `out`, which enforces the framing rules
/// (headers once, then exactly `Content-Length` body bytes). Returning an
/// error before anything was committed lets the server answer with a 500;
/// after that the connection is simply closed.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use courier::http::request::Request;
/// use courier::http::response::StatusCode;
/// use courier::http::writer::ResponseWriter;
/// use courier::routing::Handler;
///
/// struct Hello;
///
/// #[async_trait]
/// impl Handler for Hello {
///     async fn handle(&self, _req: &Request, out: &mut ResponseWriter<'_>) -> anyhow::Result<()> {
///         out.write_headers(
///             StatusCode::Ok,
///             [("Content-Type", "text/plain"), ("Content-Length", "5")],
///         )?;
///         out.write_body(b"hello").await?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, request: &Request, out: &mut ResponseWriter<'_>) -> anyhow::Result<()>;
}
