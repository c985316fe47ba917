use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::http::parser::{ParseError, RequestParser};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::routing::HandlerTable;

const READ_CHUNK: usize = 4096;

/// Why no request could be read from a connection.
#[derive(Debug)]
pub enum ReadError {
    /// The peer closed the connection without sending anything.
    Closed,
    /// The read deadline expired first.
    Timeout,
    Io(std::io::Error),
    /// The bytes received do not form a valid request.
    Parse(ParseError),
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadError::Closed => write!(f, "connection closed before a request was sent"),
            ReadError::Timeout => write!(f, "timed out reading request"),
            ReadError::Io(e) => write!(f, "failed reading request: {}", e),
            ReadError::Parse(e) => write!(f, "malformed request: {}", e),
        }
    }
}

impl std::error::Error for ReadError {}

/// One accepted socket, used for exactly one request/response exchange.
///
/// The lifecycle is linear:
///
/// ```text
/// Reading ──parse failure──────────────┐
///    │                                 ▼
///    ├──no handler──────────────► fixed 404
///    ▼                                 │
/// Handling ──error or no response, ─► 500
///    │       nothing committed yet     │
///    ▼                                 ▼
/// finish (contract check) ──────► Closed
/// ```
///
/// The socket is shut down on every path out of [`Connection::run`] and
/// released when the connection is dropped.
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    buffer: BytesMut,
    parser: RequestParser,
    read_timeout: Duration,
    table: HandlerTable,
}

impl Connection {
    pub fn new(
        stream: TcpStream,
        peer: SocketAddr,
        table: HandlerTable,
        parser: RequestParser,
        read_timeout: Duration,
    ) -> Self {
        Self {
            stream,
            peer,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            parser,
            read_timeout,
            table,
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Serves the single exchange and closes the socket.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let result = self.exchange().await;

        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!(peer = %self.peer, error = %e, "Socket shutdown failed");
        }

        result
    }

    async fn exchange(&mut self) -> anyhow::Result<()> {
        let request = match self.read_request().await {
            Ok(request) => request,
            Err(ReadError::Closed) => {
                tracing::debug!(peer = %self.peer, "Peer closed without a request");
                return Ok(());
            }
            Err(ReadError::Parse(e)) => {
                tracing::warn!(peer = %self.peer, error = %e, "Rejecting malformed request");
                return self.respond(&Response::not_found()).await;
            }
            Err(e) => return Err(anyhow!(e)),
        };

        let Some(handler) = self.table.lookup(request.method(), request.path()) else {
            tracing::warn!(
                peer = %self.peer,
                method = %request.method(),
                path = %request.path(),
                "No handler registered"
            );
            return self.respond(&Response::not_found()).await;
        };

        tracing::debug!(
            peer = %self.peer,
            method = %request.method(),
            path = %request.path(),
            body_len = request.content_length(),
            "Dispatching request"
        );

        let mut out = BufWriter::new(&mut self.stream);
        let mut writer = ResponseWriter::new(&mut out);

        let outcome = match handler.handle(&request, &mut writer).await {
            Ok(()) if writer.declared_length().is_none() => {
                Err(anyhow!("handler returned without writing a response"))
            }
            outcome => outcome,
        };

        match outcome {
            Ok(()) => writer
                .finish()
                .await
                .with_context(|| format!("response for {} {}", request.method(), request.path())),
            Err(e) => {
                let committed = writer.is_committed();
                drop(writer);

                if committed {
                    if let Err(flush) = out.flush().await {
                        tracing::debug!(
                            peer = %self.peer,
                            error = %flush,
                            "Flushing partial response failed"
                        );
                    }

                    return Err(e.context(format!(
                        "handler for {} {} failed after a partial response",
                        request.method(),
                        request.path()
                    )));
                }

                ResponseWriter::write_response(&mut out, &Response::internal_error()).await?;

                Err(e.context(format!(
                    "handler for {} {} failed",
                    request.method(),
                    request.path()
                )))
            }
        }
    }

    async fn respond(&mut self, response: &Response) -> anyhow::Result<()> {
        let mut out = BufWriter::new(&mut self.stream);
        ResponseWriter::write_response(&mut out, response).await?;
        Ok(())
    }

    async fn read_request(&mut self) -> Result<Request, ReadError> {
        match timeout(self.read_timeout, self.read_until_parsed()).await {
            Ok(result) => result,
            Err(_) => Err(ReadError::Timeout),
        }
    }

    async fn read_until_parsed(&mut self) -> Result<Request, ReadError> {
        loop {
            // Try parsing whatever we already have
            match self.parser.parse(&self.buffer) {
                Ok((request, _)) => return Ok(request),
                Err(ParseError::Incomplete) => {}
                Err(e) => return Err(ReadError::Parse(e)),
            }

            self.buffer.reserve(READ_CHUNK);
            let n = self
                .stream
                .read_buf(&mut self.buffer)
                .await
                .map_err(ReadError::Io)?;

            if n == 0 {
                if self.buffer.is_empty() {
                    return Err(ReadError::Closed);
                }

                return self
                    .parser
                    .parse_eof(&self.buffer)
                    .map(|(request, _)| request)
                    .map_err(ReadError::Parse);
            }
        }
    }
}
