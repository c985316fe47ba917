use std::fmt;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::response::{Response, StatusCode};

const HTTP_VERSION: &str = "HTTP/1.1";

/// Ways a handler can break the response framing, plus socket failures.
#[derive(Debug)]
pub enum ResponseError {
    HeadersAlreadyWritten,
    HeadersNotWritten,
    /// A status code outside 100..=999 or a reason phrase with a line break.
    InvalidStatus(u16),
    MissingContentLength,
    InvalidContentLength(String),
    /// A header name or value that would corrupt the framing.
    InvalidHeader(String),
    BodyOverflow { declared: u64, attempted: u64 },
    BodyIncomplete { declared: u64, written: u64 },
    Io(std::io::Error),
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseError::HeadersAlreadyWritten => write!(f, "response headers written twice"),
            ResponseError::HeadersNotWritten => write!(f, "response headers not written"),
            ResponseError::InvalidStatus(code) => write!(f, "invalid response status {}", code),
            ResponseError::MissingContentLength => {
                write!(f, "response headers lack Content-Length")
            }
            ResponseError::InvalidContentLength(v) => {
                write!(f, "invalid response Content-Length: {:?}", v)
            }
            ResponseError::InvalidHeader(name) => write!(f, "invalid response header: {:?}", name),
            ResponseError::BodyOverflow { declared, attempted } => write!(
                f,
                "body of {} bytes exceeds declared Content-Length {}",
                attempted, declared
            ),
            ResponseError::BodyIncomplete { declared, written } => write!(
                f,
                "only {} of {} declared body bytes written",
                written, declared
            ),
            ResponseError::Io(e) => write!(f, "write failed: {}", e),
        }
    }
}

impl std::error::Error for ResponseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResponseError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ResponseError {
    fn from(e: std::io::Error) -> Self {
        ResponseError::Io(e)
    }
}

/// Emits exactly one HTTP/1.1 response onto a connection's output sink.
///
/// The writer enforces the framing contract handlers rely on:
///
/// - [`write_headers`](Self::write_headers) is called once, before any body
///   bytes, and must carry a `Content-Length`.
/// - `Connection: close` is always emitted; a handler supplied `Connection`
///   header is dropped.
/// - Body writes past the declared length are rejected, and
///   [`finish`](Self::finish) fails when fewer bytes were written.
///
/// The serialized head stays staged in memory until the first body write
/// (or `finish`), so a handler that fails early leaves the sink untouched.
pub struct ResponseWriter<'a> {
    sink: &'a mut (dyn AsyncWrite + Send + Unpin),
    head: Vec<u8>,
    declared: Option<u64>,
    written: u64,
    committed: bool,
}

impl<'a> ResponseWriter<'a> {
    pub fn new(sink: &'a mut (dyn AsyncWrite + Send + Unpin)) -> Self {
        Self {
            sink,
            head: Vec::new(),
            declared: None,
            written: 0,
            committed: false,
        }
    }

    /// Serializes and writes a complete in-memory response.
    pub async fn write_response(
        sink: &'a mut (dyn AsyncWrite + Send + Unpin),
        response: &Response,
    ) -> Result<(), ResponseError> {
        let mut writer = Self::new(sink);
        writer.send(response).await?;
        writer.finish().await
    }

    /// Stages the status line and headers.
    pub fn write_headers<I, K, V>(
        &mut self,
        status: StatusCode,
        headers: I,
    ) -> Result<(), ResponseError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if self.declared.is_some() {
            return Err(ResponseError::HeadersAlreadyWritten);
        }

        if !status.is_valid() {
            return Err(ResponseError::InvalidStatus(status.as_u16()));
        }

        let mut head = format!(
            "{} {} {}\r\n",
            HTTP_VERSION,
            status.as_u16(),
            status.reason_phrase()
        )
        .into_bytes();

        let mut content_length = None;

        for (name, value) in headers {
            let (name, value) = (name.as_ref(), value.as_ref());

            if !is_valid_header(name, value) {
                return Err(ResponseError::InvalidHeader(name.to_string()));
            }

            if name.eq_ignore_ascii_case("Connection") {
                continue;
            }

            if name.eq_ignore_ascii_case("Content-Length") {
                let length = value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ResponseError::InvalidContentLength(value.to_string()))?;

                if content_length.replace(length).is_some_and(|prev| prev != length) {
                    return Err(ResponseError::InvalidContentLength(value.to_string()));
                }
            }

            head.extend_from_slice(name.as_bytes());
            head.extend_from_slice(b": ");
            head.extend_from_slice(value.as_bytes());
            head.extend_from_slice(b"\r\n");
        }

        let declared = content_length.ok_or(ResponseError::MissingContentLength)?;

        head.extend_from_slice(b"Connection: close\r\n");
        head.extend_from_slice(b"\r\n");

        self.head = head;
        self.declared = Some(declared);

        Ok(())
    }

    /// Writes body bytes. The running total may not exceed `Content-Length`.
    pub async fn write_body(&mut self, bytes: &[u8]) -> Result<(), ResponseError> {
        let declared = self.declared.ok_or(ResponseError::HeadersNotWritten)?;
        let attempted = self.written + bytes.len() as u64;

        if attempted > declared {
            return Err(ResponseError::BodyOverflow {
                declared,
                attempted,
            });
        }

        self.commit_head().await?;
        self.sink.write_all(bytes).await?;
        self.written = attempted;

        Ok(())
    }

    /// Copies the rest of the declared body from `reader`.
    ///
    /// Reads at most the bytes still owed. Returns how many were copied; a
    /// short source surfaces as [`ResponseError::BodyIncomplete`] at `finish`.
    pub async fn write_body_from<R>(&mut self, reader: &mut R) -> Result<u64, ResponseError>
    where
        R: AsyncRead + Unpin + Send + ?Sized,
    {
        let declared = self.declared.ok_or(ResponseError::HeadersNotWritten)?;
        let remaining = declared - self.written;

        self.commit_head().await?;

        let mut limited = reader.take(remaining);
        let copied = tokio::io::copy(&mut limited, &mut *self.sink).await?;
        self.written += copied;

        Ok(copied)
    }

    /// Writes an in-memory response through this writer.
    pub async fn send(&mut self, response: &Response) -> Result<(), ResponseError> {
        self.write_headers(response.status, &response.headers)?;
        self.write_body(&response.body).await
    }

    /// Whether any byte has reached the sink yet.
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    pub fn declared_length(&self) -> Option<u64> {
        self.declared
    }

    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Flushes everything written so far and verifies the body matched
    /// `Content-Length`.
    ///
    /// A short body is still flushed as is; it is never padded.
    pub async fn finish(mut self) -> Result<(), ResponseError> {
        let declared = self.declared.ok_or(ResponseError::HeadersNotWritten)?;

        self.commit_head().await?;
        self.sink.flush().await?;

        if self.written != declared {
            return Err(ResponseError::BodyIncomplete {
                declared,
                written: self.written,
            });
        }

        Ok(())
    }

    async fn commit_head(&mut self) -> Result<(), ResponseError> {
        if self.head.is_empty() {
            return Ok(());
        }

        let head = std::mem::take(&mut self.head);
        self.committed = true;
        self.sink.write_all(&head).await?;

        Ok(())
    }
}

fn is_valid_header(name: &str, value: &str) -> bool {
    !name.is_empty()
        && !name.bytes().any(|b| b == b':' || b.is_ascii_whitespace() || b.is_ascii_control())
        && !value.bytes().any(|b| b == b'\r' || b == b'\n')
}
