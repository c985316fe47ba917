use crate::http::request::Request;
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;

pub const DEFAULT_MAX_HEAD_BYTES: usize = 16 * 1024;
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// More bytes are needed before a decision can be made.
    Incomplete,
    /// The request line is not exactly `METHOD PATH VERSION`.
    InvalidRequestLine,
    /// The request target does not start with `/`.
    InvalidPath,
    InvalidEncoding,
    InvalidContentLength,
    HeadTooLarge,
    BodyTooLarge { length: usize, limit: usize },
    /// The stream ended before `Content-Length` bytes arrived.
    TruncatedBody { expected: usize, received: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Incomplete => write!(f, "incomplete request"),
            ParseError::InvalidRequestLine => write!(f, "malformed request line"),
            ParseError::InvalidPath => write!(f, "request path must start with '/'"),
            ParseError::InvalidEncoding => write!(f, "request line is not valid UTF-8"),
            ParseError::InvalidContentLength => write!(f, "malformed Content-Length"),
            ParseError::HeadTooLarge => write!(f, "request head too large"),
            ParseError::BodyTooLarge { length, limit } => {
                write!(f, "body of {} bytes exceeds limit of {} bytes", length, limit)
            }
            ParseError::TruncatedBody { expected, received } => write!(
                f,
                "stream ended after {} of {} body bytes",
                received, expected
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Upper bounds applied while parsing a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    /// Request line plus headers, including line terminators.
    pub max_head_bytes: usize,
    pub max_body_bytes: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_head_bytes: DEFAULT_MAX_HEAD_BYTES,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Turns the bytes read so far from one connection into a [`Request`].
///
/// The parser is stateless: callers keep appending to their buffer and call
/// [`RequestParser::parse`] again while it answers [`ParseError::Incomplete`].
/// Once the peer has closed its write side, [`RequestParser::parse_eof`]
/// treats the end of the stream as the end of the header section.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestParser {
    limits: ParseLimits,
}

/// Parses a request with the default limits.
///
/// Returns the request and the number of bytes it occupied in `buf`.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    RequestParser::default().parse(buf)
}

impl RequestParser {
    pub fn new(limits: ParseLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> ParseLimits {
        self.limits
    }

    pub fn parse(&self, buf: &[u8]) -> Result<(Request, usize), ParseError> {
        self.parse_inner(buf, false)
    }

    pub fn parse_eof(&self, buf: &[u8]) -> Result<(Request, usize), ParseError> {
        self.parse_inner(buf, true)
    }

    fn parse_inner(&self, buf: &[u8], eof: bool) -> Result<(Request, usize), ParseError> {
        // Request line
        let (request_line, mut pos) = match next_line(buf, 0) {
            Some(found) => found,
            None if eof => (trim_cr(buf), buf.len()),
            None => return Err(self.incomplete(buf.len())),
        };

        let (method, path, version) = parse_request_line(request_line)?;

        // Headers, up to the first blank line or the end of the stream
        let mut headers = HashMap::new();

        let head_end = loop {
            match next_line(buf, pos) {
                Some((line, next)) => {
                    if line.is_empty() {
                        break next;
                    }
                    insert_header(&mut headers, line);
                    pos = next;
                }
                None if eof => {
                    let line = trim_cr(&buf[pos..]);
                    if !line.is_empty() {
                        insert_header(&mut headers, line);
                    }
                    break buf.len();
                }
                None => return Err(self.incomplete(buf.len())),
            }
        };

        if head_end > self.limits.max_head_bytes {
            return Err(ParseError::HeadTooLarge);
        }

        // Body
        let content_length = headers
            .get("Content-Length")
            .map(|v| parse_content_length(v))
            .transpose()?
            .unwrap_or(0);

        if content_length > self.limits.max_body_bytes {
            return Err(ParseError::BodyTooLarge {
                length: content_length,
                limit: self.limits.max_body_bytes,
            });
        }

        let received = buf.len() - head_end;
        if received < content_length {
            return Err(if eof {
                ParseError::TruncatedBody {
                    expected: content_length,
                    received,
                }
            } else {
                ParseError::Incomplete
            });
        }

        let body = Bytes::copy_from_slice(&buf[head_end..head_end + content_length]);
        let request = Request::from_parts(method, path, version, headers, body);

        Ok((request, head_end + content_length))
    }

    fn incomplete(&self, buffered: usize) -> ParseError {
        if buffered > self.limits.max_head_bytes {
            ParseError::HeadTooLarge
        } else {
            ParseError::Incomplete
        }
    }
}

fn parse_request_line(line: &[u8]) -> Result<(String, String, String), ParseError> {
    let line = std::str::from_utf8(line).map_err(|_| ParseError::InvalidEncoding)?;

    let mut parts: Vec<&str> = line.split(' ').collect();
    while parts.last().is_some_and(|t| t.is_empty()) {
        parts.pop();
    }

    let [method, path, version] = parts.as_slice() else {
        return Err(ParseError::InvalidRequestLine);
    };

    if method.is_empty() || path.is_empty() || version.is_empty() {
        return Err(ParseError::InvalidRequestLine);
    }

    if !path.starts_with('/') {
        return Err(ParseError::InvalidPath);
    }

    Ok((
        method.to_ascii_uppercase(),
        path.to_string(),
        version.to_string(),
    ))
}

fn insert_header(headers: &mut HashMap<String, String>, line: &[u8]) {
    let line = String::from_utf8_lossy(line);

    match line.split_once(": ") {
        Some((name, value)) => {
            headers.insert(name.to_string(), value.to_string());
        }
        None => tracing::trace!(line = %line, "Skipping header line without separator"),
    }
}

fn parse_content_length(value: &str) -> Result<usize, ParseError> {
    let value = value.trim_matches(|c| c == ' ' || c == '\t');

    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidContentLength);
    }

    value
        .parse::<usize>()
        .map_err(|_| ParseError::InvalidContentLength)
}

/// Returns the line starting at `start` without its terminator, and the
/// offset just past the `\n`.
fn next_line(buf: &[u8], start: usize) -> Option<(&[u8], usize)> {
    let rest = &buf[start..];
    let nl = rest.iter().position(|&b| b == b'\n')?;
    Some((trim_cr(&rest[..nl]), start + nl + 1))
}

fn trim_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}
