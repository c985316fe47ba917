use bytes::Bytes;
use std::collections::HashMap;

/// Represents a parsed HTTP request from a client.
///
/// A request is immutable once built: the parser (or a [`RequestBuilder`])
/// produces it and handlers only ever see a shared reference.
///
/// Header names are kept exactly as the client wrote them, so lookups are
/// case-sensitive. A name sent twice keeps the last value.
#[derive(Debug, Clone)]
pub struct Request {
    method: String,
    path: String,
    version: String,
    headers: HashMap<String, String>,
    body: Bytes,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<String>,
    path: Option<String>,
    version: Option<String>,
    headers: HashMap<String, String>,
    body: Bytes,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            path: None,
            version: None,
            headers: HashMap::new(),
            body: Bytes::new(),
        }
    }

    /// Sets the method. It is stored upper-cased.
    pub fn method(mut self, method: impl AsRef<str>) -> Self {
        self.method = Some(method.as_ref().to_ascii_uppercase());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        let method = self.method.ok_or("method missing")?;
        if method.is_empty() {
            return Err("method empty");
        }

        let path = self.path.ok_or("path missing")?;
        if !path.starts_with('/') {
            return Err("path must start with '/'");
        }

        Ok(Request {
            method,
            path,
            version: self.version.unwrap_or_else(|| "HTTP/1.1".to_string()),
            headers: self.headers,
            body: self.body,
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    pub(crate) fn from_parts(
        method: String,
        path: String,
        version: String,
        headers: HashMap<String, String>,
        body: Bytes,
    ) -> Self {
        Self {
            method,
            path,
            version,
            headers,
            body,
        }
    }

    /// Upper-case method token, e.g. `GET`.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request target exactly as sent. Always starts with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Retrieves a header value by its exact (case-sensitive) name.
    ///
    /// # Example
    ///
    /// ```
    /// # use courier::http::request::RequestBuilder;
    /// let req = RequestBuilder::new()
    ///     .method("GET")
    ///     .path("/")
    ///     .header("Host", "example.com")
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(req.header("Host"), Some("example.com"));
    /// assert_eq!(req.header("host"), None);
    /// ```
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|v| v.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Length of the body that was actually read.
    pub fn content_length(&self) -> usize {
        self.body.len()
    }
}
