//! MIME type detection based on file extensions.

use std::path::Path;

pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Returns the MIME type for a file extension (without the dot).
///
/// Matching ignores ASCII case. Unknown extensions map to
/// [`DEFAULT_MIME`].
///
/// # Example
///
/// ```
/// # use courier::http::mime;
/// assert_eq!(mime::from_extension("HTML"), "text/html");
/// assert_eq!(mime::from_extension("bin"), "application/octet-stream");
/// ```
pub fn from_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "text/javascript",
        "json" => "application/json",
        "txt" => "text/plain",
        "xml" => "application/xml",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "pdf" => "application/pdf",
        _ => DEFAULT_MIME,
    }
}

pub fn from_path(path: impl AsRef<Path>) -> &'static str {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(from_extension)
        .unwrap_or(DEFAULT_MIME)
}
