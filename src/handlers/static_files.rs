//! Handlers that answer from files on disk.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Context;
use async_trait::async_trait;
use tokio::fs::File;

use crate::http::mime;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::http::writer::ResponseWriter;
use crate::routing::Handler;

/// Placeholder replaced by the current time in templates.
pub const TIME_PLACEHOLDER: &str = "{time}";

/// Streams one file with a MIME type derived from its extension.
#[derive(Debug, Clone)]
pub struct StaticFile {
    file: PathBuf,
    content_type: &'static str,
}

impl StaticFile {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        let file = file.into();
        let content_type = mime::from_path(&file);

        Self { file, content_type }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

#[async_trait]
impl Handler for StaticFile {
    async fn handle(&self, _request: &Request, out: &mut ResponseWriter<'_>) -> anyhow::Result<()> {
        let mut file = match File::open(&self.file).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(file = %self.file.display(), "Registered file is missing");
                out.send(&Response::not_found()).await?;
                return Ok(());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to open {}", self.file.display()));
            }
        };

        let length = file.metadata().await?.len().to_string();

        out.write_headers(
            StatusCode::Ok,
            [
                ("Content-Type", self.content_type),
                ("Content-Length", length.as_str()),
            ],
        )?;
        out.write_body_from(&mut file).await?;

        Ok(())
    }
}

/// Serves a UTF-8 file after substituting [`TIME_PLACEHOLDER`] with the
/// current time as an HTTP-date.
#[derive(Debug, Clone)]
pub struct Template {
    file: PathBuf,
    content_type: &'static str,
}

impl Template {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        let file = file.into();
        let content_type = mime::from_path(&file);

        Self { file, content_type }
    }

    pub fn render(source: &str, now: SystemTime) -> String {
        source.replace(TIME_PLACEHOLDER, &httpdate::fmt_http_date(now))
    }
}

#[async_trait]
impl Handler for Template {
    async fn handle(&self, _request: &Request, out: &mut ResponseWriter<'_>) -> anyhow::Result<()> {
        let source = match tokio::fs::read_to_string(&self.file).await {
            Ok(source) => source,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(file = %self.file.display(), "Registered template is missing");
                out.send(&Response::not_found()).await?;
                return Ok(());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", self.file.display()));
            }
        };

        let body = Self::render(&source, SystemTime::now());
        out.send(&Response::ok(self.content_type, body.into_bytes()))
            .await?;

        Ok(())
    }
}
