use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::http::connection::Connection;
use crate::http::parser::{ParseLimits, RequestParser};
use crate::routing::HandlerTable;

/// Runtime knobs for a [`Server`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerSettings {
    /// Maximum number of connections served at once.
    pub workers: usize,
    /// Deadline for receiving one complete request.
    pub read_timeout: Duration,
    pub limits: ParseLimits,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            workers: 64,
            read_timeout: Duration::from_secs(10),
            limits: ParseLimits::default(),
        }
    }
}

impl From<&ServerConfig> for ServerSettings {
    fn from(cfg: &ServerConfig) -> Self {
        Self {
            workers: cfg.workers,
            read_timeout: Duration::from_millis(cfg.read_timeout_ms),
            limits: ParseLimits {
                max_head_bytes: cfg.max_head_bytes,
                max_body_bytes: cfg.max_body_bytes,
            },
        }
    }
}

/// Accepts connections and serves each one on a bounded pool of tasks.
///
/// A worker permit is taken before every `accept`, so once `workers`
/// connections are in flight the loop stops accepting until one finishes.
/// Pending clients wait in the kernel's listen backlog meanwhile.
pub struct Server {
    table: HandlerTable,
    settings: ServerSettings,
    workers: Arc<Semaphore>,
}

impl Server {
    pub fn new(table: HandlerTable, settings: ServerSettings) -> Self {
        let workers = Arc::new(Semaphore::new(settings.workers.max(1)));

        Self {
            table,
            settings,
            workers,
        }
    }

    /// The registry consulted for every request. Registering through it
    /// while the server runs is allowed.
    pub fn table(&self) -> &HandlerTable {
        &self.table
    }

    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }

    /// Binds every interface on `port` and serves until a fatal error.
    pub async fn listen(&self, port: u16) -> anyhow::Result<()> {
        self.listen_on(("0.0.0.0", port)).await
    }

    pub async fn listen_on<A: ToSocketAddrs>(&self, addr: A) -> anyhow::Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .context("failed to bind listening socket")?;

        self.serve(listener).await
    }

    /// Runs the accept loop on an already bound listener.
    ///
    /// Only accept failures end the loop; errors on individual connections
    /// are logged by the task that served them.
    pub async fn serve(&self, listener: TcpListener) -> anyhow::Result<()> {
        let local = listener.local_addr()?;
        info!("Listening on {} with {} workers", local, self.settings.workers.max(1));

        let parser = RequestParser::new(self.settings.limits);

        loop {
            let permit = Arc::clone(&self.workers)
                .acquire_owned()
                .await
                .context("worker pool closed")?;

            let (socket, peer) = listener
                .accept()
                .await
                .context("failed to accept connection")?;
            info!("Accepted connection from {}", peer);

            let conn = Connection::new(
                socket,
                peer,
                self.table.clone(),
                parser,
                self.settings.read_timeout,
            );
            let task = tokio::spawn(conn.run());

            tokio::spawn(async move {
                let _permit = permit;

                match task.await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => error!("Connection error from {}: {:#}", peer, e),
                    Err(e) if e.is_panic() => error!("Connection task for {} panicked", peer),
                    Err(e) => error!("Connection task for {} aborted: {}", peer, e),
                }
            });
        }
    }
}
