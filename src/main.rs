use courier::config::Config;
use courier::handlers;
use courier::routing::HandlerTable;
use courier::server::{Server, ServerSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    let table = HandlerTable::new();
    handlers::register_static_files(&table, &cfg.static_files);

    let server = Server::new(table, ServerSettings::from(&cfg.server));

    tokio::select! {
        res = server.listen_on(cfg.server.listen_addr.as_str()) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
