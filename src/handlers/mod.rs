//! File-serving handlers and their registration.

pub mod static_files;

use std::path::Path;
use std::sync::Arc;

use crate::config::StaticFilesConfig;
use crate::routing::HandlerTable;

pub use static_files::{StaticFile, Template};

/// Registers `GET` for every configured file.
///
/// Paths listed under `templates` get a [`Template`], the rest a
/// [`StaticFile`]. Returns the number of routes registered.
pub fn register_static_files(table: &HandlerTable, cfg: &StaticFilesConfig) -> usize {
    let root = Path::new(&cfg.root);
    let mut registered = 0;

    for path in &cfg.paths {
        let file = root.join(path.trim_start_matches('/'));

        if cfg.templates.contains(path) {
            table.register("GET", path, Arc::new(Template::new(file)));
        } else {
            table.register("GET", path, Arc::new(StaticFile::new(file)));
        }
        registered += 1;
    }

    for path in cfg.templates.iter().filter(|t| !cfg.paths.contains(*t)) {
        let file = root.join(path.trim_start_matches('/'));
        table.register("GET", path, Arc::new(Template::new(file)));
        registered += 1;
    }

    tracing::info!(root = %cfg.root, routes = registered, "Registered static files");

    registered
}
