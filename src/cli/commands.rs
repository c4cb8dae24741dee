//! CLI command implementations
//!
//! `serve` and `check` share one boot path: load the config, register every
//! source, open the query store. `check` stops there and reports.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::config::ServiceConfig;
use crate::engine::{QueryEngine, SourceRegistry};
use crate::http_server::HttpServer;
use crate::store::{FileQueryStore, MemoryQueryStore, QueryStore};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config } => serve(&config),
        Command::Check { config } => check(&config),
    }
}

/// Builds the engine described by a config
pub fn build_engine(config: &ServiceConfig) -> CliResult<QueryEngine> {
    let registry = SourceRegistry::from_config(&config.sources)?;

    let store: Arc<dyn QueryStore> = match &config.store.path {
        Some(path) => Arc::new(FileQueryStore::new(path)),
        None => Arc::new(MemoryQueryStore::new()),
    };

    Ok(QueryEngine::new(registry, store))
}

/// Serve the HTTP API until the process is stopped
pub fn serve(config_path: &Path) -> CliResult<()> {
    let config = ServiceConfig::load(config_path)?;

    // Sources are registered inside the runtime; the postgres backend spawns
    // its connection tasks there.
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        let engine = Arc::new(build_engine(&config)?);
        HttpServer::with_engine(config.http.clone(), engine)
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Validate configuration and print the registered sources
pub fn check(config_path: &Path) -> CliResult<()> {
    let config = ServiceConfig::load(config_path)?;
    let engine = build_engine(&config)?;

    let sources: Vec<_> = config
        .sources
        .iter()
        .map(|s| {
            json!({
                "name": s.name,
                "engine": s.engine.as_str(),
                "max_rows": s.limits.max_rows,
                "items_per_page": s.limits.items_per_page,
                "max_connections": s.limits.max_connections,
            })
        })
        .collect();

    write_response(json!({
        "sources": sources,
        "registered": engine.registry().len(),
        "store": config.store.path.as_ref().map(|p| p.display().to_string()),
        "http": config.http.socket_addr(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_build_engine_registers_sources() {
        let config = ServiceConfig::from_json(
            r#"{
                "sources": [
                    {"name": "olap_sales", "engine": "postgres", "url": "postgresql://localhost/olap"},
                    {"name": "demo", "engine": "memory", "max_connections": 4}
                ]
            }"#,
        )
        .unwrap();

        let engine = build_engine(&config).unwrap();
        assert_eq!(engine.registry().names(), vec!["demo", "olap_sales"]);
        assert_eq!(engine.registry().get("demo").unwrap().gate().capacity(), 4);
    }

    #[test]
    fn test_check_accepts_valid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cubequery.json");
        fs::write(
            &path,
            r#"{"sources": [{"name": "demo", "engine": "memory"}]}"#,
        )
        .unwrap();

        check(&path).unwrap();
    }

    #[test]
    fn test_check_rejects_zero_limits() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cubequery.json");
        fs::write(
            &path,
            r#"{"sources": [{"name": "demo", "engine": "memory", "items_per_page": 0}]}"#,
        )
        .unwrap();

        let err = check(&path).unwrap_err();
        assert_eq!(err.code_str(), "CUBE_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_missing_config_file() {
        let err = check(Path::new("/nonexistent/cubequery.json")).unwrap_err();
        assert_eq!(err.code_str(), "CUBE_CLI_CONFIG_ERROR");
    }
}
