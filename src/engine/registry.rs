//! Source registry
//!
//! Typed map from source name to everything needed to run queries against
//! it: limits, its own connection gate, and its backend. Built once at
//! startup; the registry is read-only while serving.

use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::{self, AnalyticsBackend};
use crate::config::{ConfigError, ConfigResult, EngineConfig, SourceConfig};
use crate::gate::ConnectionGate;
use crate::observability::{Event, Logger};
use crate::planner::Paginator;

use super::errors::{EngineError, EngineResult};
use super::guard::RowCountGuard;

/// One registered data source
pub struct SourceHandle {
    name: String,
    config: EngineConfig,
    gate: ConnectionGate,
    backend: Arc<dyn AnalyticsBackend>,
    guard: RowCountGuard,
    paginator: Paginator,
}

impl SourceHandle {
    /// Validates limits and builds the source's gate
    pub fn new(
        name: impl Into<String>,
        config: EngineConfig,
        backend: Arc<dyn AnalyticsBackend>,
    ) -> ConfigResult<Self> {
        let name = name.into();
        config.validate()?;

        Ok(Self {
            gate: ConnectionGate::new(name.clone(), config.max_connections_nonzero()?),
            guard: RowCountGuard::new(config.max_rows),
            paginator: Paginator::new(config.items_per_page_nonzero()?),
            name,
            config,
            backend,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn gate(&self) -> &ConnectionGate {
        &self.gate
    }

    pub fn backend(&self) -> &dyn AnalyticsBackend {
        self.backend.as_ref()
    }

    pub fn guard(&self) -> &RowCountGuard {
        &self.guard
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }
}

impl std::fmt::Debug for SourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceHandle")
            .field("name", &self.name)
            .field("engine", &self.backend.engine())
            .field("config", &self.config)
            .field("gate", &self.gate)
            .finish()
    }
}

/// All registered sources
#[derive(Debug, Default)]
pub struct SourceRegistry {
    sources: HashMap<String, Arc<SourceHandle>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every configured source with its engine's backend
    pub fn from_config(sources: &[SourceConfig]) -> ConfigResult<Self> {
        let mut registry = Self::new();
        for source in sources {
            let backend = backend::connect(source);
            let handle = SourceHandle::new(&source.name, source.limits.clone(), backend)?;
            registry.register(handle)?;
        }
        Ok(registry)
    }

    /// Adds a source. Names are unique.
    pub fn register(&mut self, handle: SourceHandle) -> ConfigResult<Arc<SourceHandle>> {
        if self.sources.contains_key(handle.name()) {
            return Err(ConfigError::DuplicateSource(handle.name().to_string()));
        }

        let max_connections = handle.config().max_connections.to_string();
        Logger::info(
            Event::SourceRegistered,
            &[
                ("engine", handle.backend().engine().as_str()),
                ("max_connections", &max_connections),
                ("source", handle.name()),
            ],
        );

        let handle = Arc::new(handle);
        self.sources
            .insert(handle.name().to_string(), Arc::clone(&handle));
        Ok(handle)
    }

    /// Looks up a source by name
    pub fn get(&self, name: &str) -> EngineResult<Arc<SourceHandle>> {
        self.sources
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::UnknownSource(name.to_string()))
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sources.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Closes every source gate; later round-trips fail with `Unavailable`
    pub fn close_all(&self) {
        for source in self.sources.values() {
            source.gate().close();
        }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
