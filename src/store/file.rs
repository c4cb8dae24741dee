//! JSON file query store
//!
//! All records live in one JSON array. Writes rewrite the whole file through
//! a temporary sibling and a rename, under a process-wide lock.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;

use super::errors::{StoreError, StoreResult};
use super::{PersistedQuery, QueryId, QueryStore};
use crate::planner::QueryPlan;

/// File-backed store that survives restarts
#[derive(Debug)]
pub struct FileQueryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileQueryStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_all(&self) -> StoreResult<Vec<PersistedQuery>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| StoreError::Io(format!("Failed to read query store: {}", e)))?;

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content)
            .map_err(|e| StoreError::Serialization(format!("Failed to parse query store: {}", e)))
    }

    fn save_all(&self, queries: &[PersistedQuery]) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(queries).map_err(|e| {
            StoreError::Serialization(format!("Failed to serialize queries: {}", e))
        })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Io(format!("Failed to create query store directory: {}", e))
                })?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)
            .map_err(|e| StoreError::Io(format!("Failed to write query store: {}", e)))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| StoreError::Io(format!("Failed to replace query store: {}", e)))
    }
}

impl QueryStore for FileQueryStore {
    fn create(&self, plan: &QueryPlan, raw_request: Value) -> StoreResult<PersistedQuery> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("query store lock poisoned".into()))?;

        let mut queries = self.load_all()?;
        let record = PersistedQuery::from_plan(plan, raw_request);
        queries.push(record.clone());
        self.save_all(&queries)?;

        Ok(record)
    }

    fn get(&self, id: &QueryId) -> StoreResult<Option<PersistedQuery>> {
        Ok(self.load_all()?.into_iter().find(|q| q.id == *id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn plan(sql: &str) -> QueryPlan {
        QueryPlan {
            source_name: "olap_sales".into(),
            sql: sql.into(),
            row_count: 250_001,
            pages: 3,
            items_per_page: 100_000,
        }
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("queries.json");

        let id = {
            let store = FileQueryStore::new(&path);
            store.create(&plan("select 1"), json!({"WHERE": []})).unwrap().id
        };

        let reopened = FileQueryStore::new(&path);
        let record = reopened.get(&id).unwrap().unwrap();
        assert_eq!(record.sql, "select 1");
        assert_eq!(record.pages, 3);
        assert_eq!(record.raw_request, json!({"WHERE": []}));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = FileQueryStore::new(dir.path().join("absent.json"));
        assert!(store.get(&QueryId::new()).unwrap().is_none());
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let store = FileQueryStore::new(dir.path().join("nested/deeper/queries.json"));
        store.create(&plan("select 2"), Value::Null).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("queries.json");
        fs::write(&path, "{ not json").unwrap();

        let store = FileQueryStore::new(&path);
        let err = store.create(&plan("select 3"), Value::Null).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[test]
    fn test_multiple_records_kept() {
        let dir = tempdir().unwrap();
        let store = FileQueryStore::new(dir.path().join("queries.json"));

        let a = store.create(&plan("select a"), Value::Null).unwrap();
        let b = store.create(&plan("select b"), Value::Null).unwrap();

        assert_eq!(store.get(&a.id).unwrap().unwrap().sql, "select a");
        assert_eq!(store.get(&b.id).unwrap().unwrap().sql, "select b");
    }
}
