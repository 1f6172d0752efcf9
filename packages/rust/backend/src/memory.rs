//! In-memory table source backed by JSON values.

use std::collections::HashMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use yanaflow_shared::{Result, YanaFlowError};

use crate::{Table, TableSource};

/// Serves table rows from JSON held in memory.
///
/// Tables that were never given rows answer with an empty list.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<Table, std::result::Result<Value, String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `rows` (a JSON array, or `null`) for `table`.
    pub fn with_rows(mut self, table: Table, rows: Value) -> Self {
        self.tables.insert(table, Ok(rows));
        self
    }

    /// Make queries on `table` fail with a backend error.
    pub fn with_error(mut self, table: Table, message: impl Into<String>) -> Self {
        self.tables.insert(table, Err(message.into()));
        self
    }

    /// Load `<table>.json` files from a directory. Missing files are skipped.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut source = Self::new();
        for table in Table::FETCH_ORDER {
            let path = dir.join(format!("{}.json", table.as_str()));
            if !path.exists() {
                debug!(?path, "no snapshot for table");
                continue;
            }
            let content = std::fs::read_to_string(&path).map_err(|e| YanaFlowError::io(&path, e))?;
            let rows: Value = serde_json::from_str(&content).map_err(|e| {
                YanaFlowError::parse(format!("failed to parse {}: {e}", path.display()))
            })?;
            source = source.with_rows(table, rows);
        }
        Ok(source)
    }
}

impl TableSource for MemorySource {
    async fn select_all<T>(&self, table: Table) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self.tables.get(&table) {
            None | Some(Ok(Value::Null)) => Ok(Vec::new()),
            Some(Ok(rows)) => serde_json::from_value(rows.clone())
                .map_err(|e| YanaFlowError::parse(format!("{table}: {e}"))),
            Some(Err(message)) => Err(YanaFlowError::backend(table.as_str(), message.clone())),
        }
    }
}
