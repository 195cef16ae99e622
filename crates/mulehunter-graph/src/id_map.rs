//! External account id ↔ internal node index.

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use mulehunter_core::{Error, Result};

/// Column holding the external account id in the account table.
const ID_COLUMN: &str = "node_id";

/// Bidirectional id map, built once per load and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct IdMap {
    by_id: HashMap<String, usize>,
    by_index: Vec<String>,
}

impl IdMap {
    /// Build from ids in node order; position `i` maps to node index `i`.
    pub fn from_ids(ids: Vec<String>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(ids.len());
        for (index, id) in ids.iter().enumerate() {
            if by_id.insert(id.clone(), index).is_some() {
                return Err(Error::Snapshot(format!("duplicate account id {:?}", id)));
            }
        }
        Ok(Self {
            by_id,
            by_index: ids,
        })
    }

    /// Load the account table. A missing file yields an empty map, which makes
    /// every account a cold-start account.
    pub fn load(path: &Path, expected_rows: usize) -> Result<Self> {
        if !path.exists() {
            warn!(
                "Account table {} not found; all accounts will be treated as cold-start",
                path.display()
            );
            return Ok(Self::default());
        }

        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| Error::Snapshot(format!("{}: {}", path.display(), e)))?;
        let column = reader
            .headers()
            .map_err(|e| Error::Snapshot(e.to_string()))?
            .iter()
            .position(|h| h.trim() == ID_COLUMN)
            .ok_or_else(|| {
                Error::Snapshot(format!("{} has no {} column", path.display(), ID_COLUMN))
            })?;

        let mut ids = Vec::with_capacity(expected_rows);
        for record in reader.records() {
            let record = record.map_err(|e| Error::Snapshot(e.to_string()))?;
            let id = record.get(column).unwrap_or_default().trim().to_string();
            ids.push(id);
        }

        if ids.len() != expected_rows {
            return Err(Error::Snapshot(format!(
                "account table has {} rows but the snapshot has {} nodes",
                ids.len(),
                expected_rows
            )));
        }

        let map = Self::from_ids(ids)?;
        info!("Id map built: {} accounts", map.len());
        Ok(map)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn external_id(&self, index: usize) -> Option<&str> {
        self.by_index.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }
}
