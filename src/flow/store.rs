use super::document::Flow;
use crate::error::FlowError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Persistence for the set of saved flows.
///
/// Implementors only read and write the whole list; lookups and edits are provided.
pub trait FlowStore {
    fn load_all(&self) -> Result<Vec<Flow>, FlowError>;

    fn save_all(&self, flows: &[Flow]) -> Result<(), FlowError>;

    fn get(&self, id: &str) -> Result<Option<Flow>, FlowError> {
        Ok(self.load_all()?.into_iter().find(|flow| flow.id == id))
    }

    /// Replaces the flow with the same id, or appends it.
    fn upsert(&self, flow: Flow) -> Result<(), FlowError> {
        let mut flows = self.load_all()?;
        match flows.iter_mut().find(|existing| existing.id == flow.id) {
            Some(existing) => *existing = flow,
            None => flows.push(flow),
        }
        self.save_all(&flows)
    }

    /// Removes a flow. Returns whether it existed.
    fn delete(&self, id: &str) -> Result<bool, FlowError> {
        let mut flows = self.load_all()?;
        let before = flows.len();
        flows.retain(|flow| flow.id != id);
        if flows.len() == before {
            return Ok(false);
        }
        self.save_all(&flows)?;
        Ok(true)
    }
}

/// Stores every flow in one pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> FlowError {
        FlowError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl FlowStore for JsonFileStore {
    fn load_all(&self) -> Result<Vec<Flow>, FlowError> {
        if !self.path.exists() {
            log::debug!("Flow store {} does not exist yet", self.path.display());
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        if content.trim().is_empty() {
            log::warn!("Flow store {} is empty, treating as no flows", self.path.display());
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save_all(&self, flows: &[Flow]) -> Result<(), FlowError> {
        let json = serde_json::to_string_pretty(flows)?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))?;
        log::debug!("Saved {} flow(s) to {}", flows.len(), self.path.display());
        Ok(())
    }
}

/// An in-process store, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    flows: Mutex<Vec<Flow>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlowStore for MemoryStore {
    fn load_all(&self) -> Result<Vec<Flow>, FlowError> {
        Ok(self
            .flows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save_all(&self, flows: &[Flow]) -> Result<(), FlowError> {
        *self.flows.lock().unwrap_or_else(PoisonError::into_inner) = flows.to_vec();
        Ok(())
    }
}
