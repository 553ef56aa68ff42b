pub mod keys;
pub mod kv;
pub mod operations;
pub mod trees;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Db;
use thiserror::Error;

use crate::clock::{Clock, SystemClock};

pub struct Store {
    db: Db,
    clock: Arc<dyn Clock>,
    pub counters: sled::Tree,
    pub users: sled::Tree,
    pub projects: sled::Tree,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("counters", &self.counters.len())
            .field("users", &self.users.len())
            .field("projects", &self.projects.len())
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("not found: entity={entity}, key={key}")]
    NotFound { entity: String, key: String },
    #[error("conflict: entity={entity}, key={key}")]
    Conflict { entity: String, key: String },
    #[error("validation error: {0}")]
    Validation(String),
}

impl Store {
    pub fn open(sled_path: &str) -> Result<Self, StoreError> {
        Self::open_with_clock(sled_path, Arc::new(SystemClock))
    }

    pub fn open_with_clock(sled_path: &str, clock: Arc<dyn Clock>) -> Result<Self, StoreError> {
        let db = sled::open(sled_path)?;
        let counters = db.open_tree(trees::COUNTERS)?;
        let users = db.open_tree(trees::USERS)?;
        let projects = db.open_tree(trees::PROJECTS)?;

        Ok(Self {
            db,
            clock,
            counters,
            users,
            projects,
        })
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    pub(crate) fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec(value)?)
    }

    pub(crate) fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
