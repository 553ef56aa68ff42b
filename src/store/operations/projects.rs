use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

/// A tracked site or app owned by a user. `key` is the resource key events are recorded under.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub key: String,
    pub name: String,
    pub image: String,
    pub date: DateTime<Utc>,
    pub user_email: String,
}

impl Store {
    /// Attach a project to an existing user. The owner must exist and the key must be new for that owner.
    pub fn create_project(&self, project: &Project) -> Result<(), StoreError> {
        if self.get_user(&project.user_email)?.is_none() {
            return Err(StoreError::NotFound {
                entity: "user".to_string(),
                key: keys::user_key(&project.user_email),
            });
        }

        let key = keys::project_key(&project.user_email, &project.key);
        let cas_result = self.projects.compare_and_swap(
            key.as_bytes(),
            None::<&[u8]>,
            Some(Self::serialize(project)?),
        )?;

        if cas_result.is_err() {
            return Err(StoreError::Conflict {
                entity: "project".to_string(),
                key: project.key.clone(),
            });
        }
        Ok(())
    }

    pub fn list_user_projects(&self, email: &str) -> Result<Vec<Project>, StoreError> {
        let prefix = keys::project_prefix(email);
        let mut projects = Vec::new();
        for item in self.projects.scan_prefix(prefix.as_bytes()) {
            let (_, v) = item?;
            projects.push(Self::deserialize::<Project>(&v)?);
        }
        projects.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(projects)
    }
}
