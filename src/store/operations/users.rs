use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Store {
    pub fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let key = keys::user_key(&user.email);

        // Insert only if absent so two concurrent registrations cannot both succeed.
        let cas_result = self
            .users
            .compare_and_swap(key.as_bytes(), None::<&[u8]>, Some(Self::serialize(user)?))?;

        if cas_result.is_err() {
            return Err(StoreError::Conflict {
                entity: "user".to_string(),
                key,
            });
        }
        Ok(())
    }

    pub fn get_user(&self, email: &str) -> Result<Option<User>, StoreError> {
        let key = keys::user_key(email);
        match self.users.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn set_user_active(&self, email: &str, is_active: bool) -> Result<User, StoreError> {
        let mut user = self.get_user(email)?.ok_or_else(|| StoreError::NotFound {
            entity: "user".to_string(),
            key: keys::user_key(email),
        })?;
        user.is_active = is_active;
        self.users
            .insert(keys::user_key(email).as_bytes(), Self::serialize(&user)?)?;
        Ok(user)
    }
}
