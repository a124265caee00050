//! Repository credentials for deploys.
//!
//! Token, owner and repository name are persisted as three separate slots
//! and default to empty strings. They are stored in plain text.

use crate::kv::{KeyValueStore, KvError, keys};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployCredentials {
    pub token: String,
    pub owner: String,
    pub repo: String,
}

impl DeployCredentials {
    pub fn load(kv: &dyn KeyValueStore) -> Self {
        Self {
            token: kv.get(keys::GIT_TOKEN).unwrap_or_default(),
            owner: kv.get(keys::GIT_OWNER).unwrap_or_default(),
            repo: kv.get(keys::GIT_REPO).unwrap_or_default(),
        }
    }

    pub fn save(&self, kv: &dyn KeyValueStore) -> Result<(), KvError> {
        kv.set(keys::GIT_TOKEN, &self.token)?;
        kv.set(keys::GIT_REPO, &self.repo)?;
        kv.set(keys::GIT_OWNER, &self.owner)?;
        Ok(())
    }

    /// Replace stored values with any that were given explicitly.
    pub fn with_overrides(
        mut self,
        token: Option<String>,
        owner: Option<String>,
        repo: Option<String>,
    ) -> Self {
        if let Some(token) = token {
            self.token = token;
        }
        if let Some(owner) = owner {
            self.owner = owner;
        }
        if let Some(repo) = repo {
            self.repo = repo;
        }
        self
    }

    /// Names of the fields that are still empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("token", &self.token),
            ("owner", &self.owner),
            ("repo", &self.repo),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}
