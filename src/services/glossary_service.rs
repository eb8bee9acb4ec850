use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::StorageConfig;
use crate::database::models::{Entry, EntryChanges, Glossary, NewEntry, NewGlossary, User, UserIdentity};
use crate::database::repository::GlossaryStore;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::organizer::{OrganizedEntries, ViewState};
use crate::services::validation::{self, Validator};
use crate::storage::ObjectStorage;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateGlossaryInput {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryInput {
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub definition: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryInput {
    pub term: Option<String>,
    pub definition: Option<String>,
    /// Blank clears the image
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageInput {
    #[serde(default)]
    pub file_name: String,
    /// Base64 file contents
    #[serde(default)]
    pub file_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub url: String,
    pub key: String,
}

/// Where and how large uploaded images may be
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub key_prefix: String,
    pub max_bytes: usize,
}

impl From<&StorageConfig> for UploadPolicy {
    fn from(config: &StorageConfig) -> Self {
        Self {
            key_prefix: config.key_prefix.trim_matches('/').to_string(),
            max_bytes: config.max_upload_bytes,
        }
    }
}

/// The glossary procedures. Each call names its caller explicitly.
///
/// Glossaries and entries belonging to another user are treated exactly like
/// missing ones: reads come back empty, writes fail with not-found.
pub struct GlossaryService {
    store: Arc<dyn GlossaryStore>,
    storage: Arc<dyn ObjectStorage>,
    uploads: UploadPolicy,
}

impl GlossaryService {
    pub fn new(store: Arc<dyn GlossaryStore>, storage: Arc<dyn ObjectStorage>, uploads: UploadPolicy) -> Self {
        Self { store, storage, uploads }
    }

    /// Registers or refreshes the user behind a session
    pub async fn sign_in(&self, identity: &UserIdentity) -> Result<User, ApiError> {
        Ok(self.store.upsert_user(identity).await?)
    }

    pub async fn health_check(&self) -> Result<(), ApiError> {
        Ok(self.store.health_check().await?)
    }

    // ---------------------------------------------------------------------
    // glossaries
    // ---------------------------------------------------------------------

    pub async fn list_glossaries(&self, caller: &AuthUser) -> Result<Vec<Glossary>, ApiError> {
        Ok(self.store.list_glossaries(caller.id).await?)
    }

    pub async fn create_glossary(&self, caller: &AuthUser, input: CreateGlossaryInput) -> Result<Glossary, ApiError> {
        let mut v = Validator::new();
        let title = v.check("title", validation::title(&input.title));
        v.finish()?;

        let glossary = self
            .store
            .create_glossary(NewGlossary {
                user_id: caller.id,
                title: title.unwrap_or_default(),
                description: validation::description(input.description.as_deref()),
            })
            .await?;

        tracing::info!("User {} created glossary {} ({})", caller.id, glossary.id, glossary.title);
        Ok(glossary)
    }

    pub async fn get_glossary(&self, caller: &AuthUser, glossary_id: i64) -> Result<Option<Glossary>, ApiError> {
        Ok(self
            .store
            .find_glossary(glossary_id)
            .await?
            .filter(|g| g.user_id == caller.id))
    }

    async fn require_glossary(&self, caller: &AuthUser, glossary_id: i64) -> Result<Glossary, ApiError> {
        self.get_glossary(caller, glossary_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Glossary {} not found", glossary_id)))
    }

    // ---------------------------------------------------------------------
    // entries
    // ---------------------------------------------------------------------

    pub async fn list_entries(&self, caller: &AuthUser, glossary_id: i64) -> Result<Vec<Entry>, ApiError> {
        if self.get_glossary(caller, glossary_id).await?.is_none() {
            return Ok(Vec::new());
        }
        Ok(self.store.list_entries(glossary_id).await?)
    }

    /// Blank search terms match nothing and never reach the store.
    /// Any other term is matched as given, surrounding spaces included.
    pub async fn search_entries(
        &self,
        caller: &AuthUser,
        glossary_id: i64,
        search_term: &str,
    ) -> Result<Vec<Entry>, ApiError> {
        if search_term.trim().is_empty() {
            return Ok(Vec::new());
        }
        if self.get_glossary(caller, glossary_id).await?.is_none() {
            return Ok(Vec::new());
        }
        Ok(self.store.search_entries(glossary_id, search_term).await?)
    }

    pub async fn create_entry(
        &self,
        caller: &AuthUser,
        glossary_id: i64,
        input: CreateEntryInput,
    ) -> Result<Entry, ApiError> {
        let mut v = Validator::new();
        let term = v.check("term", validation::term(&input.term));
        let definition = v.check("definition", validation::definition(&input.definition));
        let image_url = v.check("imageUrl", validation::image_url(input.image_url.as_deref()));
        v.finish()?;

        self.require_glossary(caller, glossary_id).await?;

        let entry = self
            .store
            .create_entry(NewEntry {
                glossary_id,
                term: term.unwrap_or_default(),
                definition: definition.unwrap_or_default(),
                image_url: image_url.flatten(),
            })
            .await?;

        tracing::info!("Created entry {} '{}' in glossary {}", entry.id, entry.term, glossary_id);
        Ok(entry)
    }

    pub async fn get_entry(&self, caller: &AuthUser, entry_id: i64) -> Result<Option<Entry>, ApiError> {
        let Some(entry) = self.store.find_entry(entry_id).await? else {
            return Ok(None);
        };
        if self.get_glossary(caller, entry.glossary_id).await?.is_none() {
            return Ok(None);
        }
        Ok(Some(entry))
    }

    async fn require_entry(&self, caller: &AuthUser, entry_id: i64) -> Result<Entry, ApiError> {
        self.get_entry(caller, entry_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Entry {} not found", entry_id)))
    }

    pub async fn update_entry(
        &self,
        caller: &AuthUser,
        entry_id: i64,
        input: UpdateEntryInput,
    ) -> Result<Entry, ApiError> {
        let mut v = Validator::new();
        let term = input.term.as_deref().and_then(|t| v.check("term", validation::term(t)));
        let definition = input
            .definition
            .as_deref()
            .and_then(|d| v.check("definition", validation::definition(d)));
        let image_url = match input.image_url.as_deref() {
            Some(url) => v.check("imageUrl", validation::image_url(Some(url))),
            None => None,
        };
        v.finish()?;

        self.require_entry(caller, entry_id).await?;

        let changes = EntryChanges { term, definition, image_url };
        let entry = self
            .store
            .update_entry(entry_id, changes)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Entry {} not found", entry_id)))?;

        tracing::info!("Updated entry {}", entry_id);
        Ok(entry)
    }

    pub async fn delete_entry(&self, caller: &AuthUser, entry_id: i64) -> Result<(), ApiError> {
        self.require_entry(caller, entry_id).await?;

        if !self.store.delete_entry(entry_id).await? {
            return Err(ApiError::not_found(format!("Entry {} not found", entry_id)));
        }

        tracing::info!("Deleted entry {}", entry_id);
        Ok(())
    }

    /// Decodes the image and stores it under `{prefix}/{user}/{millis}-{file}`
    pub async fn upload_image(&self, caller: &AuthUser, input: UploadImageInput) -> Result<UploadedImage, ApiError> {
        let mut v = Validator::new();
        let file_name = v.check("fileName", validation::file_name(&input.file_name));
        let bytes = v.check("fileData", validation::image_data(&input.file_data, self.uploads.max_bytes));
        v.finish()?;

        let (Some(file_name), Some(bytes)) = (file_name, bytes) else {
            return Err(ApiError::validation_error("Invalid input", None));
        };

        let key = image_key(&self.uploads.key_prefix, caller.id, Utc::now().timestamp_millis(), &file_name);
        let size = bytes.len();
        let stored = self
            .storage
            .put(&key, bytes, validation::content_type_for(&file_name))
            .await?;

        tracing::info!("User {} uploaded {} bytes to {}", caller.id, size, stored.key);
        Ok(UploadedImage { url: stored.url, key: stored.key })
    }

    // ---------------------------------------------------------------------
    // organized view
    // ---------------------------------------------------------------------

    /// Entries of a glossary as the browsing view shows them
    pub async fn organize_entries(
        &self,
        caller: &AuthUser,
        glossary_id: i64,
        view: &ViewState,
    ) -> Result<OrganizedEntries, ApiError> {
        let all = self.list_entries(caller, glossary_id).await?;
        let results = if view.is_searching() {
            self.search_entries(caller, glossary_id, &view.search_term).await?
        } else {
            Vec::new()
        };
        Ok(view.organize(&all, &results))
    }
}

pub fn image_key(prefix: &str, user_id: i64, millis: i64, file_name: &str) -> String {
    if prefix.is_empty() {
        format!("{}/{}-{}", user_id, millis, file_name)
    } else {
        format!("{}/{}/{}-{}", prefix, user_id, millis, file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_keys_are_namespaced_by_user_and_time() {
        assert_eq!(image_key("glossaire", 7, 1700000000000, "a.png"), "glossaire/7/1700000000000-a.png");
        assert_eq!(image_key("", 7, 1, "a.png"), "7/1-a.png");
    }

    #[test]
    fn upload_policy_trims_prefix_slashes() {
        let mut config = crate::config::AppConfig::development().storage;
        config.key_prefix = "/images/".into();
        assert_eq!(UploadPolicy::from(&config).key_prefix, "images");
    }
}
