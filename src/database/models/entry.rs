use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A term and its Markdown definition inside one glossary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: i64,
    pub glossary_id: i64,
    pub term: String,
    pub definition: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEntry {
    pub glossary_id: i64,
    pub term: String,
    pub definition: String,
    pub image_url: Option<String>,
}

/// Partial update. `None` leaves the column untouched; `image_url: Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct EntryChanges {
    pub term: Option<String>,
    pub definition: Option<String>,
    pub image_url: Option<Option<String>>,
}

impl EntryChanges {
    pub fn is_empty(&self) -> bool {
        self.term.is_none() && self.definition.is_none() && self.image_url.is_none()
    }

    /// Applies the changes to an in-memory copy of the entry.
    pub fn apply_to(&self, entry: &mut Entry) {
        if let Some(term) = &self.term {
            entry.term = term.clone();
        }
        if let Some(definition) = &self.definition {
            entry.definition = definition.clone();
        }
        if let Some(image_url) = &self.image_url {
            entry.image_url = image_url.clone();
        }
    }
}
