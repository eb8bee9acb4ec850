use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Entry, EntryChanges, Glossary, NewEntry, NewGlossary, User, UserIdentity, ROLE_USER,
};
use crate::database::repository::GlossaryStore;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    glossaries: Vec<Glossary>,
    entries: Vec<Entry>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-process store with the same semantics as `PgStore`. Contents are lost on drop.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_term(mut entries: Vec<Entry>) -> Vec<Entry> {
    // same order as `ORDER BY term, id`
    entries.sort_by(|a, b| a.term.cmp(&b.term).then(a.id.cmp(&b.id)));
    entries
}

#[async_trait]
impl GlossaryStore for MemoryStore {
    async fn upsert_user(&self, identity: &UserIdentity) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();

        if let Some(user) = tables.users.iter_mut().find(|u| u.open_id == identity.open_id) {
            if identity.name.is_some() {
                user.name = identity.name.clone();
            }
            if identity.email.is_some() {
                user.email = identity.email.clone();
            }
            if identity.login_method.is_some() {
                user.login_method = identity.login_method.clone();
            }
            user.last_signed_in = now;
            user.updated_at = now;
            return Ok(user.clone());
        }

        let user = User {
            id: tables.next_id(),
            open_id: identity.open_id.clone(),
            name: identity.name.clone(),
            email: identity.email.clone(),
            login_method: identity.login_method.clone(),
            role: ROLE_USER.to_string(),
            created_at: now,
            updated_at: now,
            last_signed_in: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn list_glossaries(&self, user_id: i64) -> Result<Vec<Glossary>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .glossaries
            .iter()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_glossary(&self, glossary: NewGlossary) -> Result<Glossary, DatabaseError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let row = Glossary {
            id: tables.next_id(),
            user_id: glossary.user_id,
            title: glossary.title,
            description: glossary.description,
            created_at: now,
            updated_at: now,
        };
        tables.glossaries.push(row.clone());
        Ok(row)
    }

    async fn find_glossary(&self, glossary_id: i64) -> Result<Option<Glossary>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.glossaries.iter().find(|g| g.id == glossary_id).cloned())
    }

    async fn list_entries(&self, glossary_id: i64) -> Result<Vec<Entry>, DatabaseError> {
        let tables = self.tables.read().await;
        let rows = tables
            .entries
            .iter()
            .filter(|e| e.glossary_id == glossary_id)
            .cloned()
            .collect();
        Ok(sorted_by_term(rows))
    }

    async fn search_entries(&self, glossary_id: i64, needle: &str) -> Result<Vec<Entry>, DatabaseError> {
        let needle = needle.to_lowercase();
        let tables = self.tables.read().await;
        let rows = tables
            .entries
            .iter()
            .filter(|e| e.glossary_id == glossary_id)
            .filter(|e| {
                e.term.to_lowercase().contains(&needle) || e.definition.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        Ok(sorted_by_term(rows))
    }

    async fn create_entry(&self, entry: NewEntry) -> Result<Entry, DatabaseError> {
        let mut tables = self.tables.write().await;
        // mirrors the foreign key on entries.glossary_id
        if !tables.glossaries.iter().any(|g| g.id == entry.glossary_id) {
            return Err(DatabaseError::NotFound(format!("glossary {}", entry.glossary_id)));
        }
        let now = Utc::now();
        let row = Entry {
            id: tables.next_id(),
            glossary_id: entry.glossary_id,
            term: entry.term,
            definition: entry.definition,
            image_url: entry.image_url,
            created_at: now,
            updated_at: now,
        };
        tables.entries.push(row.clone());
        Ok(row)
    }

    async fn find_entry(&self, entry_id: i64) -> Result<Option<Entry>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.entries.iter().find(|e| e.id == entry_id).cloned())
    }

    async fn update_entry(&self, entry_id: i64, changes: EntryChanges) -> Result<Option<Entry>, DatabaseError> {
        let mut tables = self.tables.write().await;
        let Some(entry) = tables.entries.iter_mut().find(|e| e.id == entry_id) else {
            return Ok(None);
        };
        if !changes.is_empty() {
            changes.apply_to(entry);
            entry.updated_at = Utc::now();
        }
        Ok(Some(entry.clone()))
    }

    async fn delete_entry(&self, entry_id: i64) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.entries.len();
        tables.entries.retain(|e| e.id != entry_id);
        Ok(tables.entries.len() < before)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
