use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    Entry, EntryChanges, Glossary, NewEntry, NewGlossary, User, UserIdentity,
};

/// Persistence access for users, glossaries and entries.
///
/// Implementations return plain records; ownership and input validation live in
/// the service layer. Reads of a missing id yield `None` rather than an error.
#[async_trait]
pub trait GlossaryStore: Send + Sync {
    /// Insert the user on first sight, otherwise refresh profile and last sign-in
    async fn upsert_user(&self, identity: &UserIdentity) -> Result<User, DatabaseError>;

    async fn list_glossaries(&self, user_id: i64) -> Result<Vec<Glossary>, DatabaseError>;
    async fn create_glossary(&self, glossary: NewGlossary) -> Result<Glossary, DatabaseError>;
    async fn find_glossary(&self, glossary_id: i64) -> Result<Option<Glossary>, DatabaseError>;

    /// Entries of one glossary, ordered by term then id
    async fn list_entries(&self, glossary_id: i64) -> Result<Vec<Entry>, DatabaseError>;
    /// Case-insensitive substring match on term or definition
    async fn search_entries(&self, glossary_id: i64, needle: &str) -> Result<Vec<Entry>, DatabaseError>;
    async fn create_entry(&self, entry: NewEntry) -> Result<Entry, DatabaseError>;
    async fn find_entry(&self, entry_id: i64) -> Result<Option<Entry>, DatabaseError>;
    async fn update_entry(&self, entry_id: i64, changes: EntryChanges) -> Result<Option<Entry>, DatabaseError>;
    /// Returns false when nothing was deleted
    async fn delete_entry(&self, entry_id: i64) -> Result<bool, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

const USER_COLUMNS: &str =
    "id, open_id, name, email, login_method, role, created_at, updated_at, last_signed_in";
const GLOSSARY_COLUMNS: &str = "id, user_id, title, description, created_at, updated_at";
const ENTRY_COLUMNS: &str =
    "id, glossary_id, term, definition, image_url, created_at, updated_at";

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GlossaryStore for PgStore {
    async fn upsert_user(&self, identity: &UserIdentity) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (open_id, name, email, login_method)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (open_id) DO UPDATE SET
                name = COALESCE(EXCLUDED.name, users.name),
                email = COALESCE(EXCLUDED.email, users.email),
                login_method = COALESCE(EXCLUDED.login_method, users.login_method),
                last_signed_in = NOW(),
                updated_at = NOW()
             RETURNING {USER_COLUMNS}"
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&identity.open_id)
            .bind(&identity.name)
            .bind(&identity.email)
            .bind(&identity.login_method)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    async fn list_glossaries(&self, user_id: i64) -> Result<Vec<Glossary>, DatabaseError> {
        let sql = format!("SELECT {GLOSSARY_COLUMNS} FROM glossaries WHERE user_id = $1 ORDER BY id");
        let rows = sqlx::query_as::<_, Glossary>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn create_glossary(&self, glossary: NewGlossary) -> Result<Glossary, DatabaseError> {
        let sql = format!(
            "INSERT INTO glossaries (user_id, title, description) VALUES ($1, $2, $3)
             RETURNING {GLOSSARY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Glossary>(&sql)
            .bind(glossary.user_id)
            .bind(&glossary.title)
            .bind(&glossary.description)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_glossary(&self, glossary_id: i64) -> Result<Option<Glossary>, DatabaseError> {
        let sql = format!("SELECT {GLOSSARY_COLUMNS} FROM glossaries WHERE id = $1");
        let row = sqlx::query_as::<_, Glossary>(&sql)
            .bind(glossary_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_entries(&self, glossary_id: i64) -> Result<Vec<Entry>, DatabaseError> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE glossary_id = $1 ORDER BY term, id"
        );
        let rows = sqlx::query_as::<_, Entry>(&sql)
            .bind(glossary_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn search_entries(&self, glossary_id: i64, needle: &str) -> Result<Vec<Entry>, DatabaseError> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM entries
             WHERE glossary_id = $1 AND (term ILIKE $2 OR definition ILIKE $2)
             ORDER BY term, id"
        );
        let rows = sqlx::query_as::<_, Entry>(&sql)
            .bind(glossary_id)
            .bind(like_pattern(needle))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn create_entry(&self, entry: NewEntry) -> Result<Entry, DatabaseError> {
        let sql = format!(
            "INSERT INTO entries (glossary_id, term, definition, image_url) VALUES ($1, $2, $3, $4)
             RETURNING {ENTRY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Entry>(&sql)
            .bind(entry.glossary_id)
            .bind(&entry.term)
            .bind(&entry.definition)
            .bind(&entry.image_url)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_entry(&self, entry_id: i64) -> Result<Option<Entry>, DatabaseError> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = $1");
        let row = sqlx::query_as::<_, Entry>(&sql)
            .bind(entry_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_entry(&self, entry_id: i64, changes: EntryChanges) -> Result<Option<Entry>, DatabaseError> {
        if changes.is_empty() {
            return self.find_entry(entry_id).await;
        }

        // $4 flags whether image_url was supplied at all, since NULL is a valid new value
        let sql = format!(
            "UPDATE entries SET
                term = COALESCE($2, term),
                definition = COALESCE($3, definition),
                image_url = CASE WHEN $4 THEN $5 ELSE image_url END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {ENTRY_COLUMNS}"
        );
        let image_supplied = changes.image_url.is_some();
        let image_url = changes.image_url.flatten();

        let row = sqlx::query_as::<_, Entry>(&sql)
            .bind(entry_id)
            .bind(&changes.term)
            .bind(&changes.definition)
            .bind(image_supplied)
            .bind(&image_url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_entry(&self, entry_id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM entries WHERE id = $1")
            .bind(entry_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

/// `%needle%` with LIKE metacharacters escaped (backslash is the default escape)
pub fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
