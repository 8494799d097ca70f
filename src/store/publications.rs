use async_trait::async_trait;
use chrono::SecondsFormat;
use rusqlite::params;
use std::sync::Arc;

use crate::db::models::Publication;
use crate::state::DbPool;
use crate::store::StoreError;

/// Publication collection. `all` lists newest first; `by_creator` feeds
/// the profile-snapshot fan-out.
#[async_trait]
pub trait PublicationStore: Send + Sync {
    async fn create(&self, publication: &Publication) -> Result<(), StoreError>;

    async fn get(&self, id: &str) -> Result<Option<Publication>, StoreError>;

    async fn all(&self) -> Result<Vec<Publication>, StoreError>;

    async fn by_creator(&self, creator_id: &str) -> Result<Vec<Publication>, StoreError>;

    async fn update(&self, publication: &Publication) -> Result<(), StoreError>;

    /// Returns false when nothing matched the id.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

/// Type alias for Arc-wrapped store (for AppState)
pub type DynPublicationStore = Arc<dyn PublicationStore>;

pub struct SqlitePublicationStore {
    pool: DbPool,
}

impl SqlitePublicationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn parse_rows(docs: Vec<String>) -> Result<Vec<Publication>, StoreError> {
        let mut publications = Vec::with_capacity(docs.len());
        for json in docs {
            publications.push(serde_json::from_str(&json)?);
        }
        Ok(publications)
    }
}

#[async_trait]
impl PublicationStore for SqlitePublicationStore {
    async fn create(&self, publication: &Publication) -> Result<(), StoreError> {
        let conn = self.pool.get()?;

        let doc_json = serde_json::to_string(publication)?;
        conn.execute(
            "INSERT INTO publications (id, creator_id, doc_json, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                publication.id,
                publication.creator.identifier,
                doc_json,
                publication
                    .created_at
                    .to_rfc3339_opts(SecondsFormat::Micros, true)
            ],
        )?;

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Publication>, StoreError> {
        let conn = self.pool.get()?;

        let result: Result<String, rusqlite::Error> = conn.query_row(
            "SELECT doc_json FROM publications WHERE id = ?1",
            params![id],
            |row| row.get(0),
        );

        match result {
            Ok(json) => {
                let publication: Publication = serde_json::from_str(&json)?;
                Ok(Some(publication))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn all(&self) -> Result<Vec<Publication>, StoreError> {
        let conn = self.pool.get()?;

        let mut stmt =
            conn.prepare("SELECT doc_json FROM publications ORDER BY created_at DESC")?;
        let docs: Vec<String> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Self::parse_rows(docs)
    }

    async fn by_creator(&self, creator_id: &str) -> Result<Vec<Publication>, StoreError> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT doc_json FROM publications WHERE creator_id = ?1 ORDER BY created_at DESC",
        )?;
        let docs: Vec<String> = stmt
            .query_map(params![creator_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Self::parse_rows(docs)
    }

    async fn update(&self, publication: &Publication) -> Result<(), StoreError> {
        let conn = self.pool.get()?;

        let doc_json = serde_json::to_string(publication)?;
        conn.execute(
            "UPDATE publications SET doc_json = ?2 WHERE id = ?1",
            params![publication.id, doc_json],
        )?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let conn = self.pool.get()?;

        let rows = conn.execute("DELETE FROM publications WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}
