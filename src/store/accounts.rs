use async_trait::async_trait;
use chrono::SecondsFormat;
use rusqlite::params;
use std::sync::Arc;

use crate::db::models::Account;
use crate::state::DbPool;
use crate::store::StoreError;

/// Account collection - lookup by id or email, create, update in place.
/// Accounts are never deleted.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create(&self, account: &Account) -> Result<(), StoreError>;

    async fn get(&self, id: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn all(&self) -> Result<Vec<Account>, StoreError>;

    async fn update(&self, account: &Account) -> Result<(), StoreError>;
}

/// Type alias for Arc-wrapped store (for AppState)
pub type DynAccountStore = Arc<dyn AccountStore>;

pub struct SqliteAccountStore {
    pool: DbPool,
}

impl SqliteAccountStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for SqliteAccountStore {
    async fn create(&self, account: &Account) -> Result<(), StoreError> {
        let conn = self.pool.get()?;

        let doc_json = serde_json::to_string(account)?;
        let result = conn.execute(
            "INSERT INTO accounts (id, email, doc_json, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                account.id,
                account.email,
                doc_json,
                account
                    .created_at
                    .to_rfc3339_opts(SecondsFormat::Micros, true)
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, Some(msg)))
                if e.code == rusqlite::ErrorCode::ConstraintViolation
                    && msg.contains("accounts.email") =>
            {
                Err(StoreError::DuplicateEmail)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, id: &str) -> Result<Option<Account>, StoreError> {
        let conn = self.pool.get()?;

        let result: Result<String, rusqlite::Error> = conn.query_row(
            "SELECT doc_json FROM accounts WHERE id = ?1",
            params![id],
            |row| row.get(0),
        );

        match result {
            Ok(json) => {
                let account: Account = serde_json::from_str(&json)?;
                Ok(Some(account))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let conn = self.pool.get()?;

        let result: Result<String, rusqlite::Error> = conn.query_row(
            "SELECT doc_json FROM accounts WHERE email = ?1",
            params![email],
            |row| row.get(0),
        );

        match result {
            Ok(json) => {
                let account: Account = serde_json::from_str(&json)?;
                Ok(Some(account))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn all(&self) -> Result<Vec<Account>, StoreError> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare("SELECT doc_json FROM accounts ORDER BY created_at")?;
        let docs: Vec<String> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut accounts = Vec::with_capacity(docs.len());
        for json in docs {
            accounts.push(serde_json::from_str(&json)?);
        }
        Ok(accounts)
    }

    async fn update(&self, account: &Account) -> Result<(), StoreError> {
        let conn = self.pool.get()?;

        let doc_json = serde_json::to_string(account)?;
        conn.execute(
            "UPDATE accounts SET doc_json = ?2 WHERE id = ?1",
            params![account.id, doc_json],
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::Utc;
    use tempfile::TempDir;

    fn create_test_store() -> (SqliteAccountStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let pool = db::create_pool(&db_path).unwrap();
        db::run_migrations(&pool).unwrap();

        (SqliteAccountStore::new(pool), temp_dir)
    }

    fn test_account(name: &str, email: &str) -> Account {
        Account {
            id: uuid::Uuid::now_v7().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: "$2b$04$not.a.real.hash".to_string(),
            profile_image: None,
            banner_image: None,
            friends: vec![],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_and_get_roundtrip() {
        let (store, _temp) = create_test_store();

        let account = test_account("Ana", "ana@example.com");
        store.create(&account).await.unwrap();

        let loaded = store.get(&account.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, account.id);
        assert_eq!(loaded.name, "Ana");
        assert_eq!(loaded.email, "ana@example.com");
        assert!(loaded.friends.is_empty());
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let (store, _temp) = create_test_store();

        let loaded = store.get("no-such-id").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (store, _temp) = create_test_store();

        store
            .create(&test_account("Ana", "ana@example.com"))
            .await
            .unwrap();

        let result = store.create(&test_account("Other", "ana@example.com")).await;
        assert!(matches!(result, Err(StoreError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn find_by_email() {
        let (store, _temp) = create_test_store();

        let account = test_account("Ana", "ana@example.com");
        store.create(&account).await.unwrap();

        let found = store.find_by_email("ana@example.com").await.unwrap();
        assert_eq!(found.unwrap().id, account.id);

        let missing = store.find_by_email("nadie@example.com").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn update_persists_mutations() {
        let (store, _temp) = create_test_store();

        let mut account = test_account("Ana", "ana@example.com");
        store.create(&account).await.unwrap();

        account.profile_image = Some("images/ana.png".to_string());
        store.update(&account).await.unwrap();

        let loaded = store.get(&account.id).await.unwrap().unwrap();
        assert_eq!(loaded.profile_image.as_deref(), Some("images/ana.png"));
    }

    #[tokio::test]
    async fn all_returns_every_account() {
        let (store, _temp) = create_test_store();

        store
            .create(&test_account("Ana", "ana@example.com"))
            .await
            .unwrap();
        store
            .create(&test_account("Beto", "beto@example.com"))
            .await
            .unwrap();

        let all = store.all().await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
