use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::users::repo_types::{NewUser, UnknownRole, User, UserRow};

const USER_COLUMNS: &str =
    "id, email, first_name, last_name, password_hash, role, created_at, updated_at";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("corrupt user row: {0}")]
    Corrupt(#[from] UnknownRole),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistence for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn insert(&self, new: NewUser) -> Result<User, StoreError>;
    /// Writes every mutable column of `user` and bumps `updated_at`.
    /// Returns `None` when the row no longer exists.
    async fn update(&self, user: &User) -> Result<Option<User>, StoreError>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_write_err(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateEmail,
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"
        ))
        .fetch_all(&self.db)
        .await?;
        rows.into_iter()
            .map(|r| User::try_from(r).map_err(StoreError::from))
            .collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(User::try_from).transpose()?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(User::try_from).transpose()?)
    }

    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, email, first_name, last_name, password_hash, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new.email)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.password_hash)
        .bind(new.role.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(map_write_err)?;
        Ok(User::try_from(row)?)
    }

    async fn update(&self, user: &User) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
               SET email = $2,
                   first_name = $3,
                   last_name = $4,
                   password_hash = $5,
                   role = $6,
                   updated_at = now()
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_optional(&self.db)
        .await
        .map_err(map_write_err)?;
        Ok(row.map(User::try_from).transpose()?)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo_types::Role;

    async fn pg_store() -> Option<PgUserStore> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let db = PgPool::connect(&url).await.expect("connect to DATABASE_URL");
        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .expect("run migrations");
        Some(PgUserStore::new(db))
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.into(),
            first_name: "A".into(),
            last_name: "B".into(),
            password_hash: "hash".into(),
            role: Role::User,
        }
    }

    // Needs a disposable Postgres: DATABASE_URL=... cargo test -- --ignored
    #[tokio::test]
    #[ignore]
    async fn unique_violation_maps_to_duplicate_email() {
        let Some(store) = pg_store().await else {
            return;
        };
        let email = format!("{}@x.com", Uuid::new_v4());

        let first = store.insert(new_user(&email)).await.expect("first insert");
        let err = store.insert(new_user(&email)).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));

        let other = store
            .insert(new_user(&format!("{}@x.com", Uuid::new_v4())))
            .await
            .expect("second user");
        let mut clash = other.clone();
        clash.email = email.clone();
        let err = store.update(&clash).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));

        assert!(store.delete(first.id).await.unwrap());
        assert!(store.delete(other.id).await.unwrap());
        assert!(store.find_by_id(first.id).await.unwrap().is_none());
    }
}
