use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::users::{
    repo::{StoreError, UserStore},
    repo_types::{NewUser, User},
};

/// `UserStore` backed by a vector, with the same uniqueness rules as the table.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.read().await.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == new.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            password_hash: new.password_hash,
            role: new.role,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.id != user.id && u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let Some(slot) = users.iter_mut().find(|u| u.id == user.id) else {
            return Ok(None);
        };
        slot.email = user.email.clone();
        slot.first_name = user.first_name.clone();
        slot.last_name = user.last_name.clone();
        slot.password_hash = user.password_hash.clone();
        slot.role = user.role;
        slot.updated_at = OffsetDateTime::now_utc();
        Ok(Some(slot.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo_types::Role;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.into(),
            first_name: "A".into(),
            last_name: "B".into(),
            password_hash: "hash".into(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_email() {
        let store = InMemoryUserStore::new();
        store.insert(new_user("a@x.com")).await.unwrap();
        let err = store.insert(new_user("a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_keeps_created_at_and_refreshes_updated_at() {
        let store = InMemoryUserStore::new();
        let mut user = store.insert(new_user("a@x.com")).await.unwrap();
        user.first_name = "Z".into();
        let updated = store.update(&user).await.unwrap().expect("row exists");
        assert_eq!(updated.first_name, "Z");
        assert_eq!(updated.created_at, user.created_at);
        assert!(updated.updated_at >= user.updated_at);
    }

    #[tokio::test]
    async fn update_missing_row_returns_none() {
        let store = InMemoryUserStore::new();
        let user = store.insert(new_user("a@x.com")).await.unwrap();
        assert!(store.delete(user.id).await.unwrap());
        assert!(store.update(&user).await.unwrap().is_none());
        assert!(!store.delete(user.id).await.unwrap());
    }
}
