use tracing::{info, warn};

use crate::{
    auth::{dto::TokenPair, jwt::JwtKeys, password::verify_password},
    error::AppError,
    users::{repo::UserStore, services::normalize_email},
};

/// Exchanges email + password for a token pair.
///
/// An unknown email is `NotFound`; a wrong password is a validation error
/// with "Invalid credentials".
pub async fn authenticate(
    users: &dyn UserStore,
    keys: &JwtKeys,
    email: &str,
    password: &str,
) -> Result<TokenPair, AppError> {
    let email = normalize_email(email);

    let user = users.find_by_email(&email).await?.ok_or_else(|| {
        warn!(email = %email, "login unknown email");
        AppError::NotFound
    })?;

    if !verify_password(password, &user.password_hash)? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(AppError::validation("Invalid credentials"));
    }

    let pair = keys.issue_pair(user.id)?;
    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(pair)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::password::hash_password,
        config::JwtConfig,
        users::{
            memory::InMemoryUserStore,
            repo_types::{NewUser, Role},
        },
    };

    fn keys() -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: "test".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 5,
            refresh_ttl_minutes: 60,
        })
    }

    async fn store_with(email: &str, password: &str) -> InMemoryUserStore {
        let store = InMemoryUserStore::new();
        store
            .insert(NewUser {
                email: email.into(),
                first_name: "A".into(),
                last_name: "B".into(),
                password_hash: hash_password(password).unwrap(),
                role: Role::User,
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn correct_password_yields_tokens_for_that_user() {
        let store = store_with("a@x.com", "pw1").await;
        let keys = keys();
        let pair = authenticate(&store, &keys, "a@x.com", "pw1").await.unwrap();
        let claims = keys.verify_access(&pair.access).unwrap();
        let user = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(claims.sub, user.id);
    }

    #[tokio::test]
    async fn email_lookup_is_normalized() {
        let store = store_with("a@x.com", "pw1").await;
        assert!(authenticate(&store, &keys(), "  a@X.COM ", "pw1").await.is_ok());
    }

    #[tokio::test]
    async fn wrong_password_is_validation_error() {
        let store = store_with("a@x.com", "pw1").await;
        let err = authenticate(&store, &keys(), "a@x.com", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Invalid credentials"));
    }

    #[tokio::test]
    async fn unknown_email_is_not_found() {
        let store = store_with("a@x.com", "pw1").await;
        let err = authenticate(&store, &keys(), "b@x.com", "pw1")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }
}
