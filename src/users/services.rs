use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::password::hash_password,
    config::AdminConfig,
    error::AppError,
    users::{
        dto::{CreateUserRequest, PatchUserRequest, ReplaceUserRequest},
        repo::UserStore,
        repo_types::{NewUser, Role, User},
    },
};

const NAME_MAX_LEN: usize = 50;
const EMAIL_MAX_LEN: usize = 254;

/// Trims the address and lowercases its domain part. The local part is
/// case-sensitive and kept as given.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Normalizes and checks an email, returning the stored form.
fn clean_email(raw: &str) -> Result<String, AppError> {
    let email = normalize_email(raw);
    if email.is_empty() {
        return Err(AppError::validation("The email must be set"));
    }
    if email.chars().count() > EMAIL_MAX_LEN {
        return Err(AppError::validation(format!(
            "email must be at most {EMAIL_MAX_LEN} characters"
        )));
    }
    if !is_valid_email(&email) {
        return Err(AppError::validation("Enter a valid email address"));
    }
    Ok(email)
}

fn check_name(field: &str, value: &str) -> Result<(), AppError> {
    if value.chars().count() > NAME_MAX_LEN {
        return Err(AppError::validation(format!(
            "{field} must be at most {NAME_MAX_LEN} characters"
        )));
    }
    Ok(())
}

fn hash_new_password(plain: &str) -> Result<String, AppError> {
    if plain.is_empty() {
        return Err(AppError::validation("Password must not be empty"));
    }
    Ok(hash_password(plain)?)
}

/// Rejects `email` if it belongs to someone other than `owner`.
async fn ensure_email_free(
    users: &dyn UserStore,
    email: &str,
    owner: Option<Uuid>,
) -> Result<(), AppError> {
    match users.find_by_email(email).await? {
        Some(existing) if Some(existing.id) != owner => {
            warn!(email = %email, "email already registered");
            Err(AppError::validation("User with this email already exists"))
        }
        _ => Ok(()),
    }
}

/// Validates the payload, hashes the password and stores the new user.
pub async fn create_user(
    users: &dyn UserStore,
    req: CreateUserRequest,
) -> Result<User, AppError> {
    let email = clean_email(&req.email)?;
    check_name("first_name", &req.first_name)?;
    check_name("last_name", &req.last_name)?;
    ensure_email_free(users, &email, None).await?;

    let password_hash = hash_new_password(&req.password)?;
    let user = users
        .insert(NewUser {
            email,
            first_name: req.first_name,
            last_name: req.last_name,
            password_hash,
            role: req.role,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, role = %user.role, "user created");
    Ok(user)
}

async fn load(users: &dyn UserStore, id: Uuid) -> Result<User, AppError> {
    users.find_by_id(id).await?.ok_or(AppError::NotFound)
}

async fn save(users: &dyn UserStore, user: &User) -> Result<User, AppError> {
    users.update(user).await?.ok_or(AppError::NotFound)
}

/// Full replace. The id and creation time are never touched.
pub async fn replace_user(
    users: &dyn UserStore,
    id: Uuid,
    req: ReplaceUserRequest,
) -> Result<User, AppError> {
    let mut user = load(users, id).await?;

    let email = clean_email(&req.email)?;
    check_name("first_name", &req.first_name)?;
    check_name("last_name", &req.last_name)?;
    ensure_email_free(users, &email, Some(id)).await?;

    user.email = email;
    user.first_name = req.first_name;
    user.last_name = req.last_name;
    user.role = req.role;
    if let Some(plain) = req.password.as_deref() {
        user.password_hash = hash_new_password(plain)?;
    }

    let user = save(users, &user).await?;
    info!(user_id = %user.id, "user replaced");
    Ok(user)
}

/// Partial update: only fields present in the payload are applied.
pub async fn patch_user(
    users: &dyn UserStore,
    id: Uuid,
    req: PatchUserRequest,
) -> Result<User, AppError> {
    let mut user = load(users, id).await?;

    if let Some(raw) = req.email.as_deref() {
        let email = clean_email(raw)?;
        ensure_email_free(users, &email, Some(id)).await?;
        user.email = email;
    }
    if let Some(first_name) = req.first_name {
        check_name("first_name", &first_name)?;
        user.first_name = first_name;
    }
    if let Some(last_name) = req.last_name {
        check_name("last_name", &last_name)?;
        user.last_name = last_name;
    }
    if let Some(role) = req.role {
        user.role = role;
    }
    if let Some(plain) = req.password.as_deref() {
        user.password_hash = hash_new_password(plain)?;
    }

    let user = save(users, &user).await?;
    info!(user_id = %user.id, "user patched");
    Ok(user)
}

/// Creates the configured admin account unless that email is already taken.
pub async fn ensure_admin(
    users: &dyn UserStore,
    admin: &AdminConfig,
) -> Result<Option<User>, AppError> {
    let email = clean_email(&admin.email)?;
    if users.find_by_email(&email).await?.is_some() {
        return Ok(None);
    }
    let user = create_user(
        users,
        CreateUserRequest {
            email,
            password: admin.password.clone(),
            first_name: admin.first_name.clone(),
            last_name: admin.last_name.clone(),
            role: Role::Admin,
        },
    )
    .await?;
    Ok(Some(user))
}
