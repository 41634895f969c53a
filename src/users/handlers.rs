use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::AppError,
    extract::{AppJson, AppPath},
    state::AppState,
    users::{
        dto::{
            CreateUserRequest, DeleteResponse, PatchUserRequest, ReplaceUserRequest,
            UserResponse,
        },
        services,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/", get(list_users).post(create_user))
        .route(
            "/user/:id/",
            get(get_user)
                .put(replace_user)
                .patch(patch_user)
                .delete(delete_user),
        )
}

#[instrument(skip(state, caller), fields(caller = %caller.0.id))]
pub async fn list_users(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = state.users.list_all().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[instrument(skip(state, caller, payload), fields(caller = %caller.0.id))]
pub async fn create_user(
    State(state): State<AppState>,
    caller: AuthUser,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = services::create_user(state.users.as_ref(), payload).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, caller), fields(caller = %caller.0.id))]
pub async fn get_user(
    State(state): State<AppState>,
    caller: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.users.find_by_id(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, caller), fields(caller = %caller.0.id))]
pub async fn delete_user(
    State(state): State<AppState>,
    caller: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<DeleteResponse>, AppError> {
    if !state.users.delete(id).await? {
        return Err(AppError::NotFound);
    }
    info!(user_id = %id, "user deleted");
    Ok(Json(DeleteResponse { success: true }))
}

#[instrument(skip(state, caller, payload), fields(caller = %caller.0.id))]
pub async fn replace_user(
    State(state): State<AppState>,
    caller: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<ReplaceUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = services::replace_user(state.users.as_ref(), id, payload).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, caller, payload), fields(caller = %caller.0.id))]
pub async fn patch_user(
    State(state): State<AppState>,
    caller: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<PatchUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = services::patch_user(state.users.as_ref(), id, payload).await?;
    Ok(Json(user.into()))
}
