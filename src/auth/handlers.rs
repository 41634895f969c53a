use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, TokenPair},
        jwt::JwtKeys,
        services::authenticate,
    },
    error::AppError,
    extract::AppJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login/", post(login))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let keys = JwtKeys::from_ref(&state);
    let pair = authenticate(state.users.as_ref(), &keys, &payload.email, &payload.password).await?;
    Ok(Json(pair))
}
