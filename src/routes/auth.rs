use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::auth::{
        ForgotFinishRequest, ForgotStartRequest, ForgotStartResponse, LoginRequest, LoginResponse,
        OkResponse,
    },
    error::AppResult,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/forgot/start", post(forgot_start))
        .route("/forgot/finish", post(forgot_finish))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login user", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Blocked document")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let resp = auth_service::login(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/forgot/start",
    request_body = ForgotStartRequest,
    responses(
        (status = 200, description = "Reset code issued (when the account exists)", body = ForgotStartResponse)
    ),
    tag = "Auth"
)]
pub async fn forgot_start(
    State(state): State<AppState>,
    Json(payload): Json<ForgotStartRequest>,
) -> AppResult<Json<ForgotStartResponse>> {
    let resp = auth_service::forgot_start(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/forgot/finish",
    request_body = ForgotFinishRequest,
    responses(
        (status = 200, description = "Password replaced", body = OkResponse),
        (status = 400, description = "Expired or invalid code")
    ),
    tag = "Auth"
)]
pub async fn forgot_finish(
    State(state): State<AppState>,
    Json(payload): Json<ForgotFinishRequest>,
) -> AppResult<Json<OkResponse>> {
    let resp = auth_service::forgot_finish(&state, payload).await?;
    Ok(Json(resp))
}
