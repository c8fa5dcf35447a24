use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::premium::{PremiumConfirmRequest, PremiumConfirmResponse, PremiumStatus},
    error::AppResult,
    middleware::auth::AuthUser,
    services::premium_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/confirm", post(confirm))
        .route("/status", get(status))
}

#[utoipa::path(
    post,
    path = "/api/premium/confirm",
    request_body = PremiumConfirmRequest,
    responses(
        (status = 200, description = "Premium activated", body = PremiumConfirmResponse),
        (status = 400, description = "Missing hash or wrong amount")
    ),
    security(("bearer_auth" = [])),
    tag = "Premium"
)]
pub async fn confirm(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<PremiumConfirmRequest>,
) -> AppResult<Json<PremiumConfirmResponse>> {
    let resp = premium_service::confirm_payment(&state, &auth, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/premium/status",
    responses((status = 200, description = "Premium flag", body = PremiumStatus)),
    security(("bearer_auth" = [])),
    tag = "Premium"
)]
pub async fn status(auth: AuthUser) -> Json<PremiumStatus> {
    Json(premium_service::status(&auth).await)
}
