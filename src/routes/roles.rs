use axum::{Json, Router, extract::State, routing::get};

use crate::{
    error::AppResult, models::Role, response::ApiResponse, services::user_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_roles))
}

#[utoipa::path(
    get,
    path = "/api/roles",
    responses(
        (status = 200, description = "Role vocabulary", body = ApiResponse<Vec<Role>>)
    ),
    tag = "Roles"
)]
pub async fn list_roles(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Role>>>> {
    let roles = user_service::list_roles(&state).await?;
    Ok(Json(ApiResponse::ok(roles)))
}
