use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::admin::{
        AdminOrder, AdminOrdersQuery, AdminUserQuery, DniBlockRequest, DniBlockResponse,
        EstadoUpdateRequest, EstadoUpdateResponse,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::User,
    response::ApiResponse,
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}/estado", patch(update_user_estado))
        .route("/users/{id}/dni-block", patch(update_user_dni_block))
        .route("/orders", get(list_orders))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(
        ("estado" = Option<String>, Query, description = "ACTIVO / REVISION / BLOQUEADO"),
        ("solo_nuevos" = Option<bool>, Query, description = "Only recently created users"),
        ("dias" = Option<i64>, Query, description = "Window in days, default 7")
    ),
    responses(
        (status = 200, description = "Filtered users, newest first", body = ApiResponse<Vec<User>>),
        (status = 403, description = "ADMIN role required")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AdminUserQuery>,
) -> AppResult<Json<ApiResponse<Vec<User>>>> {
    let users = admin_service::list_users(&state, &auth, query).await?;
    Ok(Json(ApiResponse::ok(users)))
}

#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}/estado",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = EstadoUpdateRequest,
    responses(
        (status = 200, description = "Estado persisted", body = EstadoUpdateResponse),
        (status = 400, description = "Unknown estado value"),
        (status = 403, description = "ADMIN role required"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_user_estado(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<EstadoUpdateRequest>,
) -> AppResult<Json<EstadoUpdateResponse>> {
    let resp = admin_service::update_user_estado(&state, &auth, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}/dni-block",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = DniBlockRequest,
    responses(
        (status = 200, description = "Login gate toggled", body = DniBlockResponse),
        (status = 403, description = "ADMIN role required"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_user_dni_block(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<DniBlockRequest>,
) -> AppResult<Json<DniBlockResponse>> {
    let resp = admin_service::update_user_dni_block(&state, &auth, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(
        ("from" = String, Query, description = "ISO date, inclusive"),
        ("to" = String, Query, description = "ISO date, inclusive")
    ),
    responses(
        (status = 200, description = "Orders in range with latest payment", body = ApiResponse<Vec<AdminOrder>>),
        (status = 403, description = "ADMIN role required")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AdminOrdersQuery>,
) -> AppResult<Json<ApiResponse<Vec<AdminOrder>>>> {
    let orders = admin_service::list_orders(&state, &auth, query).await?;
    Ok(Json(ApiResponse::ok(orders)))
}
