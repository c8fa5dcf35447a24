use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::comments::{CommentList, CommentQuery, CreateCommentRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Comment,
    response::ApiResponse,
    services::comment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_comments).post(create_comment))
        .route("/{id}", axum::routing::delete(delete_comment))
}

#[utoipa::path(
    get,
    path = "/api/comments",
    params(("product_id" = Option<Uuid>, Query, description = "Filter by product")),
    responses(
        (status = 200, description = "Comments, newest first", body = ApiResponse<CommentList>)
    ),
    tag = "Comments"
)]
pub async fn list_comments(
    State(state): State<AppState>,
    Query(query): Query<CommentQuery>,
) -> AppResult<Json<ApiResponse<CommentList>>> {
    let items = comment_service::list_comments(&state, query.product_id).await?;
    Ok(Json(ApiResponse::ok(CommentList { items })))
}

#[utoipa::path(
    post,
    path = "/api/comments",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = ApiResponse<Comment>),
        (status = 400, description = "Rating out of range"),
        (status = 403, description = "No delivered purchase of this product"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Comments"
)]
pub async fn create_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Comment>>)> {
    let comment = comment_service::create_comment(&state, &auth, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Comment created", comment, None)),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment ID")),
    responses(
        (status = 204, description = "Comment removed"),
        (status = 403, description = "ADMIN role required")
    ),
    security(("bearer_auth" = [])),
    tag = "Comments"
)]
pub async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    comment_service::delete_comment(&state, &auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
