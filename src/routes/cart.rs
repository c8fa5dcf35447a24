use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddCartItemRequest, UpdateCartQtyRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Cart,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart))
        .route("/items", post(add_item))
        .route("/items/{id}", patch(update_item_qty).delete(remove_item))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Current user's cart with computed total", body = ApiResponse<Cart>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<Cart>>> {
    let cart = cart_service::get_cart(&state, &auth).await?;
    Ok(Json(ApiResponse::ok(cart)))
}

#[utoipa::path(
    post,
    path = "/api/cart/items",
    request_body = AddCartItemRequest,
    responses(
        (status = 201, description = "Item added, stock reserved", body = ApiResponse<Cart>),
        (status = 400, description = "Invalid quantity or insufficient stock"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<AddCartItemRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Cart>>)> {
    let cart = cart_service::add_item(&state, &auth, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Added to cart", cart, None)),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/cart/items/{id}",
    params(("id" = Uuid, Path, description = "Cart item ID")),
    request_body = UpdateCartQtyRequest,
    responses(
        (status = 204, description = "Quantity updated"),
        (status = 404, description = "Item not in the caller's cart")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_item_qty(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCartQtyRequest>,
) -> AppResult<StatusCode> {
    cart_service::update_item_qty(&state, &auth, id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/cart/items/{id}",
    params(("id" = Uuid, Path, description = "Cart item ID")),
    responses(
        (status = 204, description = "Item removed; reserved stock is not restored"),
        (status = 404, description = "Item not in the caller's cart")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    cart_service::remove_item(&state, &auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
