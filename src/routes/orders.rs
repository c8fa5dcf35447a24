use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{OrderList, RecordPaymentRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Order, Payment},
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_my_orders))
        .route("/checkout", post(checkout))
        .route("/seller", get(list_seller_orders))
        .route("/{id}/payments", post(record_payment))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "Caller's orders, newest first", body = ApiResponse<OrderList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_my_orders(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let items = order_service::list_my_orders(&state, &auth).await?;
    Ok(Json(ApiResponse::ok(OrderList { items })))
}

#[utoipa::path(
    post,
    path = "/api/orders/checkout",
    responses(
        (status = 201, description = "Order created from the cart", body = ApiResponse<Order>),
        (status = 400, description = "Empty cart or invalid total"),
        (status = 500, description = "Order pending admin verification")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn checkout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<(StatusCode, Json<ApiResponse<Order>>)> {
    let order = order_service::checkout(&state, &auth).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Order created", order, None)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/orders/seller",
    responses(
        (status = 200, description = "Orders containing the caller's items as seller", body = ApiResponse<OrderList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_seller_orders(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let items = order_service::list_seller_orders(&state, &auth).await?;
    Ok(Json(ApiResponse::ok(OrderList { items })))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/payments",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = RecordPaymentRequest,
    responses(
        (status = 201, description = "Payment attempt recorded", body = ApiResponse<Payment>),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn record_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecordPaymentRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Payment>>)> {
    let payment = order_service::record_payment(&state, &auth, id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Payment recorded", payment, None)),
    ))
}
