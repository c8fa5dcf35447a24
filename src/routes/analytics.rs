use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::analytics::{
        BuyerDashboard, CategoryMargin, DailySale, GlobalMetrics, OperationRow, OrderItemRow,
        OrdersBetweenQuery, RangeQuery, SalesSummary, SellerDashboard, TopProduct, TopQuery,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    services::analytics_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/global", get(global_metrics))
        .route("/orders", get(orders_between))
        .route("/sales-summary", get(sales_summary))
        .route("/sales-daily", get(sales_daily))
        .route("/category-margins", get(category_margins))
        .route("/top-products", get(top_products))
        .route("/operations", get(operations))
        .route("/seller/dashboard", get(seller_dashboard))
        .route("/buyer/dashboard", get(buyer_dashboard))
}

#[utoipa::path(
    get,
    path = "/api/analytics/global",
    responses((status = 200, description = "Marketplace-wide counters", body = GlobalMetrics)),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn global_metrics(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<GlobalMetrics>> {
    Ok(Json(analytics_service::global_metrics(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/analytics/orders",
    params(
        ("from" = String, Query, description = "ISO date, inclusive"),
        ("to" = String, Query, description = "ISO date, inclusive")
    ),
    responses((status = 200, description = "Item rows in range", body = Vec<OrderItemRow>)),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn orders_between(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<OrdersBetweenQuery>,
) -> AppResult<Json<Vec<OrderItemRow>>> {
    Ok(Json(analytics_service::orders_between(&state, query).await?))
}

#[utoipa::path(
    get,
    path = "/api/analytics/sales-summary",
    params(
        ("start" = String, Query, description = "ISO date"),
        ("end" = String, Query, description = "ISO date")
    ),
    responses((status = 200, description = "Totals for the caller's view", body = SalesSummary)),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn sales_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<SalesSummary>> {
    Ok(Json(
        analytics_service::sales_summary(&state, &auth, query).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/analytics/sales-daily",
    params(
        ("start" = String, Query, description = "ISO date"),
        ("end" = String, Query, description = "ISO date")
    ),
    responses((status = 200, description = "Per-day totals", body = Vec<DailySale>)),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn sales_daily(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<Vec<DailySale>>> {
    Ok(Json(
        analytics_service::sales_daily(&state, &auth, query).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/analytics/category-margins",
    params(
        ("start" = String, Query, description = "ISO date"),
        ("end" = String, Query, description = "ISO date")
    ),
    responses((status = 200, description = "Per-category margins", body = Vec<CategoryMargin>)),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn category_margins(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<Vec<CategoryMargin>>> {
    Ok(Json(
        analytics_service::category_margins(&state, &auth, query).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/analytics/top-products",
    params(
        ("start" = String, Query, description = "ISO date"),
        ("end" = String, Query, description = "ISO date"),
        ("top" = Option<usize>, Query, description = "Row cap, default 8")
    ),
    responses((status = 200, description = "Best-selling products by revenue", body = Vec<TopProduct>)),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn top_products(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<TopQuery>,
) -> AppResult<Json<Vec<TopProduct>>> {
    Ok(Json(
        analytics_service::top_products(&state, &auth, query).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/analytics/operations",
    params(
        ("start" = String, Query, description = "ISO date"),
        ("end" = String, Query, description = "ISO date")
    ),
    responses((status = 200, description = "Itemized operations", body = Vec<OperationRow>)),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn operations(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<Vec<OperationRow>>> {
    Ok(Json(
        analytics_service::operations(&state, &auth, query).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/analytics/seller/dashboard",
    responses((status = 200, description = "Seller KPIs, series and lists", body = SellerDashboard)),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn seller_dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<SellerDashboard>> {
    Ok(Json(
        analytics_service::seller_dashboard(&state, &auth).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/analytics/buyer/dashboard",
    responses((status = 200, description = "Buyer KPIs, series and lists", body = BuyerDashboard)),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
pub async fn buyer_dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<BuyerDashboard>> {
    Ok(Json(
        analytics_service::buyer_dashboard(&state, &auth).await?,
    ))
}
