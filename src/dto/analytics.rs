use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RangeQuery {
    /// ISO date, e.g. 2025-06-01.
    pub start: String,
    pub end: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TopQuery {
    pub start: String,
    pub end: String,
    pub top: Option<usize>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrdersBetweenQuery {
    #[serde(rename = "from")]
    pub from_date: String,
    #[serde(rename = "to")]
    pub to_date: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GlobalMetrics {
    pub total_users: i64,
    pub total_products: i64,
    pub products_out_of_stock: i64,
    pub products_with_image: i64,
    pub top_categories: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemRow {
    pub order_date: Option<DateTime<Utc>>,
    pub seller_name: String,
    pub product_name: String,
    pub qty: i32,
    pub total_paid: i64,
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SalesSummary {
    pub total_sales: i64,
    pub total_margin: f64,
    pub ticket_avg: f64,
    pub returns: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DailySale {
    /// ISO date (YYYY-MM-DD).
    pub date: String,
    pub total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryMargin {
    pub category: String,
    pub margin: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopProduct {
    pub product: String,
    pub sales: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OperationRow {
    pub date: Option<DateTime<Utc>>,
    pub order_id: Uuid,
    pub product: String,
    pub qty: i32,
    pub unit_price: i64,
    pub total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlyPoint {
    /// YYYY-MM bucket.
    pub period: String,
    pub total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryOrders {
    pub category: String,
    pub orders: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopProductEntry {
    pub name: String,
    pub price: f64,
    pub sold: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecentOrder {
    pub id: Uuid,
    pub status: String,
    pub date: Option<DateTime<Utc>>,
    pub product_name: String,
    pub total: i64,
    pub client_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SellerKpis {
    pub total_sales: i64,
    pub orders_count: i64,
    pub rating: f64,
    pub returns: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SellerSeries {
    pub monthly_sales: Vec<MonthlyPoint>,
    pub orders_by_category: Vec<CategoryOrders>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SellerLists {
    pub top_products: Vec<TopProductEntry>,
    pub recent_orders: Vec<RecentOrder>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SellerDashboard {
    pub kpis: SellerKpis,
    pub series: SellerSeries,
    pub lists: SellerLists,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BuyerKpis {
    pub total_spent: i64,
    pub orders_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BuyerSeries {
    pub monthly_purchases: Vec<MonthlyPoint>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopSeller {
    pub name: String,
    pub orders: i64,
    pub spent: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BuyerLists {
    pub recent_purchases: Vec<RecentOrder>,
    pub top_sellers: Vec<TopSeller>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BuyerDashboard {
    pub kpis: BuyerKpis,
    pub series: BuyerSeries,
    pub lists: BuyerLists,
}
