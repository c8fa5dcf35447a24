use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseBackend, EntityTrait, FromQueryResult,
    JoinType, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use uuid::Uuid;

use crate::{
    dto::analytics::{
        BuyerDashboard, BuyerKpis, BuyerLists, BuyerSeries, CategoryMargin, CategoryOrders,
        DailySale, GlobalMetrics, MonthlyPoint, OperationRow, OrderItemRow, OrdersBetweenQuery,
        RangeQuery, RecentOrder, SalesSummary, SellerDashboard, SellerKpis, SellerLists,
        SellerSeries, TopProduct, TopProductEntry, TopQuery, TopSeller,
    },
    entity::{categories, order_items, orders, products, users},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    state::AppState,
};

const MARGIN_RATE: f64 = 0.30;

/// SQL expression bucketing a timestamp column into YYYY-MM, per dialect.
/// Every monthly aggregation goes through this one primitive.
pub fn month_bucket_sql(backend: DatabaseBackend, col: &str) -> String {
    match backend {
        DatabaseBackend::Sqlite => format!("strftime('%Y-%m', {col})"),
        DatabaseBackend::MySql => format!("DATE_FORMAT({col}, '%Y-%m')"),
        _ => format!("to_char({col}, 'YYYY-MM')"),
    }
}

pub fn parse_date(s: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid date: {s}")))
}

fn day_start(d: NaiveDate) -> DateTime<Utc> {
    d.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc()
}

fn day_end(d: NaiveDate) -> DateTime<Utc> {
    d.and_hms_micro_opt(23, 59, 59, 999_999)
        .unwrap_or_default()
        .and_utc()
}

fn parse_range(start: &str, end: &str) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    Ok((day_start(parse_date(start)?), day_end(parse_date(end)?)))
}

/// Seller attribution predicate: the seller_id snapshot when present, with the
/// legacy case-insensitive name/email match as a fallback for older rows.
fn seller_condition(auth: &AuthUser) -> Condition {
    let seller_key = auth.display_name.trim().to_lowercase();
    let email_key = auth.email.trim().to_lowercase();
    let seller_snapshot = || {
        Func::lower(Func::coalesce([
            Expr::col((order_items::Entity, order_items::Column::Seller)).into(),
            Expr::val("").into(),
        ]))
    };

    Condition::any()
        .add(order_items::Column::SellerId.eq(auth.user_id))
        .add(Expr::expr(seller_snapshot()).eq(seller_key))
        .add(Expr::expr(seller_snapshot()).eq(email_key))
}

fn buyer_condition(user_id: Uuid) -> Condition {
    Condition::all().add(Expr::col((orders::Entity, orders::Column::UserId)).eq(user_id))
}

#[derive(Debug, FromQueryResult)]
struct ItemRow {
    order_id: Uuid,
    product_name: String,
    category: Option<String>,
    seller: Option<String>,
    company: Option<String>,
    quantity: i32,
    unit_price: i64,
    order_status: String,
    order_user_name: Option<String>,
    order_created_at: DateTime<Utc>,
}

impl ItemRow {
    fn line_total(&self) -> i64 {
        self.unit_price * self.quantity as i64
    }
}

/// Items joined with their order, optionally filtered by a predicate and a
/// creation range. All the read-side endpoints are folds over this shape.
async fn fetch_items(
    state: &AppState,
    condition: Option<Condition>,
    range: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> AppResult<Vec<ItemRow>> {
    let mut finder = order_items::Entity::find()
        .join(JoinType::InnerJoin, order_items::Relation::Orders.def())
        .select_only()
        .column_as(order_items::Column::OrderId, "order_id")
        .column_as(order_items::Column::ProductName, "product_name")
        .column_as(order_items::Column::Category, "category")
        .column_as(order_items::Column::Seller, "seller")
        .column_as(order_items::Column::Company, "company")
        .column_as(order_items::Column::Quantity, "quantity")
        .column_as(order_items::Column::UnitPrice, "unit_price")
        .column_as(orders::Column::Status, "order_status")
        .column_as(orders::Column::UserName, "order_user_name")
        .column_as(orders::Column::CreatedAt, "order_created_at");

    if let Some(condition) = condition {
        finder = finder.filter(condition);
    }
    if let Some((start, end)) = range {
        finder = finder
            .filter(Expr::col((orders::Entity, orders::Column::CreatedAt)).gte(start))
            .filter(Expr::col((orders::Entity, orders::Column::CreatedAt)).lte(end));
    }

    Ok(finder.into_model::<ItemRow>().all(&state.orm).await?)
}

#[derive(Debug, FromQueryResult)]
struct MonthlyRow {
    period: String,
    total: i64,
}

/// Monthly revenue series over the last `months` × 30 days, grouped in SQL by
/// the month-bucket primitive.
async fn monthly_series(
    state: &AppState,
    condition: Condition,
    months: i64,
) -> AppResult<Vec<MonthlyPoint>> {
    let backend = state.orm.get_database_backend();
    let bucket = month_bucket_sql(backend, "orders.created_at");
    let start = Utc::now() - Duration::days(30 * months);

    let rows = order_items::Entity::find()
        .join(JoinType::InnerJoin, order_items::Relation::Orders.def())
        .select_only()
        .column_as(Expr::cust(bucket.clone()), "period")
        .column_as(
            Expr::cust("CAST(SUM(order_items.unit_price * order_items.quantity) AS BIGINT)"),
            "total",
        )
        .filter(condition)
        .filter(Expr::col((orders::Entity, orders::Column::CreatedAt)).gte(start))
        .group_by(Expr::cust(bucket.clone()))
        .order_by(Expr::cust(bucket), Order::Asc)
        .into_model::<MonthlyRow>()
        .all(&state.orm)
        .await?;

    Ok(rows
        .into_iter()
        .map(|r| MonthlyPoint {
            period: r.period,
            total: r.total,
        })
        .collect())
}

#[derive(Debug, FromQueryResult)]
struct CategoryCount {
    name: String,
    cnt: i64,
}

pub async fn global_metrics(state: &AppState) -> AppResult<GlobalMetrics> {
    let total_users = users::Entity::find().count(&state.orm).await? as i64;
    let total_products = products::Entity::find().count(&state.orm).await? as i64;

    let products_out_of_stock = products::Entity::find()
        .filter(products::Column::Stock.lte(0))
        .count(&state.orm)
        .await? as i64;

    let products_with_image = products::Entity::find()
        .filter(products::Column::ImageUrl.is_not_null())
        .count(&state.orm)
        .await? as i64;

    let top_categories = products::Entity::find()
        .join(JoinType::InnerJoin, products::Relation::Categories.def())
        .select_only()
        .column_as(categories::Column::Name, "name")
        .column_as(Expr::cust("CAST(COUNT(products.id) AS BIGINT)"), "cnt")
        .group_by(categories::Column::Name)
        .order_by(Expr::cust("COUNT(products.id)"), Order::Desc)
        .limit(5)
        .into_model::<CategoryCount>()
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|c| c.name)
        .collect();

    Ok(GlobalMetrics {
        total_users,
        total_products,
        products_out_of_stock,
        products_with_image,
        top_categories,
    })
}

pub async fn orders_between(
    state: &AppState,
    query: OrdersBetweenQuery,
) -> AppResult<Vec<OrderItemRow>> {
    let range = parse_range(&query.from_date, &query.to_date)?;
    let rows = fetch_items(state, None, Some(range)).await?;

    Ok(rows
        .into_iter()
        .map(|r| OrderItemRow {
            order_date: Some(r.order_created_at),
            seller_name: r
                .seller
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "Sin vendedor".to_string()),
            product_name: r.product_name.clone(),
            qty: r.quantity,
            total_paid: r.line_total(),
            status: r.order_status,
        })
        .collect())
}

/// Sellers see their sales; a caller with no seller-attributed items falls
/// back to the buyer view over their own orders.
pub async fn sales_summary(
    state: &AppState,
    auth: &AuthUser,
    query: RangeQuery,
) -> AppResult<SalesSummary> {
    let range = parse_range(&query.start, &query.end)?;

    let seller_items = fetch_items(state, Some(seller_condition(auth)), Some(range)).await?;

    let (total_sales, orders_count) = if !seller_items.is_empty() {
        let total: i64 = seller_items.iter().map(ItemRow::line_total).sum();
        let orders: HashSet<Uuid> = seller_items.iter().map(|i| i.order_id).collect();
        (total, orders.len() as i64)
    } else {
        let own_orders = orders::Entity::find()
            .filter(orders::Column::UserId.eq(auth.user_id))
            .filter(orders::Column::CreatedAt.gte(range.0))
            .filter(orders::Column::CreatedAt.lte(range.1))
            .all(&state.orm)
            .await?;
        let total: i64 = own_orders.iter().map(|o| o.total_amount).sum();
        (total, own_orders.len() as i64)
    };

    let ticket_avg = if orders_count > 0 {
        total_sales as f64 / orders_count as f64
    } else {
        0.0
    };

    Ok(SalesSummary {
        total_sales,
        total_margin: total_sales as f64 * MARGIN_RATE,
        ticket_avg,
        returns: 0,
    })
}

pub async fn sales_daily(
    state: &AppState,
    auth: &AuthUser,
    query: RangeQuery,
) -> AppResult<Vec<DailySale>> {
    let range = parse_range(&query.start, &query.end)?;

    let mut items = fetch_items(state, Some(seller_condition(auth)), Some(range)).await?;
    if items.is_empty() {
        items = fetch_items(state, Some(buyer_condition(auth.user_id)), Some(range)).await?;
    }

    let mut by_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for item in &items {
        *by_day.entry(item.order_created_at.date_naive()).or_default() += item.line_total();
    }

    Ok(by_day
        .into_iter()
        .map(|(date, total)| DailySale {
            date: date.to_string(),
            total,
        })
        .collect())
}

pub async fn category_margins(
    state: &AppState,
    auth: &AuthUser,
    query: RangeQuery,
) -> AppResult<Vec<CategoryMargin>> {
    let range = parse_range(&query.start, &query.end)?;
    let items = fetch_items(state, Some(seller_condition(auth)), Some(range)).await?;

    let mut by_category: HashMap<String, i64> = HashMap::new();
    for item in &items {
        let key = item
            .category
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "Sin categoría".to_string());
        *by_category.entry(key).or_default() += item.line_total();
    }

    Ok(by_category
        .into_iter()
        .map(|(category, total)| CategoryMargin {
            category,
            margin: total as f64 * MARGIN_RATE,
        })
        .collect())
}

pub async fn top_products(
    state: &AppState,
    auth: &AuthUser,
    query: TopQuery,
) -> AppResult<Vec<TopProduct>> {
    let range = parse_range(&query.start, &query.end)?;
    let items = fetch_items(state, Some(seller_condition(auth)), Some(range)).await?;

    let mut by_product: HashMap<String, i64> = HashMap::new();
    for item in &items {
        *by_product.entry(item.product_name.clone()).or_default() += item.line_total();
    }

    let mut out: Vec<TopProduct> = by_product
        .into_iter()
        .map(|(product, sales)| TopProduct { product, sales })
        .collect();
    out.sort_by(|a, b| b.sales.cmp(&a.sales));
    out.truncate(query.top.unwrap_or(8));
    Ok(out)
}

pub async fn operations(
    state: &AppState,
    auth: &AuthUser,
    query: RangeQuery,
) -> AppResult<Vec<OperationRow>> {
    let range = parse_range(&query.start, &query.end)?;
    let items = fetch_items(state, Some(seller_condition(auth)), Some(range)).await?;

    Ok(items
        .into_iter()
        .map(|item| OperationRow {
            date: Some(item.order_created_at),
            order_id: item.order_id,
            product: item.product_name.clone(),
            qty: item.quantity,
            unit_price: item.unit_price,
            total: item.line_total(),
        })
        .collect())
}

pub async fn seller_dashboard(state: &AppState, auth: &AuthUser) -> AppResult<SellerDashboard> {
    let mut items = fetch_items(state, Some(seller_condition(auth)), None).await?;
    items.sort_by(|a, b| b.order_created_at.cmp(&a.order_created_at));

    let total_sales: i64 = items.iter().map(ItemRow::line_total).sum();
    let order_ids: HashSet<Uuid> = items.iter().map(|i| i.order_id).collect();
    let returned: HashSet<Uuid> = items
        .iter()
        .filter(|i| i.order_status.to_lowercase() == "returned")
        .map(|i| i.order_id)
        .collect();

    let own_products = products::Entity::find()
        .filter(products::Column::SellerId.eq(auth.user_id))
        .all(&state.orm)
        .await?;
    let rating = if own_products.is_empty() {
        0.0
    } else {
        own_products.iter().map(|p| p.rating).sum::<f64>() / own_products.len() as f64
    };

    let monthly_sales = monthly_series(state, seller_condition(auth), 4).await?;

    let mut by_category: HashMap<String, i64> = HashMap::new();
    for item in &items {
        let key = item
            .category
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "Sin categoría".to_string());
        *by_category.entry(key).or_default() += item.quantity as i64;
    }
    let mut orders_by_category: Vec<CategoryOrders> = by_category
        .into_iter()
        .map(|(category, orders)| CategoryOrders { category, orders })
        .collect();
    orders_by_category.sort_by(|a, b| b.orders.cmp(&a.orders));

    let mut by_product: HashMap<String, (i64, i64)> = HashMap::new();
    for item in &items {
        let entry = by_product.entry(item.product_name.clone()).or_default();
        entry.0 += item.quantity as i64;
        entry.1 += item.line_total();
    }
    let mut top_products: Vec<TopProductEntry> = by_product
        .into_iter()
        .map(|(name, (sold, revenue))| TopProductEntry {
            name,
            price: if sold > 0 { revenue as f64 / sold as f64 } else { 0.0 },
            sold,
        })
        .collect();
    top_products.sort_by(|a, b| b.sold.cmp(&a.sold));
    top_products.truncate(3);

    let recent_orders = items
        .iter()
        .take(5)
        .map(|item| RecentOrder {
            id: item.order_id,
            status: item.order_status.clone(),
            date: Some(item.order_created_at),
            product_name: item.product_name.clone(),
            total: item.line_total(),
            client_name: item.order_user_name.clone(),
        })
        .collect();

    Ok(SellerDashboard {
        kpis: SellerKpis {
            total_sales,
            orders_count: order_ids.len() as i64,
            rating,
            returns: returned.len() as i64,
        },
        series: SellerSeries {
            monthly_sales,
            orders_by_category,
        },
        lists: SellerLists {
            top_products,
            recent_orders,
        },
    })
}

pub async fn buyer_dashboard(state: &AppState, auth: &AuthUser) -> AppResult<BuyerDashboard> {
    let mut items = fetch_items(state, Some(buyer_condition(auth.user_id)), None).await?;
    items.sort_by(|a, b| b.order_created_at.cmp(&a.order_created_at));

    let total_spent: i64 = items.iter().map(ItemRow::line_total).sum();

    let orders_count = orders::Entity::find()
        .filter(orders::Column::UserId.eq(auth.user_id))
        .count(&state.orm)
        .await? as i64;

    let monthly_purchases = monthly_series(state, buyer_condition(auth.user_id), 4).await?;

    let recent_purchases = items
        .iter()
        .take(5)
        .map(|item| RecentOrder {
            id: item.order_id,
            status: item.order_status.clone(),
            date: Some(item.order_created_at),
            product_name: item.product_name.clone(),
            total: item.line_total(),
            client_name: None,
        })
        .collect();

    let mut by_seller: HashMap<String, (HashSet<Uuid>, i64)> = HashMap::new();
    for item in &items {
        let key = item
            .company
            .clone()
            .or_else(|| item.seller.clone())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Sin marca".to_string());
        let entry = by_seller.entry(key).or_default();
        entry.0.insert(item.order_id);
        entry.1 += item.line_total();
    }
    let mut top_sellers: Vec<TopSeller> = by_seller
        .into_iter()
        .map(|(name, (order_set, spent))| TopSeller {
            name,
            orders: order_set.len() as i64,
            spent,
        })
        .collect();
    top_sellers.sort_by(|a, b| b.orders.cmp(&a.orders));
    top_sellers.truncate(3);

    Ok(BuyerDashboard {
        kpis: BuyerKpis {
            total_spent,
            orders_count,
        },
        series: BuyerSeries { monthly_purchases },
        lists: BuyerLists {
            recent_purchases,
            top_sellers,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_bucket_matches_dialect() {
        assert_eq!(
            month_bucket_sql(DatabaseBackend::Postgres, "orders.created_at"),
            "to_char(orders.created_at, 'YYYY-MM')"
        );
        assert_eq!(
            month_bucket_sql(DatabaseBackend::Sqlite, "orders.created_at"),
            "strftime('%Y-%m', orders.created_at)"
        );
        assert_eq!(
            month_bucket_sql(DatabaseBackend::MySql, "orders.created_at"),
            "DATE_FORMAT(orders.created_at, '%Y-%m')"
        );
    }

    #[test]
    fn parse_date_accepts_iso_and_rejects_garbage() {
        assert!(parse_date("2025-06-01").is_ok());
        assert!(matches!(
            parse_date("junio"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn day_bounds_cover_the_whole_day() {
        let d = parse_date("2025-06-01").unwrap();
        assert!(day_start(d) < day_end(d));
        assert_eq!(day_start(d).date_naive(), day_end(d).date_naive());
    }
}
