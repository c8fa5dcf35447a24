use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::RecordPaymentRequest,
    entity::{cart_items, carts, order_items, orders, payments},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, Payment},
    state::AppState,
};

pub const STATUS_PENDING_ADMIN: &str = "pending_admin";
pub const STATUS_ENTREGADO: &str = "Entregado";

/// Converts the cart into an order. Validation failures (empty cart, invalid
/// total) surface as 400; anything unexpected rolls the transaction back and
/// is masked behind the reassuring "pending verification" message.
pub async fn checkout(state: &AppState, auth: &AuthUser) -> AppResult<Order> {
    let result = run_checkout(state, auth).await;

    let order = match result {
        Ok(order) => order,
        Err(err @ (AppError::BadRequest(_) | AppError::NotFound(_))) => return Err(err),
        Err(err) => {
            tracing::error!(error = %err, user_id = %auth.user_id, "checkout failed");
            return Err(AppError::PendingVerification);
        }
    };

    if let Err(err) = log_audit(
        &state.pool,
        Some(auth.user_id),
        "checkout",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "total_amount": order.total_amount })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(order)
}

async fn run_checkout(state: &AppState, auth: &AuthUser) -> AppResult<Order> {
    let txn = state.orm.begin().await?;

    let cart = carts::Entity::find()
        .filter(carts::Column::UserId.eq(auth.user_id))
        .order_by_desc(carts::Column::CreatedAt)
        .one(&txn)
        .await?;

    let cart = match cart {
        Some(c) => c,
        None => return Err(AppError::BadRequest("Cart is empty".into())),
    };

    let lines = cart_items::Entity::find()
        .filter(cart_items::Column::CartId.eq(cart.id))
        .order_by_asc(cart_items::Column::CreatedAt)
        .all(&txn)
        .await?;

    if lines.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    // Total fixed from the line snapshots at this moment; never recomputed.
    let total_amount: i64 = lines.iter().map(|ci| ci.price * ci.qty as i64).sum();
    if total_amount <= 0 {
        return Err(AppError::BadRequest("Invalid total".into()));
    }

    let order = orders::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(Some(auth.user_id)),
        user_name: Set(Some(auth.display_name.clone())),
        status: Set(STATUS_PENDING_ADMIN.into()),
        total_amount: Set(total_amount),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for line in &lines {
        let item = order_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(Some(line.product_id)),
            product_name: Set(line.name.clone()),
            category: Set(None),
            subcategory: Set(None),
            seller: Set(line.seller.clone()),
            seller_id: Set(line.seller_id),
            company: Set(None),
            quantity: Set(line.qty),
            unit_price: Set(line.price),
        }
        .insert(&txn)
        .await?;
        items.push(item);
    }

    cart_items::Entity::delete_many()
        .filter(cart_items::Column::CartId.eq(cart.id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    Ok(Order::from_entity(order, items))
}

pub async fn list_my_orders(state: &AppState, auth: &AuthUser) -> AppResult<Vec<Order>> {
    let rows = orders::Entity::find()
        .filter(orders::Column::UserId.eq(auth.user_id))
        .order_by_desc(orders::Column::CreatedAt)
        .all(&state.orm)
        .await?;

    hydrate_orders(state, rows).await
}

/// Orders where the caller sold at least one item. Attribution prefers the
/// seller_id snapshot; the case-insensitive display-name match remains as a
/// compatibility shim for rows that predate the column.
pub async fn list_seller_orders(state: &AppState, auth: &AuthUser) -> AppResult<Vec<Order>> {
    let rows = orders::Entity::find()
        .order_by_desc(orders::Column::CreatedAt)
        .all(&state.orm)
        .await?;

    let orders = hydrate_orders(state, rows).await?;

    Ok(orders
        .into_iter()
        .filter(|order| {
            order
                .items
                .iter()
                .any(|item| item_matches_seller(item.seller_id, item.seller.as_deref(), auth))
        })
        .collect())
}

pub fn item_matches_seller(
    seller_id: Option<Uuid>,
    seller: Option<&str>,
    auth: &AuthUser,
) -> bool {
    if seller_id == Some(auth.user_id) {
        return true;
    }
    let key = seller.unwrap_or("").trim().to_lowercase();
    !key.is_empty()
        && (key == auth.display_name.trim().to_lowercase()
            || key == auth.email.trim().to_lowercase())
}

/// Records a payment attempt for the caller's own order. Attempts accumulate;
/// the most recent one is the order's effective payment status.
pub async fn record_payment(
    state: &AppState,
    auth: &AuthUser,
    order_id: Uuid,
    payload: RecordPaymentRequest,
) -> AppResult<Payment> {
    if payload.amount <= 0 {
        return Err(AppError::BadRequest("Invalid amount".into()));
    }

    orders::Entity::find_by_id(order_id)
        .filter(orders::Column::UserId.eq(auth.user_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;

    let payment = payments::ActiveModel {
        id: Set(Uuid::new_v4()),
        order_id: Set(order_id),
        provider: Set(payload.provider),
        status: Set("PENDIENTE".into()),
        amount: Set(payload.amount),
        tx_ref: Set(payload.tx_ref),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(auth.user_id),
        "payment_recorded",
        Some("payments"),
        Some(serde_json::json!({ "order_id": order_id, "payment_id": payment.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(Payment::from(payment))
}

/// Loads the items for a page of orders in one query.
async fn hydrate_orders(
    state: &AppState,
    rows: Vec<orders::Model>,
) -> AppResult<Vec<Order>> {
    let order_ids: Vec<Uuid> = rows.iter().map(|o| o.id).collect();
    let mut items_by_order: HashMap<Uuid, Vec<order_items::Model>> = HashMap::new();
    let items = order_items::Entity::find()
        .filter(order_items::Column::OrderId.is_in(order_ids))
        .all(&state.orm)
        .await?;
    for item in items {
        items_by_order.entry(item.order_id).or_default().push(item);
    }

    Ok(rows
        .into_iter()
        .map(|order| {
            let items = items_by_order.remove(&order.id).unwrap_or_default();
            Order::from_entity(order, items)
        })
        .collect())
}
