use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::cart::{AddCartItemRequest, UpdateCartQtyRequest},
    entity::{cart_items, carts, products, users},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Cart,
    state::AppState,
};

/// Returns the user's cart, creating an empty one when absent. Nothing at the
/// schema level prevents two carts per user; the most recently created one
/// wins everywhere, which makes the tie-break deterministic.
pub async fn get_or_create_cart<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> AppResult<carts::Model> {
    let existing = carts::Entity::find()
        .filter(carts::Column::UserId.eq(user_id))
        .order_by_desc(carts::Column::CreatedAt)
        .one(conn)
        .await?;

    if let Some(cart) = existing {
        return Ok(cart);
    }

    let cart = carts::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;
    Ok(cart)
}

pub async fn get_cart(state: &AppState, auth: &AuthUser) -> AppResult<Cart> {
    let cart = get_or_create_cart(&state.orm, auth.user_id).await?;
    let items = cart_items::Entity::find()
        .filter(cart_items::Column::CartId.eq(cart.id))
        .order_by_asc(cart_items::Column::CreatedAt)
        .all(&state.orm)
        .await?;
    Ok(Cart::from_entity(cart, items))
}

/// Adds a product to the cart and reserves its stock immediately: the product
/// stock is decremented here, not at checkout. Removing the line later does
/// NOT release the reservation (inherited policy, see DESIGN.md).
pub async fn add_item(
    state: &AppState,
    auth: &AuthUser,
    payload: AddCartItemRequest,
) -> AppResult<Cart> {
    if payload.qty <= 0 {
        return Err(AppError::BadRequest("Invalid quantity".into()));
    }

    let txn = state.orm.begin().await?;

    let product = products::Entity::find_by_id(payload.product_id)
        .filter(products::Column::IsActive.eq(true))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;

    if product.stock < payload.qty {
        return Err(AppError::BadRequest("Insufficient stock".into()));
    }

    let seller_name = users::Entity::find_by_id(product.seller_id)
        .one(&txn)
        .await?
        .map(|u| u.display_name());

    // Read-then-write decrement, same shape as the source; no row lock.
    let remaining = product.stock - payload.qty;
    let seller_id = product.seller_id;
    let product_id = product.id;
    let name = product.name.clone();
    let price = product.price;
    let image = product.image_url.clone();

    let mut active: products::ActiveModel = product.into();
    active.stock = Set(remaining);
    active.update(&txn).await?;

    let cart = get_or_create_cart(&txn, auth.user_id).await?;

    let existing = cart_items::Entity::find()
        .filter(cart_items::Column::CartId.eq(cart.id))
        .filter(cart_items::Column::ProductId.eq(product_id))
        .one(&txn)
        .await?;

    match existing {
        Some(line) => {
            let qty = line.qty + payload.qty;
            let mut active: cart_items::ActiveModel = line.into();
            active.qty = Set(qty);
            active.update(&txn).await?;
        }
        None => {
            cart_items::ActiveModel {
                id: Set(Uuid::new_v4()),
                cart_id: Set(cart.id),
                product_id: Set(product_id),
                name: Set(name),
                price: Set(price),
                qty: Set(payload.qty),
                image: Set(image),
                seller: Set(seller_name),
                seller_id: Set(Some(seller_id)),
                stock_snapshot: Set(remaining),
                created_at: NotSet,
            }
            .insert(&txn)
            .await?;
        }
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(auth.user_id),
        "cart_add",
        Some("cart_items"),
        Some(serde_json::json!({ "product_id": payload.product_id, "qty": payload.qty })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    get_cart(state, auth).await
}

/// Changes a line's quantity. The stock reservation is NOT re-adjusted;
/// inherited asymmetry, preserved on purpose.
pub async fn update_item_qty(
    state: &AppState,
    auth: &AuthUser,
    item_id: Uuid,
    payload: UpdateCartQtyRequest,
) -> AppResult<()> {
    if payload.qty <= 0 {
        return Err(AppError::BadRequest("Invalid quantity".into()));
    }

    let line = find_own_item(state, auth, item_id).await?;

    let mut active: cart_items::ActiveModel = line.into();
    active.qty = Set(payload.qty);
    active.update(&state.orm).await?;
    Ok(())
}

/// Removes a line. The reserved stock stays reserved.
pub async fn remove_item(state: &AppState, auth: &AuthUser, item_id: Uuid) -> AppResult<()> {
    let line = find_own_item(state, auth, item_id).await?;

    cart_items::Entity::delete_by_id(line.id)
        .exec(&state.orm)
        .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(auth.user_id),
        "cart_remove",
        Some("cart_items"),
        Some(serde_json::json!({ "item_id": item_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(())
}

/// Scopes the line to the caller's own cart via the join on user_id.
async fn find_own_item(
    state: &AppState,
    auth: &AuthUser,
    item_id: Uuid,
) -> AppResult<cart_items::Model> {
    cart_items::Entity::find()
        .filter(cart_items::Column::Id.eq(item_id))
        .join(JoinType::InnerJoin, cart_items::Relation::Carts.def())
        .filter(carts::Column::UserId.eq(auth.user_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Item not found"))
}
