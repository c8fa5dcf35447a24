use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    entity::{product_images, products, users},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::ProductQuery,
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all().add(products::Column::IsActive.eq(true));
    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        condition = condition.add(Expr::col(products::Column::Name).ilike(pattern));
    }
    if let Some(category_id) = query.category_id {
        condition = condition.add(products::Column::CategoryId.eq(category_id));
    }
    if let Some(seller_id) = query.seller_id {
        condition = condition.add(products::Column::SellerId.eq(seller_id));
    }

    let finder = products::Entity::find()
        .filter(condition)
        .order_by_desc(products::Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let rows = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items = hydrate_products(state, rows).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = products::Entity::find_by_id(id)
        .filter(products::Column::IsActive.eq(true))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;

    let mut hydrated = hydrate_products(state, vec![product]).await?;
    let product = hydrated.remove(0);
    Ok(ApiResponse::ok(product))
}

pub async fn create_product(
    state: &AppState,
    auth: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    auth.ensure_vendor()?;

    if payload.price < 0 {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    if payload.stock < 0 {
        return Err(AppError::BadRequest("stock must not be negative".into()));
    }

    let id = Uuid::new_v4();
    let txn = state.orm.begin().await?;

    let product = products::ActiveModel {
        id: Set(id),
        seller_id: Set(auth.user_id),
        name: Set(payload.name),
        description: Set(payload.description),
        price: Set(payload.price),
        stock: Set(payload.stock),
        condition: Set(payload.condition),
        rating: Set(0.0),
        sold_count: Set(0),
        image_url: Set(payload.image_url),
        features: Set(payload.features),
        category_id: Set(payload.category_id),
        subcategory: Set(payload.subcategory),
        is_active: Set(payload.is_active),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    replace_images(&txn, id, &payload.images).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(auth.user_id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let mut hydrated = hydrate_products(state, vec![product]).await?;
    Ok(ApiResponse::success(
        "Product created",
        hydrated.remove(0),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    auth: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let existing = products::Entity::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;

    auth.ensure_vendor()?;
    if existing.seller_id != auth.user_id {
        return Err(AppError::Forbidden("You are not the product owner".into()));
    }

    let txn = state.orm.begin().await?;

    let mut active: products::ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        if price < 0 {
            return Err(AppError::BadRequest("price must not be negative".into()));
        }
        active.price = Set(price);
    }
    if let Some(stock) = payload.stock {
        if stock < 0 {
            return Err(AppError::BadRequest("stock must not be negative".into()));
        }
        active.stock = Set(stock);
    }
    if let Some(condition) = payload.condition {
        active.condition = Set(condition);
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(Some(category_id));
    }
    if let Some(subcategory) = payload.subcategory {
        active.subcategory = Set(Some(subcategory));
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    if let Some(features) = payload.features {
        active.features = Set(Some(features));
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().into());
    let product = active.update(&txn).await?;

    if let Some(images) = payload.images.as_ref() {
        replace_images(&txn, id, images).await?;
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(auth.user_id),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let mut hydrated = hydrate_products(state, vec![product]).await?;
    Ok(ApiResponse::success(
        "Updated",
        hydrated.remove(0),
        Some(Meta::empty()),
    ))
}

/// Soft delete: the product disappears from the catalog but stays referenced
/// by historical cart/order snapshots.
pub async fn delete_product(state: &AppState, auth: &AuthUser, id: Uuid) -> AppResult<()> {
    let existing = products::Entity::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;

    auth.ensure_vendor()?;
    if existing.seller_id != auth.user_id {
        return Err(AppError::Forbidden("You are not the product owner".into()));
    }

    let mut active: products::ActiveModel = existing.into();
    active.is_active = Set(false);
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(auth.user_id),
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(())
}

async fn replace_images<C: sea_orm::ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    urls: &[String],
) -> AppResult<()> {
    product_images::Entity::delete_many()
        .filter(product_images::Column::ProductId.eq(product_id))
        .exec(conn)
        .await?;

    for (i, url) in urls.iter().enumerate() {
        product_images::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            url: Set(url.clone()),
            sort_order: Set(i as i32),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

/// Attaches seller display names and image lists in two batch queries.
async fn hydrate_products(
    state: &AppState,
    rows: Vec<products::Model>,
) -> AppResult<Vec<Product>> {
    let seller_ids: Vec<Uuid> = rows.iter().map(|p| p.seller_id).collect();
    let sellers: HashMap<Uuid, String> = users::Entity::find()
        .filter(users::Column::Id.is_in(seller_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|u| (u.id, u.display_name()))
        .collect();

    let product_ids: Vec<Uuid> = rows.iter().map(|p| p.id).collect();
    let mut images_by_product: HashMap<Uuid, Vec<product_images::Model>> = HashMap::new();
    let images = product_images::Entity::find()
        .filter(product_images::Column::ProductId.is_in(product_ids))
        .all(&state.orm)
        .await?;
    for image in images {
        images_by_product.entry(image.product_id).or_default().push(image);
    }

    Ok(rows
        .into_iter()
        .map(|p| {
            let seller_name = sellers.get(&p.seller_id).cloned();
            let images = images_by_product.remove(&p.id).unwrap_or_default();
            Product::from_entity(p, seller_name, images)
        })
        .collect())
}
