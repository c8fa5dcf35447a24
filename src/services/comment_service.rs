use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::comments::CreateCommentRequest,
    entity::{order_items, orders, product_comments, products},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Comment,
    services::order_service::STATUS_ENTREGADO,
    state::AppState,
};

pub async fn list_comments(
    state: &AppState,
    product_id: Option<Uuid>,
) -> AppResult<Vec<Comment>> {
    let mut finder = product_comments::Entity::find();
    if let Some(product_id) = product_id {
        finder = finder.filter(product_comments::Column::ProductId.eq(product_id));
    }
    let rows = finder
        .order_by_desc(product_comments::Column::CreatedAt)
        .all(&state.orm)
        .await?;
    Ok(rows.into_iter().map(Comment::from).collect())
}

/// True when the user has at least one item of this product inside an order
/// whose status is "entregado" (case-insensitive).
pub async fn user_received_product(
    state: &AppState,
    user_id: Uuid,
    product_id: Uuid,
) -> AppResult<bool> {
    let delivered = STATUS_ENTREGADO.to_lowercase();
    let row = order_items::Entity::find()
        .join(JoinType::InnerJoin, order_items::Relation::Orders.def())
        .filter(orders::Column::UserId.eq(user_id))
        .filter(order_items::Column::ProductId.eq(product_id))
        .filter(
            Expr::expr(Func::lower(Expr::col((
                orders::Entity,
                orders::Column::Status,
            ))))
            .eq(delivered),
        )
        .one(&state.orm)
        .await?;
    Ok(row.is_some())
}

pub async fn create_comment(
    state: &AppState,
    auth: &AuthUser,
    payload: CreateCommentRequest,
) -> AppResult<Comment> {
    if !(1..=10).contains(&payload.rating) {
        return Err(AppError::BadRequest("Rating must be between 1 and 10".into()));
    }

    products::Entity::find_by_id(payload.product_id)
        .filter(products::Column::IsActive.eq(true))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;

    if !user_received_product(state, auth.user_id, payload.product_id).await? {
        return Err(AppError::Forbidden(
            "You can only comment on products you bought and received".into(),
        ));
    }

    let comment = product_comments::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(payload.product_id),
        user_id: Set(auth.user_id),
        rating: Set(payload.rating),
        text: Set(payload.text),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(Comment::from(comment))
}

/// ADMIN only; deleting an absent comment is a no-op.
pub async fn delete_comment(state: &AppState, auth: &AuthUser, comment_id: Uuid) -> AppResult<()> {
    auth.ensure_admin()?;

    product_comments::Entity::delete_by_id(comment_id)
        .exec(&state.orm)
        .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(auth.user_id),
        "comment_delete",
        Some("product_comments"),
        Some(serde_json::json!({ "comment_id": comment_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(())
}
