use std::collections::HashMap;

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::admin::{
        AdminOrder, AdminOrdersQuery, AdminUserQuery, DniBlockRequest, DniBlockResponse,
        EstadoUpdateRequest, EstadoUpdateResponse,
    },
    entity::{orders, payments, user_roles, users},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    services::user_service::{ESTADO_ACTIVO, ESTADO_BLOQUEADO, ESTADO_REVISION},
    state::AppState,
};

const ESTADOS: [&str; 3] = [ESTADO_ACTIVO, ESTADO_REVISION, ESTADO_BLOQUEADO];

pub async fn list_users(
    state: &AppState,
    auth: &AuthUser,
    query: AdminUserQuery,
) -> AppResult<Vec<User>> {
    auth.ensure_admin()?;

    let mut condition = Condition::all();
    if let Some(estado) = query.estado.as_ref().filter(|e| !e.is_empty()) {
        condition = condition.add(users::Column::Estado.eq(estado.clone()));
    }
    if query.solo_nuevos {
        let dias = query.dias.unwrap_or(7).clamp(1, 365);
        let cutoff = Utc::now() - Duration::days(dias);
        condition = condition.add(users::Column::CreadoEn.gte(cutoff));
    }

    let rows = users::Entity::find()
        .filter(condition)
        .order_by_desc(users::Column::CreadoEn)
        .all(&state.orm)
        .await?;

    // One query for all role assignments instead of one per user.
    let user_ids: Vec<Uuid> = rows.iter().map(|u| u.id).collect();
    let mut roles_by_user: HashMap<Uuid, Vec<String>> = HashMap::new();
    let assignments = user_roles::Entity::find()
        .filter(user_roles::Column::UserId.is_in(user_ids))
        .find_also_related(crate::entity::roles::Entity)
        .all(&state.orm)
        .await?;
    for (assignment, role) in assignments {
        if let Some(role) = role {
            roles_by_user
                .entry(assignment.user_id)
                .or_default()
                .push(role.code);
        }
    }

    Ok(rows
        .into_iter()
        .map(|u| {
            let roles = roles_by_user.remove(&u.id).unwrap_or_default();
            User::from_entity(u, roles)
        })
        .collect())
}

/// Any estado can transition to any other; only the vocabulary is validated.
pub async fn update_user_estado(
    state: &AppState,
    auth: &AuthUser,
    user_id: Uuid,
    payload: EstadoUpdateRequest,
) -> AppResult<EstadoUpdateResponse> {
    auth.ensure_admin()?;

    if !ESTADOS.contains(&payload.estado.as_str()) {
        return Err(AppError::BadRequest("Invalid estado".into()));
    }

    let user = users::Entity::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let mut active: users::ActiveModel = user.into();
    active.estado = Set(payload.estado.clone());
    active.actualizado_en = Set(Utc::now().into());
    let user = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(auth.user_id),
        "user_estado_update",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id, "estado": user.estado })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(EstadoUpdateResponse {
        ok: true,
        id: user.id,
        estado: user.estado,
    })
}

/// Toggles the login gate; independent of estado.
pub async fn update_user_dni_block(
    state: &AppState,
    auth: &AuthUser,
    user_id: Uuid,
    payload: DniBlockRequest,
) -> AppResult<DniBlockResponse> {
    auth.ensure_admin()?;

    let user = users::Entity::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let mut active: users::ActiveModel = user.into();
    active.dni_bloqueado = Set(payload.dni_bloqueado);
    active.actualizado_en = Set(Utc::now().into());
    let user = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(auth.user_id),
        "user_dni_block",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id, "dni_bloqueado": user.dni_bloqueado })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(DniBlockResponse {
        ok: true,
        id: user.id,
        dni_bloqueado: user.dni_bloqueado,
    })
}

/// Orders in the range (to-day inclusive), each with the buyer email and the
/// most recent payment attempt.
pub async fn list_orders(
    state: &AppState,
    auth: &AuthUser,
    query: AdminOrdersQuery,
) -> AppResult<Vec<AdminOrder>> {
    auth.ensure_admin()?;

    let start = query
        .from_date
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc();
    let end = (query.to_date + Duration::days(1))
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc();

    let rows = orders::Entity::find()
        .filter(orders::Column::CreatedAt.gte(start))
        .filter(orders::Column::CreatedAt.lt(end))
        .order_by_desc(orders::Column::CreatedAt)
        .all(&state.orm)
        .await?;

    let order_ids: Vec<Uuid> = rows.iter().map(|o| o.id).collect();
    let mut latest_payment: HashMap<Uuid, payments::Model> = HashMap::new();
    let payment_rows = payments::Entity::find()
        .filter(payments::Column::OrderId.is_in(order_ids))
        .order_by_asc(payments::Column::CreatedAt)
        .all(&state.orm)
        .await?;
    for payment in payment_rows {
        // Ascending order: the last write per order wins.
        latest_payment.insert(payment.order_id, payment);
    }

    let buyer_ids: Vec<Uuid> = rows.iter().filter_map(|o| o.user_id).collect();
    let emails: HashMap<Uuid, String> = users::Entity::find()
        .filter(users::Column::Id.is_in(buyer_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|u| (u.id, u.email))
        .collect();

    Ok(rows
        .into_iter()
        .map(|order| {
            let payment = latest_payment.remove(&order.id);
            AdminOrder {
                id: order.id,
                created_at: order.created_at.with_timezone(&Utc),
                user_id: order.user_id,
                user_email: order.user_id.and_then(|id| emails.get(&id).cloned()),
                status: order.status,
                total_amount: order.total_amount,
                payment_status: payment.as_ref().map(|p| p.status.clone()),
                tx_ref: payment.and_then(|p| p.tx_ref),
            }
        })
        .collect())
}
