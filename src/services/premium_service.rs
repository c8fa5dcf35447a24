use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use crate::{
    audit::log_audit,
    dto::premium::{PremiumConfirmRequest, PremiumConfirmResponse, PremiumStatus},
    entity::users,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    state::AppState,
};

/// Expected amount of the off-platform premium payment, in USDT.
const PREMIUM_AMOUNT_USDT: i64 = 20;

/// Activates premium after an off-platform crypto payment. The payment is
/// trusted on its face: a transaction hash and the exact amount. No chain
/// verification happens here.
pub async fn confirm_payment(
    state: &AppState,
    auth: &AuthUser,
    payload: PremiumConfirmRequest,
) -> AppResult<PremiumConfirmResponse> {
    let tx_hash = payload
        .tx_hash
        .filter(|h| !h.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing transaction hash".into()))?;

    if payload.amount != Some(PREMIUM_AMOUNT_USDT) {
        return Err(AppError::BadRequest(format!(
            "Invalid amount. Must be {PREMIUM_AMOUNT_USDT} USDT"
        )));
    }

    let user = users::Entity::find_by_id(auth.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let mut active: users::ActiveModel = user.into();
    active.premium = Set(true);
    let user = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        "premium_confirm",
        Some("users"),
        Some(serde_json::json!({ "tx_hash": tx_hash, "network": payload.network })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(PremiumConfirmResponse {
        status: "ok".into(),
        message: "Premium activated".into(),
        tx_hash,
        network: payload.network,
        user_id: user.id,
    })
}

pub async fn status(auth: &AuthUser) -> PremiumStatus {
    PremiumStatus {
        active: auth.premium,
    }
}
