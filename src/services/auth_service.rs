use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::{
    audit::log_audit,
    dto::auth::{
        Claims, ForgotFinishRequest, ForgotStartRequest, ForgotStartResponse, LoginRequest,
        LoginResponse, LoginUser, OkResponse,
    },
    entity::users,
    error::{AppError, AppResult},
    middleware::auth::{jwt_secret, load_role_codes},
    state::AppState,
};

const RESET_CODE_TTL_MINUTES: i64 = 15;
const TOKEN_TTL_HOURS: i64 = 24;

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

pub fn mint_token(user_id: uuid::Uuid) -> AppResult<String> {
    let secret = jwt_secret()?;
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub async fn login(state: &AppState, payload: LoginRequest) -> AppResult<LoginResponse> {
    let LoginRequest { email, password } = payload;

    let user = users::Entity::find()
        .filter(users::Column::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;

    // Same detail whether the email is unknown or the password is wrong:
    // login must not leak user existence.
    let user = match user {
        Some(u) if verify_password(&password, &u.password_hash) => u,
        _ => return Err(AppError::Unauthorized("Invalid credentials".into())),
    };

    // Blocked document gates login regardless of estado.
    if user.dni_bloqueado {
        return Err(AppError::Forbidden(
            "The user's document is blocked. Login is not allowed.".into(),
        ));
    }

    let token = mint_token(user.id)?;
    let roles = load_role_codes(&state.orm, user.id).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        "user_login",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(LoginResponse {
        access_token: token,
        token_type: "bearer".into(),
        user: LoginUser {
            id: user.id,
            email: user.email,
            roles,
            premium: user.premium,
            dni_bloqueado: user.dni_bloqueado,
        },
    })
}

/// First step of the reset flow. Always answers ok, whether or not the email
/// exists; the temporary code is returned in-band since email delivery is out
/// of scope.
pub async fn forgot_start(
    state: &AppState,
    payload: ForgotStartRequest,
) -> AppResult<ForgotStartResponse> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::BadRequest("Email required".into()));
    }

    let user = users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(&state.orm)
        .await?;

    let user = match user {
        Some(u) => u,
        None => {
            return Ok(ForgotStartResponse {
                ok: true,
                temp_password: None,
                expires_in_minutes: None,
            });
        }
    };

    let temp_password = uuid::Uuid::new_v4().simple().to_string();
    let expires_at = Utc::now() + Duration::minutes(RESET_CODE_TTL_MINUTES);

    let mut active: users::ActiveModel = user.into();
    active.reset_code_hash = Set(Some(hash_password(&temp_password)?));
    active.reset_code_expires_at = Set(Some(expires_at.into()));
    active.update(&state.orm).await?;

    Ok(ForgotStartResponse {
        ok: true,
        temp_password: Some(temp_password),
        expires_in_minutes: Some(RESET_CODE_TTL_MINUTES),
    })
}

/// Second step: validates expiry, then the code against the stored hash, then
/// overwrites the real password and clears the reset fields.
pub async fn forgot_finish(
    state: &AppState,
    payload: ForgotFinishRequest,
) -> AppResult<OkResponse> {
    let email = payload.email.trim().to_lowercase();
    let code = payload.code.trim();
    if email.is_empty() || code.is_empty() || payload.new_password.is_empty() {
        return Err(AppError::BadRequest("Incomplete data".into()));
    }

    let user = users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(&state.orm)
        .await?;

    let user = match user {
        Some(u) => u,
        None => return Ok(OkResponse { ok: true }),
    };

    match user.reset_code_expires_at {
        Some(expires_at) if expires_at.with_timezone(&Utc) >= Utc::now() => {}
        _ => return Err(AppError::BadRequest("Temporary password expired".into())),
    }

    let valid = user
        .reset_code_hash
        .as_deref()
        .map(|hash| verify_password(code, hash))
        .unwrap_or(false);
    if !valid {
        return Err(AppError::BadRequest("Invalid temporary password".into()));
    }

    let new_hash = hash_password(&payload.new_password)?;
    let mut active: users::ActiveModel = user.into();
    active.password_hash = Set(new_hash);
    active.reset_code_hash = Set(None);
    active.reset_code_expires_at = Set(None);
    active.actualizado_en = Set(Utc::now().into());
    active.update(&state.orm).await?;

    Ok(OkResponse { ok: true })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("secreto123").unwrap();
        assert!(verify_password("secreto123", &hash));
        assert!(!verify_password("otra-clave", &hash));
    }

    #[test]
    fn verify_rejects_malformed_hash() {
        assert!(!verify_password("whatever", "not-a-phc-string"));
    }
}
