use std::collections::HashSet;

use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    dto::auth::Claims,
    entity::{roles, user_roles, users},
    error::AppError,
    state::AppState,
};

pub const ROLE_COMPRADOR: &str = "COMPRADOR";
pub const ROLE_VENDEDOR: &str = "VENDEDOR";
pub const ROLE_ADMIN: &str = "ADMIN";

/// Authorization capability computed once per request from the bearer token:
/// the authenticated user plus their role codes, loaded from the database.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
    pub premium: bool,
    pub roles: HashSet<String>,
}

impl AuthUser {
    pub fn new(user: &users::Model, codes: impl IntoIterator<Item = String>) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            display_name: user.display_name(),
            premium: user.premium,
            roles: codes.into_iter().collect(),
        }
    }

    pub fn has_role(&self, code: &str) -> bool {
        self.roles.contains(code)
    }

    pub fn ensure_role(&self, code: &str) -> Result<(), AppError> {
        if !self.has_role(code) {
            return Err(AppError::Forbidden(format!("{code} role required")));
        }
        Ok(())
    }

    pub fn ensure_admin(&self) -> Result<(), AppError> {
        self.ensure_role(ROLE_ADMIN)
    }

    pub fn ensure_vendor(&self) -> Result<(), AppError> {
        self.ensure_role(ROLE_VENDEDOR)
    }

    pub fn is_self_or_admin(&self, user_id: Uuid) -> bool {
        self.user_id == user_id || self.has_role(ROLE_ADMIN)
    }

    pub fn ensure_self_or_admin(&self, user_id: Uuid) -> Result<(), AppError> {
        if !self.is_self_or_admin(user_id) {
            return Err(AppError::Forbidden("not authorized".into()));
        }
        Ok(())
    }
}

pub fn jwt_secret() -> Result<String, AppError> {
    std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))
}

pub async fn load_role_codes<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<Vec<String>, AppError> {
    let rows = user_roles::Entity::find()
        .filter(user_roles::Column::UserId.eq(user_id))
        .find_also_related(roles::Entity)
        .all(conn)
        .await?;
    Ok(rows
        .into_iter()
        .filter_map(|(_, role)| role.map(|r| r.code))
        .collect())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        if !auth_str.starts_with("Bearer ") {
            return Err(AppError::Unauthorized("Invalid Authorization scheme".into()));
        }
        let token = auth_str.trim_start_matches("Bearer ").trim();

        let secret = jwt_secret()?;
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

        let user_id = Uuid::parse_str(&decoded.claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

        let user = users::Entity::find_by_id(user_id)
            .one(&state.orm)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

        let codes = load_role_codes(&state.orm, user.id).await?;
        Ok(AuthUser::new(&user, codes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn auth_user_with_roles(codes: &[&str]) -> AuthUser {
        let user = users::Model {
            id: Uuid::new_v4(),
            nombre: "Ana".into(),
            apellido: "García".into(),
            tipo_doc: "DNI".into(),
            nro_doc: "30111222".into(),
            email: "ana@example.com".into(),
            tel: None,
            palabra_seg: None,
            password_hash: "x".into(),
            acepta_terminos: true,
            estado: "ACTIVO".into(),
            dni_bloqueado: false,
            premium: false,
            reset_code_hash: None,
            reset_code_expires_at: None,
            creado_en: Utc::now().into(),
            actualizado_en: Utc::now().into(),
        };
        AuthUser::new(&user, codes.iter().map(|c| c.to_string()))
    }

    #[test]
    fn role_checks_are_set_membership() {
        let user = auth_user_with_roles(&[ROLE_COMPRADOR, ROLE_VENDEDOR]);
        assert!(user.has_role(ROLE_VENDEDOR));
        assert!(user.ensure_vendor().is_ok());
        assert!(user.ensure_admin().is_err());
    }

    #[test]
    fn self_or_admin_allows_owner_and_admin() {
        let owner = auth_user_with_roles(&[ROLE_COMPRADOR]);
        assert!(owner.ensure_self_or_admin(owner.user_id).is_ok());
        assert!(owner.ensure_self_or_admin(Uuid::new_v4()).is_err());

        let admin = auth_user_with_roles(&[ROLE_ADMIN]);
        assert!(admin.ensure_self_or_admin(Uuid::new_v4()).is_ok());
    }

    #[test]
    fn display_name_joins_nombre_apellido() {
        let user = auth_user_with_roles(&[]);
        assert_eq!(user.display_name, "Ana García");
    }
}
