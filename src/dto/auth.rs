use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token subject is the user id; roles are loaded from the database on every
/// request rather than trusted from the token.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginUser {
    pub id: Uuid,
    pub email: String,
    pub roles: Vec<String>,
    pub premium: bool,
    pub dni_bloqueado: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: LoginUser,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ForgotStartRequest {
    pub email: String,
}

/// The temporary code is returned in-band: email delivery is out of scope.
#[derive(Debug, Serialize, ToSchema)]
pub struct ForgotStartResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_minutes: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ForgotFinishRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OkResponse {
    pub ok: bool,
}
