use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminUserQuery {
    /// ACTIVO | REVISION | BLOQUEADO
    pub estado: Option<String>,
    #[serde(default)]
    pub solo_nuevos: bool,
    /// Window in days for `solo_nuevos`, clamped to 1..=365.
    pub dias: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EstadoUpdateRequest {
    pub estado: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EstadoUpdateResponse {
    pub ok: bool,
    pub id: Uuid,
    pub estado: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DniBlockRequest {
    pub dni_bloqueado: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DniBlockResponse {
    pub ok: bool,
    pub id: Uuid,
    pub dni_bloqueado: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminOrdersQuery {
    #[serde(rename = "from")]
    pub from_date: NaiveDate,
    #[serde(rename = "to")]
    pub to_date: NaiveDate,
}

/// Order review row: buyer email plus the latest payment attempt, if any.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminOrder {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub user_email: Option<String>,
    pub status: String,
    pub total_amount: i64,
    pub payment_status: Option<String>,
    pub tx_ref: Option<String>,
}
