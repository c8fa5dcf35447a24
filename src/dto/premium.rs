use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct PremiumConfirmRequest {
    pub tx_hash: Option<String>,
    pub amount: Option<i64>,
    pub network: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PremiumConfirmResponse {
    pub status: String,
    pub message: String,
    pub tx_hash: String,
    pub network: Option<String>,
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PremiumStatus {
    pub active: bool,
}
