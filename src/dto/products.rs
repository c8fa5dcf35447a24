use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub stock: i32,
    #[serde(default = "default_condition")]
    pub condition: String,
    pub category_id: Option<Uuid>,
    pub subcategory: Option<String>,
    pub image_url: Option<String>,
    pub features: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_condition() -> String {
    "NUEVO".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i32>,
    pub condition: Option<String>,
    pub category_id: Option<Uuid>,
    pub subcategory: Option<String>,
    pub image_url: Option<String>,
    pub features: Option<String>,
    /// When present, replaces the image list wholesale.
    pub images: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}
