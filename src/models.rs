use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub tel: Option<String>,
    pub roles: Vec<String>,
    pub estado: String,
    pub dni_bloqueado: bool,
    pub premium: bool,
    pub creado_en: DateTime<Utc>,
}

impl User {
    pub fn from_entity(model: entity::users::Model, roles: Vec<String>) -> Self {
        Self {
            id: model.id,
            nombre: model.nombre,
            apellido: model.apellido,
            email: model.email,
            tel: model.tel,
            roles,
            estado: model.estado,
            dni_bloqueado: model.dni_bloqueado,
            premium: model.premium,
            creado_en: model.creado_en.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Role {
    pub id: i32,
    pub code: String,
    pub nombre: String,
}

impl From<entity::roles::Model> for Role {
    fn from(model: entity::roles::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            nombre: model.nombre,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductImage {
    pub id: Uuid,
    pub url: String,
    pub sort_order: i32,
}

impl From<entity::product_images::Model> for ProductImage {
    fn from(model: entity::product_images::Model) -> Self {
        Self {
            id: model.id,
            url: model.url,
            sort_order: model.sort_order,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub seller_name: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub stock: i32,
    pub condition: String,
    pub rating: f64,
    pub sold_count: i32,
    pub image_url: Option<String>,
    pub features: Option<String>,
    pub category_id: Option<Uuid>,
    pub subcategory: Option<String>,
    pub is_active: bool,
    pub images: Vec<ProductImage>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn from_entity(
        model: entity::products::Model,
        seller_name: Option<String>,
        mut images: Vec<entity::product_images::Model>,
    ) -> Self {
        images.sort_by_key(|im| im.sort_order);
        Self {
            id: model.id,
            seller_id: model.seller_id,
            seller_name,
            name: model.name,
            description: model.description,
            price: model.price,
            stock: model.stock,
            condition: model.condition,
            rating: model.rating,
            sold_count: model.sold_count,
            image_url: model.image_url,
            features: model.features,
            category_id: model.category_id,
            subcategory: model.subcategory,
            is_active: model.is_active,
            images: images.into_iter().map(ProductImage::from).collect(),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub price: i64,
    pub qty: i32,
    pub image: Option<String>,
    pub seller: Option<String>,
    pub seller_id: Option<Uuid>,
    pub stock_snapshot: i32,
}

impl From<entity::cart_items::Model> for CartItem {
    fn from(model: entity::cart_items::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            name: model.name,
            price: model.price,
            qty: model.qty,
            image: model.image,
            seller: model.seller,
            seller_id: model.seller_id,
            stock_snapshot: model.stock_snapshot,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<CartItem>,
    /// Σ(price × qty) over the lines, computed on read.
    pub total: i64,
}

impl Cart {
    pub fn from_entity(
        model: entity::carts::Model,
        items: Vec<entity::cart_items::Model>,
    ) -> Self {
        let total = items.iter().map(|i| i.price * i.qty as i64).sum();
        Self {
            id: model.id,
            user_id: model.user_id,
            items: items.into_iter().map(CartItem::from).collect(),
            total,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub seller: Option<String>,
    pub seller_id: Option<Uuid>,
    pub company: Option<String>,
    pub quantity: i32,
    pub unit_price: i64,
}

impl From<entity::order_items::Model> for OrderItem {
    fn from(model: entity::order_items::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            product_name: model.product_name,
            category: model.category,
            subcategory: model.subcategory,
            seller: model.seller,
            seller_id: model.seller_id,
            company: model.company,
            quantity: model.quantity,
            unit_price: model.unit_price,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub user_name: Option<String>,
    pub status: String,
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn from_entity(
        model: entity::orders::Model,
        items: Vec<entity::order_items::Model>,
    ) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            user_name: model.user_name,
            status: model.status,
            total_amount: model.total_amount,
            created_at: model.created_at.with_timezone(&Utc),
            items: items.into_iter().map(OrderItem::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub provider: String,
    pub status: String,
    pub amount: i64,
    pub tx_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<entity::payments::Model> for Payment {
    fn from(model: entity::payments::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            provider: model.provider,
            status: model.status,
            amount: model.amount,
            tx_ref: model.tx_ref,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Comment {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub text: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<entity::product_comments::Model> for Comment {
    fn from(model: entity::product_comments::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            user_id: model.user_id,
            rating: model.rating,
            text: model.text,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct KycDocument {
    pub id: Uuid,
    pub tipo: String,
    pub filename: String,
    pub mime: String,
    pub size_bytes: i64,
    pub subido_en: DateTime<Utc>,
}

impl From<entity::kyc_documents::Model> for KycDocument {
    fn from(model: entity::kyc_documents::Model) -> Self {
        Self {
            id: model.id,
            tipo: model.tipo,
            filename: model.filename,
            mime: model.mime,
            size_bytes: model.size_bytes,
            subido_en: model.subido_en.with_timezone(&Utc),
        }
    }
}
