pub mod admin_service;
pub mod analytics_service;
pub mod auth_service;
pub mod cart_service;
pub mod comment_service;
pub mod order_service;
pub mod premium_service;
pub mod product_service;
pub mod user_service;
