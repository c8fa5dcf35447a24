pub mod admin;
pub mod analytics;
pub mod auth;
pub mod cart;
pub mod comments;
pub mod orders;
pub mod premium;
pub mod products;
pub mod users;
