pub mod addresses;
pub mod audit_logs;
pub mod banking_infos;
pub mod cart_items;
pub mod carts;
pub mod categories;
pub mod crypto_wallets;
pub mod kyc_documents;
pub mod order_items;
pub mod orders;
pub mod payments;
pub mod product_comments;
pub mod product_images;
pub mod products;
pub mod roles;
pub mod user_roles;
pub mod users;

pub use addresses::Entity as Addresses;
pub use audit_logs::Entity as AuditLogs;
pub use banking_infos::Entity as BankingInfos;
pub use cart_items::Entity as CartItems;
pub use carts::Entity as Carts;
pub use categories::Entity as Categories;
pub use crypto_wallets::Entity as CryptoWallets;
pub use kyc_documents::Entity as KycDocuments;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use payments::Entity as Payments;
pub use product_comments::Entity as ProductComments;
pub use product_images::Entity as ProductImages;
pub use products::Entity as Products;
pub use roles::Entity as Roles;
pub use user_roles::Entity as UserRoles;
pub use users::Entity as Users;
