use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin::{AdminOrder, DniBlockRequest, DniBlockResponse, EstadoUpdateRequest, EstadoUpdateResponse},
        analytics::{BuyerDashboard, GlobalMetrics, SalesSummary, SellerDashboard},
        auth::{ForgotFinishRequest, ForgotStartRequest, ForgotStartResponse, LoginRequest, LoginResponse},
        cart::{AddCartItemRequest, UpdateCartQtyRequest},
        comments::{CommentList, CreateCommentRequest},
        orders::{OrderList, RecordPaymentRequest},
        premium::{PremiumConfirmRequest, PremiumConfirmResponse, PremiumStatus},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        users::{KycDocumentIn, RegisterUserRequest, UpdateUserRequest},
    },
    models::{Cart, CartItem, Comment, KycDocument, Order, OrderItem, Payment, Product, Role, User},
    response::{ApiResponse, Meta},
    routes::{admin, analytics, auth, cart, comments, health, orders, params, premium, products, roles, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::forgot_start,
        auth::forgot_finish,
        users::register,
        users::get_user,
        users::update_user,
        users::delete_user,
        users::register_kyc,
        roles::list_roles,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        cart::get_cart,
        cart::add_item,
        cart::update_item_qty,
        cart::remove_item,
        orders::list_my_orders,
        orders::checkout,
        orders::list_seller_orders,
        orders::record_payment,
        comments::list_comments,
        comments::create_comment,
        comments::delete_comment,
        analytics::global_metrics,
        analytics::orders_between,
        analytics::sales_summary,
        analytics::sales_daily,
        analytics::category_margins,
        analytics::top_products,
        analytics::operations,
        analytics::seller_dashboard,
        analytics::buyer_dashboard,
        admin::list_users,
        admin::update_user_estado,
        admin::update_user_dni_block,
        admin::list_orders,
        premium::confirm,
        premium::status
    ),
    components(
        schemas(
            User,
            Role,
            Product,
            Cart,
            CartItem,
            Order,
            OrderItem,
            Payment,
            Comment,
            KycDocument,
            LoginRequest,
            LoginResponse,
            ForgotStartRequest,
            ForgotStartResponse,
            ForgotFinishRequest,
            RegisterUserRequest,
            UpdateUserRequest,
            KycDocumentIn,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            AddCartItemRequest,
            UpdateCartQtyRequest,
            OrderList,
            RecordPaymentRequest,
            CreateCommentRequest,
            CommentList,
            GlobalMetrics,
            SalesSummary,
            SellerDashboard,
            BuyerDashboard,
            EstadoUpdateRequest,
            EstadoUpdateResponse,
            DniBlockRequest,
            DniBlockResponse,
            AdminOrder,
            PremiumConfirmRequest,
            PremiumConfirmResponse,
            PremiumStatus,
            params::Pagination,
            params::ProductQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Cart>,
            ApiResponse<Order>,
            ApiResponse<OrderList>,
            ApiResponse<User>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication and password reset"),
        (name = "Users", description = "Registration and profile management"),
        (name = "Roles", description = "Role vocabulary"),
        (name = "Products", description = "Product catalog"),
        (name = "Cart", description = "Cart with stock reservation"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "Comments", description = "Purchase-gated product comments"),
        (name = "Analytics", description = "Seller/buyer aggregations"),
        (name = "Admin", description = "User moderation and order review"),
        (name = "Premium", description = "Premium subscription flag"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
