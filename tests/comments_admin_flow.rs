mod common;

use chrono::Utc;
use marketplace_api::{
    dto::{
        admin::{AdminOrdersQuery, AdminUserQuery, EstadoUpdateRequest},
        analytics::RangeQuery,
        cart::AddCartItemRequest,
        comments::CreateCommentRequest,
        premium::PremiumConfirmRequest,
        products::CreateProductRequest,
    },
    entity::orders,
    error::AppError,
    services::{
        admin_service, analytics_service, cart_service, comment_service, order_service,
        premium_service, product_service,
    },
};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

// Purchase-gated comments, admin moderation, premium, and analytics reads.
#[tokio::test]
async fn comments_admin_premium_and_analytics_flow() -> anyhow::Result<()> {
    let Some(state) = common::try_state().await? else {
        return Ok(());
    };

    let seller = common::register_user(
        &state,
        "Sofía",
        "sofia@example.com",
        "31000001",
        &["VENDEDOR"],
    )
    .await?;
    let buyer = common::register_user(
        &state,
        "Bruno",
        "bruno@example.com",
        "31000002",
        &["COMPRADOR"],
    )
    .await?;
    let admin =
        common::register_user(&state, "Root", "root@example.com", "31000003", &["ADMIN"]).await?;

    let auth_seller = common::auth_for(&state, seller.id).await?;
    let auth_buyer = common::auth_for(&state, buyer.id).await?;
    let auth_admin = common::auth_for(&state, admin.id).await?;

    let product = product_service::create_product(
        &state,
        &auth_seller,
        CreateProductRequest {
            name: "Termo Acero".into(),
            description: None,
            price: 5000,
            stock: 10,
            condition: "NUEVO".into(),
            category_id: None,
            subcategory: None,
            image_url: None,
            features: None,
            images: vec![],
            is_active: true,
        },
    )
    .await?
    .data
    .expect("product");

    cart_service::add_item(
        &state,
        &auth_buyer,
        AddCartItemRequest {
            product_id: product.id,
            qty: 2,
        },
    )
    .await?;
    let order = order_service::checkout(&state, &auth_buyer).await?;

    // No delivered purchase yet: the comment is rejected.
    let premature = comment_service::create_comment(
        &state,
        &auth_buyer,
        CreateCommentRequest {
            product_id: product.id,
            rating: 9,
            text: Some("excelente".into()),
        },
    )
    .await;
    assert!(matches!(premature, Err(AppError::Forbidden(_))));

    // Deliver the order; the same payload now succeeds.
    let row = orders::Entity::find_by_id(order.id)
        .one(&state.orm)
        .await?
        .expect("order row");
    let mut active: orders::ActiveModel = row.into();
    active.status = Set("Entregado".into());
    active.update(&state.orm).await?;

    let first = comment_service::create_comment(
        &state,
        &auth_buyer,
        CreateCommentRequest {
            product_id: product.id,
            rating: 9,
            text: Some("excelente".into()),
        },
    )
    .await?;

    let out_of_range = comment_service::create_comment(
        &state,
        &auth_buyer,
        CreateCommentRequest {
            product_id: product.id,
            rating: 11,
            text: None,
        },
    )
    .await;
    assert!(matches!(out_of_range, Err(AppError::BadRequest(_))));

    // Multiple comments per (user, product) are allowed; newest first.
    let second = comment_service::create_comment(
        &state,
        &auth_buyer,
        CreateCommentRequest {
            product_id: product.id,
            rating: 7,
            text: Some("sigue andando".into()),
        },
    )
    .await?;
    let listed = comment_service::list_comments(&state, Some(product.id)).await?;
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);

    // Only an admin deletes comments.
    let not_admin = comment_service::delete_comment(&state, &auth_buyer, first.id).await;
    assert!(matches!(not_admin, Err(AppError::Forbidden(_))));
    comment_service::delete_comment(&state, &auth_admin, first.id).await?;
    assert_eq!(
        comment_service::list_comments(&state, Some(product.id))
            .await?
            .len(),
        1
    );

    // estado accepts any member of the vocabulary from any current value.
    for estado in ["REVISION", "BLOQUEADO", "ACTIVO"] {
        let resp = admin_service::update_user_estado(
            &state,
            &auth_admin,
            buyer.id,
            EstadoUpdateRequest {
                estado: estado.into(),
            },
        )
        .await?;
        assert_eq!(resp.estado, estado);
    }
    let invalid = admin_service::update_user_estado(
        &state,
        &auth_admin,
        buyer.id,
        EstadoUpdateRequest {
            estado: "SUSPENDIDO".into(),
        },
    )
    .await;
    assert!(matches!(invalid, Err(AppError::BadRequest(_))));

    let not_admin = admin_service::list_users(
        &state,
        &auth_buyer,
        AdminUserQuery {
            estado: None,
            solo_nuevos: false,
            dias: None,
        },
    )
    .await;
    assert!(matches!(not_admin, Err(AppError::Forbidden(_))));

    // Order review includes the latest payment attempt.
    order_service::record_payment(
        &state,
        &auth_buyer,
        order.id,
        marketplace_api::dto::orders::RecordPaymentRequest {
            provider: "MP".into(),
            amount: order.total_amount,
            tx_ref: Some("mp-001".into()),
        },
    )
    .await?;

    let today = Utc::now().date_naive();
    let reviewed = admin_service::list_orders(
        &state,
        &auth_admin,
        AdminOrdersQuery {
            from_date: today,
            to_date: today,
        },
    )
    .await?;
    let row = reviewed
        .iter()
        .find(|o| o.id == order.id)
        .expect("order in range");
    assert_eq!(row.user_email.as_deref(), Some("bruno@example.com"));
    assert_eq!(row.payment_status.as_deref(), Some("PENDIENTE"));
    assert_eq!(row.tx_ref.as_deref(), Some("mp-001"));

    // Premium: hash and exact amount required, then the flag flips.
    let no_hash = premium_service::confirm_payment(
        &state,
        &auth_buyer,
        PremiumConfirmRequest {
            tx_hash: None,
            amount: Some(20),
            network: None,
        },
    )
    .await;
    assert!(matches!(no_hash, Err(AppError::BadRequest(_))));

    let wrong_amount = premium_service::confirm_payment(
        &state,
        &auth_buyer,
        PremiumConfirmRequest {
            tx_hash: Some("0xabc".into()),
            amount: Some(10),
            network: Some("TRC20".into()),
        },
    )
    .await;
    assert!(matches!(wrong_amount, Err(AppError::BadRequest(_))));

    premium_service::confirm_payment(
        &state,
        &auth_buyer,
        PremiumConfirmRequest {
            tx_hash: Some("0xabc".into()),
            amount: Some(20),
            network: Some("TRC20".into()),
        },
    )
    .await?;
    let refreshed = common::auth_for(&state, buyer.id).await?;
    assert!(premium_service::status(&refreshed).await.active);

    // Read-side aggregations re-derive from the order items.
    let dashboard = analytics_service::seller_dashboard(&state, &auth_seller).await?;
    assert_eq!(dashboard.kpis.total_sales, order.total_amount);
    assert_eq!(dashboard.kpis.orders_count, 1);

    let buyer_view = analytics_service::buyer_dashboard(&state, &auth_buyer).await?;
    assert_eq!(buyer_view.kpis.total_spent, order.total_amount);

    // A caller with no seller-attributed items falls back to the buyer view.
    let range = RangeQuery {
        start: today.to_string(),
        end: today.to_string(),
    };
    let summary = analytics_service::sales_summary(&state, &auth_buyer, range).await?;
    assert_eq!(summary.total_sales, order.total_amount);

    let daily = analytics_service::sales_daily(
        &state,
        &auth_seller,
        RangeQuery {
            start: today.to_string(),
            end: today.to_string(),
        },
    )
    .await?;
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0].total, order.total_amount);

    let global = analytics_service::global_metrics(&state).await?;
    assert_eq!(global.total_users, 3);
    assert_eq!(global.total_products, 1);

    Ok(())
}
