mod common;

use marketplace_api::{
    dto::{cart::{AddCartItemRequest, UpdateCartQtyRequest}, products::CreateProductRequest},
    entity::products,
    error::AppError,
    services::{cart_service, order_service, product_service},
};
use sea_orm::EntityTrait;
use uuid::Uuid;

async fn seed_product(
    state: &marketplace_api::state::AppState,
    seller: &marketplace_api::middleware::auth::AuthUser,
    name: &str,
    price: i64,
    stock: i32,
) -> anyhow::Result<Uuid> {
    let resp = product_service::create_product(
        state,
        seller,
        CreateProductRequest {
            name: name.into(),
            description: Some("producto de prueba".into()),
            price,
            stock,
            condition: "NUEVO".into(),
            category_id: None,
            subcategory: None,
            image_url: None,
            features: None,
            images: vec![],
            is_active: true,
        },
    )
    .await?;
    Ok(resp.data.expect("created product").id)
}

async fn stock_of(
    state: &marketplace_api::state::AppState,
    product_id: Uuid,
) -> anyhow::Result<i32> {
    let product = products::Entity::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .expect("product row");
    Ok(product.stock)
}

// Reservation at add-time, no release on removal, and the atomic checkout.
#[tokio::test]
async fn cart_reservation_and_checkout_flow() -> anyhow::Result<()> {
    let Some(state) = common::try_state().await? else {
        return Ok(());
    };

    let seller = common::register_user(
        &state,
        "Sofía",
        "sofia@example.com",
        "30000001",
        &["VENDEDOR"],
    )
    .await?;
    let buyer = common::register_user(
        &state,
        "Bruno",
        "bruno@example.com",
        "30000002",
        &["COMPRADOR"],
    )
    .await?;
    let auth_seller = common::auth_for(&state, seller.id).await?;
    let auth_buyer = common::auth_for(&state, buyer.id).await?;

    let product_id = seed_product(&state, &auth_seller, "Mate Imperial", 1000, 5).await?;

    // Checkout with nothing in the cart is a 400 and creates no order.
    let empty = order_service::checkout(&state, &auth_buyer).await;
    assert!(matches!(empty, Err(AppError::BadRequest(_))));
    assert!(order_service::list_my_orders(&state, &auth_buyer)
        .await?
        .is_empty());

    // Adding 2 of stock 5 reserves immediately: stock drops to 3.
    let cart = cart_service::add_item(
        &state,
        &auth_buyer,
        AddCartItemRequest {
            product_id,
            qty: 2,
        },
    )
    .await?;
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].qty, 2);
    assert_eq!(cart.total, 2000);
    assert_eq!(stock_of(&state, product_id).await?, 3);

    // Asking for more than the remaining stock fails and changes nothing.
    let too_many = cart_service::add_item(
        &state,
        &auth_buyer,
        AddCartItemRequest {
            product_id,
            qty: 10,
        },
    )
    .await;
    assert!(matches!(too_many, Err(AppError::BadRequest(_))));
    assert_eq!(stock_of(&state, product_id).await?, 3);

    let zero = cart_service::add_item(
        &state,
        &auth_buyer,
        AddCartItemRequest {
            product_id,
            qty: 0,
        },
    )
    .await;
    assert!(matches!(zero, Err(AppError::BadRequest(_))));

    // Quantity updates do not touch the reservation.
    let item_id = cart.items[0].id;
    cart_service::update_item_qty(
        &state,
        &auth_buyer,
        item_id,
        UpdateCartQtyRequest { qty: 1 },
    )
    .await?;
    assert_eq!(stock_of(&state, product_id).await?, 3);

    // Another user cannot touch the line.
    let stranger = common::register_user(
        &state,
        "Extraño",
        "extrano@example.com",
        "30000003",
        &["COMPRADOR"],
    )
    .await?;
    let auth_stranger = common::auth_for(&state, stranger.id).await?;
    let foreign = cart_service::remove_item(&state, &auth_stranger, item_id).await;
    assert!(matches!(foreign, Err(AppError::NotFound(_))));

    // Removing the line does NOT restore the stock.
    cart_service::remove_item(&state, &auth_buyer, item_id).await?;
    assert_eq!(stock_of(&state, product_id).await?, 3);
    assert_eq!(cart_service::get_cart(&state, &auth_buyer).await?.total, 0);

    // Refill the cart and check out for real.
    let cart = cart_service::add_item(
        &state,
        &auth_buyer,
        AddCartItemRequest {
            product_id,
            qty: 3,
        },
    )
    .await?;
    assert_eq!(cart.total, 3000);
    assert_eq!(stock_of(&state, product_id).await?, 0);

    let order = order_service::checkout(&state, &auth_buyer).await?;
    assert_eq!(order.status, "pending_admin");
    assert_eq!(order.total_amount, 3000);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].quantity, 3);
    assert_eq!(order.items[0].seller_id, Some(seller.id));

    // The cart is emptied by the same transaction.
    assert!(cart_service::get_cart(&state, &auth_buyer)
        .await?
        .items
        .is_empty());

    // A second checkout sees an empty cart again.
    let again = order_service::checkout(&state, &auth_buyer).await;
    assert!(matches!(again, Err(AppError::BadRequest(_))));

    // The seller-side listing attributes the order through seller_id.
    let seller_orders = order_service::list_seller_orders(&state, &auth_seller).await?;
    assert_eq!(seller_orders.len(), 1);
    assert_eq!(seller_orders[0].id, order.id);

    // Payment attempts attach to the buyer's own order only.
    let payment = order_service::record_payment(
        &state,
        &auth_buyer,
        order.id,
        marketplace_api::dto::orders::RecordPaymentRequest {
            provider: "TRANSFER".into(),
            amount: order.total_amount,
            tx_ref: Some("tx-123".into()),
        },
    )
    .await?;
    assert_eq!(payment.status, "PENDIENTE");

    let not_mine = order_service::record_payment(
        &state,
        &auth_stranger,
        order.id,
        marketplace_api::dto::orders::RecordPaymentRequest {
            provider: "TRANSFER".into(),
            amount: 1,
            tx_ref: None,
        },
    )
    .await;
    assert!(matches!(not_mine, Err(AppError::NotFound(_))));

    Ok(())
}
