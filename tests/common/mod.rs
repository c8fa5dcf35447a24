use marketplace_api::{
    db::{create_orm_conn, create_pool},
    dto::users::{AddressIn, BankingIn, CryptoWalletIn, RegisterUserRequest},
    entity::users,
    middleware::auth::{AuthUser, load_role_codes},
    models::User,
    services::user_service,
    state::AppState,
};
use sea_orm::EntityTrait;
use uuid::Uuid;

/// Connects to the test database, or returns None so the caller can skip when
/// the environment is not configured.
pub async fn try_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests."
            );
            return Ok(None);
        }
    };

    // Token mint/verify read the secret from the environment.
    unsafe {
        std::env::set_var("JWT_SECRET", "integration-test-secret");
    }

    let pool = create_pool(&database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    let orm = create_orm_conn(&database_url).await?;

    // Clean slate between runs; roles are reseeded below.
    sqlx::query(
        "TRUNCATE TABLE audit_logs, product_comments, payments, order_items, orders, \
         cart_items, carts, product_images, products, categories, kyc_documents, \
         crypto_wallets, banking_infos, addresses, user_roles, roles, users \
         RESTART IDENTITY CASCADE",
    )
    .execute(&pool)
    .await?;

    for (code, nombre) in [
        ("COMPRADOR", "Comprador"),
        ("VENDEDOR", "Vendedor"),
        ("ADMIN", "Administrador"),
    ] {
        sqlx::query("INSERT INTO roles (code, nombre) VALUES ($1, $2)")
            .bind(code)
            .bind(nombre)
            .execute(&pool)
            .await?;
    }

    Ok(Some(AppState { pool, orm }))
}

pub fn register_request(
    nombre: &str,
    email: &str,
    nro_doc: &str,
    roles: &[&str],
) -> RegisterUserRequest {
    let is_buyer = roles.contains(&"COMPRADOR");
    let is_seller = roles.contains(&"VENDEDOR");

    RegisterUserRequest {
        nombre: nombre.to_string(),
        apellido: "Test".to_string(),
        tipo_doc: "DNI".to_string(),
        nro_doc: nro_doc.to_string(),
        email: email.to_string(),
        tel: None,
        palabra_seg: None,
        password: "secreto123".to_string(),
        acepta_terminos: true,
        roles: roles.iter().map(|r| r.to_string()).collect(),
        domicilio_envio: None,
        domicilio_entrega: is_buyer.then(|| AddressIn {
            tipo: "ENTREGA".into(),
            calle_y_numero: "Calle Falsa 123".into(),
            ciudad: "CABA".into(),
            provincia: "BA".into(),
            pais: "AR".into(),
            cp: "1000".into(),
        }),
        banking: is_seller.then(|| BankingIn {
            cbu_o_alias: format!("alias.{nro_doc}"),
        }),
        wallets: if is_seller {
            vec![CryptoWalletIn {
                red: "TRC20".into(),
                address: format!("T{nro_doc}"),
            }]
        } else {
            Vec::new()
        },
    }
}

pub async fn register_user(
    state: &AppState,
    nombre: &str,
    email: &str,
    nro_doc: &str,
    roles: &[&str],
) -> anyhow::Result<User> {
    let user = user_service::register(state, register_request(nombre, email, nro_doc, roles)).await?;
    Ok(user)
}

/// Builds the per-request capability object the way the extractor would.
pub async fn auth_for(state: &AppState, user_id: Uuid) -> anyhow::Result<AuthUser> {
    let user = users::Entity::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .expect("user must exist");
    let codes = load_role_codes(&state.orm, user_id).await?;
    Ok(AuthUser::new(&user, codes))
}
