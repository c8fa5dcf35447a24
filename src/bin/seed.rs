use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use marketplace_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    seed_roles(&pool).await?;

    let admin_id = ensure_user(
        &pool,
        "Admin",
        "General",
        "admin@example.com",
        "40000001",
        "admin123",
        &["ADMIN"],
    )
    .await?;
    let seller_id = ensure_user(
        &pool,
        "Sofía",
        "Vendedora",
        "sofia@example.com",
        "40000002",
        "seller123",
        &["VENDEDOR", "COMPRADOR"],
    )
    .await?;
    let buyer_id = ensure_user(
        &pool,
        "Bruno",
        "Comprador",
        "bruno@example.com",
        "40000003",
        "buyer123",
        &["COMPRADOR"],
    )
    .await?;

    seed_products(&pool, seller_id).await?;

    println!("Seed completed. Admin: {admin_id}, Seller: {seller_id}, Buyer: {buyer_id}");
    Ok(())
}

async fn seed_roles(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let base = [
        ("COMPRADOR", "Comprador"),
        ("VENDEDOR", "Vendedor"),
        ("ADMIN", "Administrador"),
    ];
    for (code, nombre) in base {
        sqlx::query("INSERT INTO roles (code, nombre) VALUES ($1, $2) ON CONFLICT (code) DO NOTHING")
            .bind(code)
            .bind(nombre)
            .execute(pool)
            .await?;
    }
    println!("Seeded roles");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    nombre: &str,
    apellido: &str,
    email: &str,
    nro_doc: &str,
    password: &str,
    roles: &[&str],
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, nombre, apellido, tipo_doc, nro_doc, email, password_hash, acepta_terminos)
        VALUES ($1, $2, $3, 'DNI', $4, $5, $6, TRUE)
        ON CONFLICT (email) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(nombre)
    .bind(apellido)
    .bind(nro_doc)
    .bind(email)
    .bind(password_hash)
    .fetch_optional(pool)
    .await?;

    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    for role in roles {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT $1, id FROM roles WHERE code = $2
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role)
        .execute(pool)
        .await?;
    }

    println!("Ensured user {email} (roles={roles:?})");
    Ok(user_id)
}

async fn seed_products(pool: &sqlx::PgPool, seller_id: Uuid) -> anyhow::Result<()> {
    let products = [
        ("Mate Imperial", "Mate de calabaza forrado en cuero", 2500000i64, 30),
        ("Termo Acero 1L", "Termo de acero inoxidable", 4800000, 50),
        ("Bombilla Alpaca", "Bombilla pico de loro", 900000, 120),
        ("Yerbera de Cuero", "Yerbera artesanal", 1500000, 15),
    ];

    for (name, desc, price, stock) in products {
        let exists: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM products WHERE name = $1 AND seller_id = $2")
                .bind(name)
                .bind(seller_id)
                .fetch_optional(pool)
                .await?;
        if exists.is_some() {
            continue;
        }

        sqlx::query(
            r#"
            INSERT INTO products (id, seller_id, name, description, price, stock)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(seller_id)
        .bind(name)
        .bind(desc)
        .bind(price)
        .bind(stock)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
