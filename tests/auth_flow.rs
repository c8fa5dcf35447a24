mod common;

use marketplace_api::{
    dto::auth::{ForgotFinishRequest, ForgotStartRequest, LoginRequest},
    error::AppError,
    services::{auth_service, user_service},
};

// Login happy path, no-leak 401, dni-block 403, and the two-step reset flow.
#[tokio::test]
async fn login_and_password_reset_flow() -> anyhow::Result<()> {
    let Some(state) = common::try_state().await? else {
        return Ok(());
    };

    let user = common::register_user(&state, "Ana", "ana@example.com", "30111222", &["COMPRADOR"])
        .await?;
    assert_eq!(user.roles, vec!["COMPRADOR".to_string()]);

    // Correct credentials: token plus the stored role assignment.
    let resp = auth_service::login(
        &state,
        LoginRequest {
            email: "ana@example.com".into(),
            password: "secreto123".into(),
        },
    )
    .await?;
    assert!(!resp.access_token.is_empty());
    assert_eq!(resp.token_type, "bearer");
    assert_eq!(resp.user.roles, vec!["COMPRADOR".to_string()]);

    // Wrong password and unknown email answer 401 with the same detail.
    let wrong_password = auth_service::login(
        &state,
        LoginRequest {
            email: "ana@example.com".into(),
            password: "incorrecta".into(),
        },
    )
    .await;
    let unknown_email = auth_service::login(
        &state,
        LoginRequest {
            email: "nadie@example.com".into(),
            password: "secreto123".into(),
        },
    )
    .await;
    let detail_a = match wrong_password {
        Err(AppError::Unauthorized(d)) => d,
        other => panic!("expected 401, got {other:?}"),
    };
    let detail_b = match unknown_email {
        Err(AppError::Unauthorized(d)) => d,
        other => panic!("expected 401, got {other:?}"),
    };
    assert_eq!(detail_a, detail_b, "login must not leak user existence");

    // Duplicate email and document are pre-checked conflicts.
    let dup = user_service::register(
        &state,
        common::register_request("Ana2", "ana@example.com", "30999888", &["COMPRADOR"]),
    )
    .await;
    assert!(matches!(dup, Err(AppError::Conflict(_))));

    // Blocked document prevents login even with the right password.
    let admin =
        common::register_user(&state, "Root", "root@example.com", "20000001", &["ADMIN"]).await?;
    let auth_admin = common::auth_for(&state, admin.id).await?;
    marketplace_api::services::admin_service::update_user_dni_block(
        &state,
        &auth_admin,
        user.id,
        marketplace_api::dto::admin::DniBlockRequest {
            dni_bloqueado: true,
        },
    )
    .await?;

    let blocked = auth_service::login(
        &state,
        LoginRequest {
            email: "ana@example.com".into(),
            password: "secreto123".into(),
        },
    )
    .await;
    assert!(matches!(blocked, Err(AppError::Forbidden(_))));

    marketplace_api::services::admin_service::update_user_dni_block(
        &state,
        &auth_admin,
        user.id,
        marketplace_api::dto::admin::DniBlockRequest {
            dni_bloqueado: false,
        },
    )
    .await?;

    // Reset flow: the temp code replaces nothing until finish validates it.
    let start = auth_service::forgot_start(
        &state,
        ForgotStartRequest {
            email: "ana@example.com".into(),
        },
    )
    .await?;
    let code = start.temp_password.expect("temp code for existing user");

    let bad_code = auth_service::forgot_finish(
        &state,
        ForgotFinishRequest {
            email: "ana@example.com".into(),
            code: "equivocado".into(),
            new_password: "nueva123".into(),
        },
    )
    .await;
    assert!(matches!(bad_code, Err(AppError::BadRequest(_))));

    auth_service::forgot_finish(
        &state,
        ForgotFinishRequest {
            email: "ana@example.com".into(),
            code,
            new_password: "nueva123".into(),
        },
    )
    .await?;

    let relogin = auth_service::login(
        &state,
        LoginRequest {
            email: "ana@example.com".into(),
            password: "nueva123".into(),
        },
    )
    .await?;
    assert_eq!(relogin.user.id, user.id);

    // Unknown email still answers ok.
    let ghost = auth_service::forgot_start(
        &state,
        ForgotStartRequest {
            email: "fantasma@example.com".into(),
        },
    )
    .await?;
    assert!(ghost.ok);
    assert!(ghost.temp_password.is_none());

    Ok(())
}
