use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::users::{AddressIn, BankingIn, CryptoWalletIn, KycDocumentIn, RegisterUserRequest, UpdateUserRequest},
    entity::{addresses, banking_infos, crypto_wallets, kyc_documents, roles, user_roles, users},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ROLE_COMPRADOR, ROLE_VENDEDOR, load_role_codes},
    models::{KycDocument, Role, User},
    state::AppState,
};

pub const ESTADO_ACTIVO: &str = "ACTIVO";
pub const ESTADO_REVISION: &str = "REVISION";
pub const ESTADO_BLOQUEADO: &str = "BLOQUEADO";

/// Role-conditional registration requirements, shared by create and update.
fn validate_role_requirements(
    role_codes: &[String],
    domicilio_entrega: &Option<AddressIn>,
    banking: &Option<BankingIn>,
    wallets: &[CryptoWalletIn],
) -> AppResult<()> {
    if role_codes.iter().any(|r| r == ROLE_COMPRADOR) && domicilio_entrega.is_none() {
        return Err(AppError::UnprocessableEntity(
            "COMPRADOR requires an ENTREGA address".into(),
        ));
    }
    if role_codes.iter().any(|r| r == ROLE_VENDEDOR) && (banking.is_none() || wallets.is_empty()) {
        return Err(AppError::UnprocessableEntity(
            "VENDEDOR requires CBU/Alias and at least one wallet".into(),
        ));
    }
    Ok(())
}

pub async fn register(state: &AppState, payload: RegisterUserRequest) -> AppResult<User> {
    // Pre-checked duplicates answer 409; the unique constraints behind them
    // still catch the insert race (mapped to 409 below).
    let email_taken = users::Entity::find()
        .filter(users::Column::Email.eq(payload.email.as_str()))
        .one(&state.orm)
        .await?
        .is_some();
    if email_taken {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let doc_taken = users::Entity::find()
        .filter(users::Column::NroDoc.eq(payload.nro_doc.as_str()))
        .one(&state.orm)
        .await?
        .is_some();
    if doc_taken {
        return Err(AppError::Conflict("Document already registered".into()));
    }

    validate_role_requirements(
        &payload.roles,
        &payload.domicilio_entrega,
        &payload.banking,
        &payload.wallets,
    )?;

    let password_hash = crate::services::auth_service::hash_password(&payload.password)?;
    let user_id = Uuid::new_v4();

    let txn = state.orm.begin().await?;

    let user = users::ActiveModel {
        id: Set(user_id),
        nombre: Set(payload.nombre),
        apellido: Set(payload.apellido),
        tipo_doc: Set(payload.tipo_doc),
        nro_doc: Set(payload.nro_doc),
        email: Set(payload.email),
        tel: Set(payload.tel),
        palabra_seg: Set(payload.palabra_seg),
        password_hash: Set(password_hash),
        acepta_terminos: Set(payload.acepta_terminos),
        estado: Set(ESTADO_ACTIVO.into()),
        dni_bloqueado: Set(false),
        premium: Set(false),
        reset_code_hash: Set(None),
        reset_code_expires_at: Set(None),
        creado_en: NotSet,
        actualizado_en: NotSet,
    }
    .insert(&txn)
    .await
    .map_err(|e| AppError::from_unique_violation(e, "Email or document already registered"))?;

    upsert_address(&txn, user_id, payload.domicilio_envio.as_ref()).await?;
    upsert_address(&txn, user_id, payload.domicilio_entrega.as_ref()).await?;
    upsert_banking(&txn, user_id, payload.banking.as_ref()).await?;
    upsert_wallets(&txn, user_id, &payload.wallets).await?;
    assign_roles(&txn, user_id, &payload.roles).await?;

    txn.commit().await?;

    let role_codes = load_role_codes(&state.orm, user_id).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user_id),
        "user_register",
        Some("users"),
        Some(serde_json::json!({ "user_id": user_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(User::from_entity(user, role_codes))
}

pub async fn get_user(state: &AppState, auth: &AuthUser, user_id: Uuid) -> AppResult<User> {
    auth.ensure_self_or_admin(user_id)?;

    let user = users::Entity::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let role_codes = load_role_codes(&state.orm, user_id).await?;
    Ok(User::from_entity(user, role_codes))
}

pub async fn update_user(
    state: &AppState,
    auth: &AuthUser,
    user_id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<User> {
    auth.ensure_self_or_admin(user_id)?;

    let existing = users::Entity::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    validate_role_requirements(
        &payload.roles,
        &payload.domicilio_entrega,
        &payload.banking,
        &payload.wallets,
    )?;

    let txn = state.orm.begin().await?;

    let mut active: users::ActiveModel = existing.into();
    active.nombre = Set(payload.nombre);
    active.apellido = Set(payload.apellido);
    active.tipo_doc = Set(payload.tipo_doc);
    active.nro_doc = Set(payload.nro_doc);
    active.email = Set(payload.email);
    active.tel = Set(payload.tel);
    active.palabra_seg = Set(payload.palabra_seg);
    active.acepta_terminos = Set(payload.acepta_terminos);
    if let Some(password) = payload.password.as_deref().filter(|p| !p.is_empty()) {
        active.password_hash = Set(crate::services::auth_service::hash_password(password)?);
    }
    active.actualizado_en = Set(Utc::now().into());
    let user = active
        .update(&txn)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Email or document already registered"))?;

    upsert_address(&txn, user_id, payload.domicilio_envio.as_ref()).await?;
    upsert_address(&txn, user_id, payload.domicilio_entrega.as_ref()).await?;
    upsert_banking(&txn, user_id, payload.banking.as_ref()).await?;
    upsert_wallets(&txn, user_id, &payload.wallets).await?;
    assign_roles(&txn, user_id, &payload.roles).await?;

    txn.commit().await?;

    let role_codes = load_role_codes(&state.orm, user_id).await?;
    Ok(User::from_entity(user, role_codes))
}

/// Deletes the user; owned rows (addresses, banking, wallets, KYC, roles,
/// carts) go with it via the schema's ON DELETE CASCADE.
pub async fn delete_user(state: &AppState, auth: &AuthUser, user_id: Uuid) -> AppResult<()> {
    auth.ensure_self_or_admin(user_id)?;

    let result = users::Entity::delete_by_id(user_id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("User not found"));
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(auth.user_id),
        "user_delete",
        Some("users"),
        Some(serde_json::json!({ "user_id": user_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(())
}

/// Registers KYC document metadata. The storage path is a convention only;
/// file transport is out of scope.
pub async fn register_kyc_documents(
    state: &AppState,
    auth: &AuthUser,
    user_id: Uuid,
    docs: Vec<KycDocumentIn>,
) -> AppResult<Vec<KycDocument>> {
    auth.ensure_self_or_admin(user_id)?;

    users::Entity::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let mut out = Vec::with_capacity(docs.len());
    for doc in docs {
        let id = Uuid::new_v4();
        let storage_path = format!("kyc/{user_id}/{id}_{}", doc.filename);
        let row = kyc_documents::ActiveModel {
            id: Set(id),
            user_id: Set(user_id),
            tipo: Set(doc.tipo),
            filename: Set(doc.filename),
            mime: Set(doc.mime),
            size_bytes: Set(doc.size_bytes),
            storage_path: Set(storage_path),
            subido_en: NotSet,
        }
        .insert(&state.orm)
        .await?;
        out.push(KycDocument::from(row));
    }

    Ok(out)
}

pub async fn list_roles(state: &AppState) -> AppResult<Vec<Role>> {
    let rows = roles::Entity::find()
        .order_by_asc(roles::Column::Id)
        .all(&state.orm)
        .await?;
    Ok(rows.into_iter().map(Role::from).collect())
}

async fn upsert_address<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    addr: Option<&AddressIn>,
) -> AppResult<()> {
    let Some(addr) = addr else { return Ok(()) };

    let existing = addresses::Entity::find()
        .filter(addresses::Column::UserId.eq(user_id))
        .filter(addresses::Column::Tipo.eq(addr.tipo.as_str()))
        .one(conn)
        .await?;

    match existing {
        Some(row) => {
            let mut active: addresses::ActiveModel = row.into();
            active.calle_y_numero = Set(addr.calle_y_numero.clone());
            active.ciudad = Set(addr.ciudad.clone());
            active.provincia = Set(addr.provincia.clone());
            active.pais = Set(addr.pais.clone());
            active.cp = Set(addr.cp.clone());
            active.update(conn).await?;
        }
        None => {
            addresses::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                tipo: Set(addr.tipo.clone()),
                calle_y_numero: Set(addr.calle_y_numero.clone()),
                ciudad: Set(addr.ciudad.clone()),
                provincia: Set(addr.provincia.clone()),
                pais: Set(addr.pais.clone()),
                cp: Set(addr.cp.clone()),
            }
            .insert(conn)
            .await?;
        }
    }
    Ok(())
}

async fn upsert_banking<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    banking: Option<&BankingIn>,
) -> AppResult<()> {
    let Some(banking) = banking else { return Ok(()) };

    let existing = banking_infos::Entity::find()
        .filter(banking_infos::Column::UserId.eq(user_id))
        .one(conn)
        .await?;

    match existing {
        Some(row) => {
            let mut active: banking_infos::ActiveModel = row.into();
            active.cbu_o_alias = Set(banking.cbu_o_alias.clone());
            active.update(conn).await?;
        }
        None => {
            banking_infos::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                cbu_o_alias: Set(banking.cbu_o_alias.clone()),
            }
            .insert(conn)
            .await?;
        }
    }
    Ok(())
}

async fn upsert_wallets<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    wallets: &[CryptoWalletIn],
) -> AppResult<()> {
    for wallet in wallets {
        let existing = crypto_wallets::Entity::find()
            .filter(crypto_wallets::Column::UserId.eq(user_id))
            .filter(crypto_wallets::Column::Red.eq(wallet.red.as_str()))
            .one(conn)
            .await?;

        match existing {
            Some(row) => {
                let mut active: crypto_wallets::ActiveModel = row.into();
                active.address = Set(wallet.address.clone());
                active.update(conn).await?;
            }
            None => {
                crypto_wallets::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    red: Set(wallet.red.clone()),
                    address: Set(wallet.address.clone()),
                }
                .insert(conn)
                .await?;
            }
        }
    }
    Ok(())
}

/// Replaces the user's role assignments with the given codes. Unknown codes
/// are ignored; the vocabulary is seeded, not user-defined.
async fn assign_roles<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    role_codes: &[String],
) -> AppResult<()> {
    user_roles::Entity::delete_many()
        .filter(user_roles::Column::UserId.eq(user_id))
        .exec(conn)
        .await?;

    let matched = roles::Entity::find()
        .filter(roles::Column::Code.is_in(role_codes.iter().map(String::as_str)))
        .all(conn)
        .await?;

    for role in matched {
        user_roles::ActiveModel {
            user_id: Set(user_id),
            role_id: Set(role.id),
            asignado_en: NotSet,
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet() -> CryptoWalletIn {
        CryptoWalletIn {
            red: "TRC20".into(),
            address: "T9yD2kXq".into(),
        }
    }

    fn entrega() -> AddressIn {
        AddressIn {
            tipo: "ENTREGA".into(),
            calle_y_numero: "Av. Siempreviva 742".into(),
            ciudad: "Springfield".into(),
            provincia: "BA".into(),
            pais: "AR".into(),
            cp: "1000".into(),
        }
    }

    #[test]
    fn comprador_requires_delivery_address() {
        let err = validate_role_requirements(&["COMPRADOR".into()], &None, &None, &[]);
        assert!(matches!(err, Err(AppError::UnprocessableEntity(_))));

        let ok = validate_role_requirements(&["COMPRADOR".into()], &Some(entrega()), &None, &[]);
        assert!(ok.is_ok());
    }

    #[test]
    fn vendedor_requires_banking_and_wallet() {
        let banking = Some(BankingIn {
            cbu_o_alias: "alias.mp".into(),
        });

        let missing_wallet =
            validate_role_requirements(&["VENDEDOR".into()], &None, &banking, &[]);
        assert!(matches!(missing_wallet, Err(AppError::UnprocessableEntity(_))));

        let ok = validate_role_requirements(&["VENDEDOR".into()], &None, &banking, &[wallet()]);
        assert!(ok.is_ok());
    }
}
