use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub nombre: String,
    pub apellido: String,
    pub tipo_doc: String,
    #[sea_orm(unique)]
    pub nro_doc: String,
    #[sea_orm(unique)]
    pub email: String,
    pub tel: Option<String>,
    pub palabra_seg: Option<String>,
    pub password_hash: String,
    pub acepta_terminos: bool,
    /// ACTIVO | REVISION | BLOQUEADO
    pub estado: String,
    pub dni_bloqueado: bool,
    pub premium: bool,
    pub reset_code_hash: Option<String>,
    pub reset_code_expires_at: Option<DateTimeWithTimeZone>,
    pub creado_en: DateTimeWithTimeZone,
    pub actualizado_en: DateTimeWithTimeZone,
}

impl Model {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.nombre, self.apellido).trim().to_string()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::addresses::Entity")]
    Addresses,
    #[sea_orm(has_many = "super::banking_infos::Entity")]
    BankingInfos,
    #[sea_orm(has_many = "super::crypto_wallets::Entity")]
    CryptoWallets,
    #[sea_orm(has_many = "super::kyc_documents::Entity")]
    KycDocuments,
    #[sea_orm(has_many = "super::user_roles::Entity")]
    UserRoles,
    #[sea_orm(has_many = "super::products::Entity")]
    Products,
    #[sea_orm(has_many = "super::carts::Entity")]
    Carts,
    #[sea_orm(has_many = "super::product_comments::Entity")]
    ProductComments,
}

impl Related<super::addresses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Addresses.def()
    }
}

impl Related<super::banking_infos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankingInfos.def()
    }
}

impl Related<super::crypto_wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CryptoWallets.def()
    }
}

impl Related<super::kyc_documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::KycDocuments.def()
    }
}

impl Related<super::user_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRoles.def()
    }
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl Related<super::carts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Carts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
