use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub seller_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Integer amount in centavos.
    pub price: i64,
    pub stock: i32,
    /// NUEVO | USADO
    pub condition: String,
    /// 0..10, one decimal.
    pub rating: f64,
    pub sold_count: i32,
    pub image_url: Option<String>,
    pub features: Option<String>,
    pub category_id: Option<Uuid>,
    pub subcategory: Option<String>,
    /// Soft-delete flag; inactive products are invisible to the catalog.
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::SellerId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id"
    )]
    Categories,
    #[sea_orm(has_many = "super::product_images::Entity")]
    ProductImages,
    #[sea_orm(has_many = "super::product_comments::Entity")]
    ProductComments,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::product_images::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductImages.def()
    }
}

impl Related<super::product_comments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductComments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
