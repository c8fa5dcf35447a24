use sea_orm::entity::prelude::*;

/// Cart line. Product fields are a snapshot taken when the line was inserted
/// and do not follow later product edits.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cart_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub price: i64,
    pub qty: i32,
    pub image: Option<String>,
    /// Seller display name at snapshot time.
    pub seller: Option<String>,
    pub seller_id: Option<Uuid>,
    /// Product stock remaining right after the reservation.
    pub stock_snapshot: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::carts::Entity",
        from = "Column::CartId",
        to = "super::carts::Column::Id"
    )]
    Carts,
}

impl Related<super::carts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Carts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
