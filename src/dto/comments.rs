use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Comment;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCommentRequest {
    pub product_id: Uuid,
    /// 1..=10
    pub rating: i32,
    pub text: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CommentList {
    #[schema(value_type = Vec<Comment>)]
    pub items: Vec<Comment>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CommentQuery {
    pub product_id: Option<Uuid>,
}
