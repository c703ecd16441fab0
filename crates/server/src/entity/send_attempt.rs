//! One row per `/send` call that got as far as contacting the provider.
//!
//! Rows are append-only. `id` order is the only ordering the table guarantees.

use sea_orm::entity::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Peer address of the caller, empty when the transport could not tell.
    pub sender_ip: String,
    /// Local time of the attempt, `YYYY-MM-DD HH:MM:SS`.
    pub send_time: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub success: bool,
    /// Provider body, or a local error description when the call never completed.
    #[sea_orm(column_type = "Text")]
    pub api_response: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
