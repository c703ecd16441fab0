//! Append-only log of send attempts.
//!
//! The store owns a single table. It is created on start-up when missing and
//! is otherwise never altered: no updates, no deletes, no migrations.

use crate::entity::send_attempt;
use crate::error::StoreError;
use sea_orm::sea_query::{ColumnDef, Table};
use sea_orm::{
    ActiveValue::Set, ConnectionTrait, Database, DatabaseConnection, EntityTrait, QueryOrder,
    QuerySelect,
};
use std::sync::Arc;

/// A send attempt that has not been assigned an id yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewSendAttempt {
    pub sender_ip: String,
    pub send_time: String,
    pub content: String,
    pub success: bool,
    pub api_response: String,
}

#[derive(Clone, Debug)]
pub struct LogStore {
    db: Arc<DatabaseConnection>,
}

impl LogStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let db = Database::connect(database_url).await?;
        Ok(Self::from_connection(Arc::new(db)))
    }

    pub fn from_connection(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    /// Create the `logs` table if it does not exist. Safe to call on every start.
    ///
    /// The column layout matches databases written by earlier deployments of
    /// this service, so a mounted `history.db` is picked up as-is.
    #[tracing::instrument(skip(self))]
    pub async fn init(&self) -> Result<(), StoreError> {
        let stmt = Table::create()
            .table(send_attempt::Entity)
            .if_not_exists()
            .col(
                ColumnDef::new(send_attempt::Column::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(send_attempt::Column::SenderIp).text())
            .col(ColumnDef::new(send_attempt::Column::SendTime).text())
            .col(ColumnDef::new(send_attempt::Column::Content).text())
            .col(ColumnDef::new(send_attempt::Column::Success).boolean())
            .col(ColumnDef::new(send_attempt::Column::ApiResponse).text())
            .to_owned();

        let backend = self.db.get_database_backend();
        self.db.execute(backend.build(&stmt)).await?;
        Ok(())
    }

    /// Append a record and return the id the database assigned to it.
    #[tracing::instrument(skip(self, attempt), fields(success = attempt.success, content_len = attempt.content.len()))]
    pub async fn insert(&self, attempt: NewSendAttempt) -> Result<i64, StoreError> {
        let model = send_attempt::ActiveModel {
            sender_ip: Set(attempt.sender_ip),
            send_time: Set(attempt.send_time),
            content: Set(attempt.content),
            success: Set(attempt.success),
            api_response: Set(attempt.api_response),
            ..Default::default()
        };
        let res = send_attempt::Entity::insert(model)
            .exec(self.db.as_ref())
            .await?;
        Ok(res.last_insert_id)
    }

    /// Up to `limit` records, newest first. A non-positive limit yields nothing.
    #[tracing::instrument(skip(self))]
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<send_attempt::Model>, StoreError> {
        if limit <= 0 {
            return Ok(Vec::new());
        }
        let rows = send_attempt::Entity::find()
            .order_by_desc(send_attempt::Column::Id)
            .limit(limit as u64)
            .all(self.db.as_ref())
            .await?;
        Ok(rows)
    }
}
