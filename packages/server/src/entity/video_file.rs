use common::FileStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "video_file")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Download lookup key. Not unique.
    #[sea_orm(indexed)]
    pub filename: String,

    /// Total size in bytes. Zero until the upload is committed.
    pub length: i64,

    pub content_type: String,

    /// Chunk size used when the file was written.
    pub chunk_size: i32,

    pub status: FileStatus,

    /// Hex SHA-256 of the content, set on commit.
    pub sha256: Option<String>,

    /// Set on commit.
    pub upload_date: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,

    #[sea_orm(has_many)]
    pub chunks: HasMany<super::video_chunk::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
