use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "video_chunk")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub files_id: Uuid,
    #[sea_orm(belongs_to, from = "files_id", to = "id")]
    pub file: HasOne<super::video_file::Entity>,

    /// Zero-based position within the file.
    #[sea_orm(primary_key, auto_increment = false)]
    pub n: i32,

    pub data: Vec<u8>,
}

impl ActiveModelBehavior for ActiveModel {}
