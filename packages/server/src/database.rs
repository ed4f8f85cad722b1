use std::time::Duration;

use sea_orm::sea_query::Index;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::entity::video_file;

pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.url.to_owned());

    // Set connection pool options
    opt.max_connections(config.max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(60))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("videohost::entity::*")
        .sync(&db)
        .await?;
    ensure_indexes(&db).await;

    Ok(db)
}

/// Create the composite lookup index used by filename downloads.
///
/// Failure is logged and ignored; lookups still work through the plain
/// `filename` index.
async fn ensure_indexes(db: &DatabaseConnection) {
    // SELECT ... FROM video_file WHERE filename = ? AND status = ? ORDER BY upload_date DESC
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_video_file_name_status_date")
        .table(video_file::Entity)
        .col(video_file::Column::Filename)
        .col(video_file::Column::Status)
        .col(video_file::Column::UploadDate)
        .to_owned();

    let stmt = db.get_database_backend().build(&stmt);
    match db.execute_raw(stmt).await {
        Ok(_) => info!("Ensured index idx_video_file_name_status_date exists"),
        Err(e) => warn!("Failed to create index idx_video_file_name_status_date: {}", e),
    }
}
