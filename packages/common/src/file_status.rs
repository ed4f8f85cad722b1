#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a stored file's metadata record.
///
/// Only `Complete` files are visible to lookups and listings. When the
/// `sea-orm` feature is enabled this enum maps to a string column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "PascalCase")]
pub enum FileStatus {
    /// Opened for writing; chunks may exist but must not be served.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Pending"))]
    Pending,
    /// Committed and visible to readers.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Complete"))]
    Complete,
    /// Chunk deletion has begun; treated as absent.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Deleting"))]
    Deleting,
}

impl FileStatus {
    /// Returns true if readers may see the file.
    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Complete)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Complete => "Complete",
            Self::Deleting => "Deleting",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
