//! Tag model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Tag entity
///
/// Name, color and slug are globally unique; the catalog is read-only
/// through this service and managed from the admin side.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub slug: String,
}
