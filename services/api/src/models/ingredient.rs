//! Ingredient model and catalog query parameters

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Ingredient entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

/// Query parameters for the ingredient catalog
#[derive(Debug, Clone, Deserialize, Default)]
pub struct IngredientQuery {
    /// Case-insensitive name prefix filter
    pub name: Option<String>,
}
