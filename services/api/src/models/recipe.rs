//! Recipe models, request payloads and API representations

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::tag::Tag;
use crate::models::user::UserProfile;

/// Compact recipe representation used by favorite/cart responses and
/// subscription listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecipeSummary {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

/// Ingredient with its quantity as embedded in a recipe representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientAmount {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: Option<i32>,
}

/// Full recipe representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeResponse {
    pub id: i64,
    pub tags: Vec<Tag>,
    pub author: Option<UserProfile>,
    pub ingredients: Vec<IngredientAmount>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Query parameters for the recipe list
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RecipeQuery {
    /// Comma-separated tag slugs; a recipe matches if it carries any of them
    pub tags: Option<String>,
    /// Filter by author id
    pub author: Option<Uuid>,
    /// Truthy (non-zero) restricts to the viewer's favorites;
    /// ignored for anonymous viewers
    pub is_favorited: Option<u8>,
    /// Truthy (non-zero) restricts to the viewer's shopping cart;
    /// ignored for anonymous viewers
    pub is_in_shopping_cart: Option<u8>,
}

impl RecipeQuery {
    /// Split the raw tags parameter into slugs
    pub fn tag_slugs(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

/// One ingredient reference in a create/update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientEntry {
    pub id: i64,
    /// Required unless the referenced ingredient is measured "to taste"
    pub amount: Option<i32>,
}

/// Recipe creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRecipeRequest {
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    /// Base64-encoded image data
    pub image: String,
    pub ingredients: Vec<IngredientEntry>,
    pub tags: Vec<i64>,
}

/// Recipe update payload; omitted fields are left unchanged
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateRecipeRequest {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub image: Option<String>,
    pub ingredients: Option<Vec<IngredientEntry>>,
    pub tags: Option<Vec<i64>>,
}
