//! Shared application state

use sqlx::PgPool;

use crate::repositories::{
    recipe::RecipeRepository, relation::RelationRepository,
    shopping_list::ShoppingListRepository, IngredientRepository, TagRepository, UserRepository,
};

/// Application state shared across route handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub user_repository: UserRepository,
    pub tag_repository: TagRepository,
    pub ingredient_repository: IngredientRepository,
    pub recipe_repository: RecipeRepository,
    pub relation_repository: RelationRepository,
    pub shopping_list_repository: ShoppingListRepository,
}
