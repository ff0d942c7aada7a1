//! Shopping list repository for database operations

use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::shopping_list::QuantityRow;

/// Shopping list repository for database operations
#[derive(Clone)]
pub struct ShoppingListRepository {
    pool: PgPool,
}

impl ShoppingListRepository {
    /// Create a new shopping list repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the ingredient quantities of every recipe in the user's cart.
    ///
    /// Rows come back in encounter order (cart insertion, then quantity-row
    /// insertion within a recipe), which drives the first-seen ordering of
    /// the merged report.
    pub async fn cart_quantities(&self, user: Uuid) -> ApiResult<Vec<QuantityRow>> {
        info!("Fetching cart quantities for user {}", user);

        let rows = sqlx::query(
            r#"
            SELECT i.name AS ingredient_name, ri.amount, i.measurement_unit
            FROM shopping_cart_items sci
            JOIN recipe_ingredients ri ON ri.recipe_id = sci.recipe_id
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE sci.user_id = $1
            ORDER BY sci.id, ri.id
            "#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| QuantityRow {
                ingredient_name: row.get("ingredient_name"),
                amount: row.get::<Option<i32>, _>("amount").map(i64::from),
                measurement_unit: row.get("measurement_unit"),
            })
            .collect())
    }
}
