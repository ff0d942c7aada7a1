//! Recipe repository for database operations
//!
//! Owns the composition contract: a recipe's tag set and ingredient-quantity
//! set are validated and written inside one transaction, and replaced
//! wholesale on update so partial state is never observable.

use std::collections::HashMap;

use sqlx::{PgPool, Postgres, QueryBuilder, Row, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::recipe::{
    CreateRecipeRequest, IngredientAmount, IngredientEntry, RecipeQuery, RecipeResponse,
    RecipeSummary, UpdateRecipeRequest,
};
use crate::models::tag::Tag;
use crate::models::user::UserProfile;
use crate::repositories::relation::{RelationRepository, FAVORITE, SHOPPING_CART, SUBSCRIPTION};
use crate::shopping_list::TO_TASTE_UNIT;
use crate::validation;

/// Recipe repository for database operations
#[derive(Clone)]
pub struct RecipeRepository {
    pool: PgPool,
    relations: RelationRepository,
}

impl RecipeRepository {
    /// Create a new recipe repository
    pub fn new(pool: PgPool) -> Self {
        let relations = RelationRepository::new(pool.clone());
        Self { pool, relations }
    }

    /// Create a recipe with its tag and ingredient-quantity sets.
    ///
    /// All rows are written in one transaction; on any validation failure
    /// nothing is persisted. Returns the new recipe's id.
    pub async fn create(&self, author: Uuid, req: &CreateRecipeRequest) -> ApiResult<i64> {
        info!("Creating recipe '{}' for author {}", req.name, author);

        validation::validate_tag_ids(&req.tags).map_err(ApiError::Validation)?;
        validation::validate_ingredient_entries(&req.ingredients)
            .map_err(ApiError::Validation)?;
        validation::validate_cooking_time(req.cooking_time).map_err(ApiError::Validation)?;
        validation::validate_image(&req.image).map_err(ApiError::Validation)?;

        let mut tx = self.pool.begin().await?;

        check_tags_exist(&mut tx, &req.tags).await?;
        let units = resolve_ingredient_units(&mut tx, &req.ingredients).await?;
        check_amounts_against_units(&req.ingredients, &units)?;

        let row = sqlx::query(
            r#"
            INSERT INTO recipes (author_id, name, image, text, cooking_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(author)
        .bind(&req.name)
        .bind(&req.image)
        .bind(&req.text)
        .bind(req.cooking_time)
        .fetch_one(&mut *tx)
        .await?;

        let recipe_id: i64 = row.get("id");

        insert_tags(&mut tx, recipe_id, &req.tags).await?;
        insert_ingredients(&mut tx, recipe_id, &req.ingredients).await?;

        tx.commit().await?;

        Ok(recipe_id)
    }

    /// Partially update a recipe.
    ///
    /// Scalar fields are replaced when present. A supplied ingredient list
    /// replaces the whole quantity set (cleared once, then re-created); a
    /// supplied tag list replaces the tag set. Ingredient replacement runs
    /// before tag replacement, all within one transaction.
    pub async fn update(&self, id: i64, req: &UpdateRecipeRequest) -> ApiResult<()> {
        info!("Updating recipe {}", id);

        if let Some(entries) = &req.ingredients {
            validation::validate_ingredient_entries(entries).map_err(ApiError::Validation)?;
        }
        if let Some(tags) = &req.tags {
            validation::validate_tag_ids(tags).map_err(ApiError::Validation)?;
        }
        if let Some(minutes) = req.cooking_time {
            validation::validate_cooking_time(minutes).map_err(ApiError::Validation)?;
        }
        if let Some(image) = &req.image {
            validation::validate_image(image).map_err(ApiError::Validation)?;
        }

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE recipes
            SET name = COALESCE($2, name),
                text = COALESCE($3, text),
                cooking_time = COALESCE($4, cooking_time),
                image = COALESCE($5, image)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.text)
        .bind(req.cooking_time)
        .bind(&req.image)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("recipe"));
        }

        if let Some(entries) = &req.ingredients {
            let units = resolve_ingredient_units(&mut tx, entries).await?;
            check_amounts_against_units(entries, &units)?;

            sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            insert_ingredients(&mut tx, id, entries).await?;
        }

        if let Some(tags) = &req.tags {
            check_tags_exist(&mut tx, tags).await?;

            sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            insert_tags(&mut tx, id, tags).await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Delete a recipe; relation and quantity rows cascade
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("recipe"));
        }

        Ok(())
    }

    /// Get a recipe's author id; the outer Option is None when the recipe
    /// does not exist, the inner one when its author account was deleted
    pub async fn author_of(&self, id: i64) -> ApiResult<Option<Option<Uuid>>> {
        let row = sqlx::query("SELECT author_id FROM recipes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.get("author_id")))
    }

    /// Get the compact representation of a recipe
    pub async fn summary(&self, id: i64) -> ApiResult<Option<RecipeSummary>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, image, cooking_time
            FROM recipes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| RecipeSummary {
            id: row.get("id"),
            name: row.get("name"),
            image: row.get("image"),
            cooking_time: row.get("cooking_time"),
        }))
    }

    /// Get compact representations of an author's recipes, newest first
    pub async fn summaries_by_author(&self, author: Uuid) -> ApiResult<Vec<RecipeSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, image, cooking_time
            FROM recipes
            WHERE author_id = $1
            ORDER BY published DESC
            "#,
        )
        .bind(author)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| RecipeSummary {
                id: row.get("id"),
                name: row.get("name"),
                image: row.get("image"),
                cooking_time: row.get("cooking_time"),
            })
            .collect())
    }

    /// Count an author's recipes
    pub async fn count_by_author(&self, author: Uuid) -> ApiResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
            .bind(author)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Get the full representation of a recipe, with favorite/cart flags
    /// relative to the viewing user (anonymous viewers get false)
    pub async fn get_by_id(
        &self,
        id: i64,
        viewer: Option<Uuid>,
    ) -> ApiResult<Option<RecipeResponse>> {
        let row = sqlx::query(
            r#"
            SELECT r.id, r.name, r.image, r.text, r.cooking_time, r.author_id,
                   u.email, u.username, u.first_name, u.last_name
            FROM recipes r
            LEFT JOIN users u ON u.id = r.author_id
            WHERE r.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(self.build_response(row, viewer).await?))
    }

    /// Get the full representations of matching recipes, newest first.
    ///
    /// Filters follow the public list surface: tag slugs, author, and the
    /// viewer-relative favorite/cart flags (the flags only apply to
    /// authenticated viewers).
    pub async fn list(
        &self,
        viewer: Option<Uuid>,
        query: &RecipeQuery,
    ) -> ApiResult<Vec<RecipeResponse>> {
        let mut builder = list_query(viewer, query);
        let rows = builder.build().fetch_all(&self.pool).await?;

        let mut recipes = Vec::with_capacity(rows.len());
        for row in rows {
            recipes.push(self.build_response(row, viewer).await?);
        }

        Ok(recipes)
    }

    async fn build_response(
        &self,
        row: sqlx::postgres::PgRow,
        viewer: Option<Uuid>,
    ) -> ApiResult<RecipeResponse> {
        let id: i64 = row.get("id");
        let author_id: Option<Uuid> = row.get("author_id");

        let author = match author_id {
            Some(author_id) => {
                let is_subscribed = match viewer {
                    Some(viewer) => {
                        self.relations
                            .exists(&SUBSCRIPTION, viewer, author_id)
                            .await?
                    }
                    None => false,
                };
                Some(UserProfile {
                    id: author_id,
                    email: row.get("email"),
                    username: row.get("username"),
                    first_name: row.get("first_name"),
                    last_name: row.get("last_name"),
                    is_subscribed,
                })
            }
            None => None,
        };

        let (is_favorited, is_in_shopping_cart) = match viewer {
            Some(viewer) => (
                self.relations.exists(&FAVORITE, viewer, id).await?,
                self.relations.exists(&SHOPPING_CART, viewer, id).await?,
            ),
            None => (false, false),
        };

        Ok(RecipeResponse {
            id,
            tags: self.fetch_tags(id).await?,
            author,
            ingredients: self.fetch_ingredients(id).await?,
            is_favorited,
            is_in_shopping_cart,
            name: row.get("name"),
            image: row.get("image"),
            text: row.get("text"),
            cooking_time: row.get("cooking_time"),
        })
    }

    async fn fetch_tags(&self, recipe_id: i64) -> ApiResult<Vec<Tag>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.name, t.color, t.slug
            FROM recipe_tags rt
            JOIN tags t ON t.id = rt.tag_id
            WHERE rt.recipe_id = $1
            ORDER BY t.id
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Tag {
                id: row.get("id"),
                name: row.get("name"),
                color: row.get("color"),
                slug: row.get("slug"),
            })
            .collect())
    }

    async fn fetch_ingredients(&self, recipe_id: i64) -> ApiResult<Vec<IngredientAmount>> {
        let rows = sqlx::query(
            r#"
            SELECT i.id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = $1
            ORDER BY ri.id
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| IngredientAmount {
                id: row.get("id"),
                name: row.get("name"),
                measurement_unit: row.get("measurement_unit"),
                amount: row.get("amount"),
            })
            .collect())
    }
}

const LIST_SELECT: &str = "SELECT r.id, r.name, r.image, r.text, r.cooking_time, r.author_id, \
     u.email, u.username, u.first_name, u.last_name \
     FROM recipes r LEFT JOIN users u ON u.id = r.author_id";

/// Build the filtered recipe list query
fn list_query(viewer: Option<Uuid>, query: &RecipeQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(LIST_SELECT);
    builder.push(" WHERE 1 = 1");

    if let Some(author) = query.author {
        builder.push(" AND r.author_id = ").push_bind(author);
    }

    let slugs = query.tag_slugs();
    if !slugs.is_empty() {
        builder
            .push(" AND r.id IN (SELECT rt.recipe_id FROM recipe_tags rt")
            .push(" JOIN tags t ON t.id = rt.tag_id WHERE t.slug = ANY(")
            .push_bind(slugs)
            .push("))");
    }

    if let Some(viewer) = viewer {
        if query.is_favorited.unwrap_or(0) != 0 {
            builder
                .push(" AND r.id IN (SELECT recipe_id FROM favorites WHERE user_id = ")
                .push_bind(viewer)
                .push(")");
        }
        if query.is_in_shopping_cart.unwrap_or(0) != 0 {
            builder
                .push(" AND r.id IN (SELECT recipe_id FROM shopping_cart_items WHERE user_id = ")
                .push_bind(viewer)
                .push(")");
        }
    }

    builder.push(" ORDER BY r.published DESC");
    builder
}

/// Verify every referenced tag id exists
async fn check_tags_exist(tx: &mut Transaction<'_, Postgres>, tags: &[i64]) -> ApiResult<()> {
    let known: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags WHERE id = ANY($1)")
        .bind(tags)
        .fetch_one(&mut **tx)
        .await?;

    if known != tags.len() as i64 {
        return Err(ApiError::Validation(
            "one or more tag ids are unknown".to_string(),
        ));
    }

    Ok(())
}

/// Resolve every referenced ingredient to its measurement unit
async fn resolve_ingredient_units(
    tx: &mut Transaction<'_, Postgres>,
    entries: &[IngredientEntry],
) -> ApiResult<HashMap<i64, String>> {
    let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();

    let rows = sqlx::query("SELECT id, measurement_unit FROM ingredients WHERE id = ANY($1)")
        .bind(&ids)
        .fetch_all(&mut **tx)
        .await?;

    let units: HashMap<i64, String> = rows
        .into_iter()
        .map(|row| (row.get("id"), row.get("measurement_unit")))
        .collect();

    if units.len() != ids.len() {
        return Err(ApiError::Validation(
            "one or more ingredient ids are unknown".to_string(),
        ));
    }

    Ok(units)
}

/// An omitted amount is only acceptable for ingredients measured "to taste"
fn check_amounts_against_units(
    entries: &[IngredientEntry],
    units: &HashMap<i64, String>,
) -> ApiResult<()> {
    for entry in entries {
        if entry.amount.is_none()
            && units.get(&entry.id).map(String::as_str) != Some(TO_TASTE_UNIT)
        {
            return Err(ApiError::Validation(format!(
                "amount is required for ingredient {}",
                entry.id
            )));
        }
    }

    Ok(())
}

async fn insert_tags(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: i64,
    tags: &[i64],
) -> ApiResult<()> {
    for tag_id in tags {
        sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES ($1, $2)")
            .bind(recipe_id)
            .bind(tag_id)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

async fn insert_ingredients(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: i64,
    entries: &[IngredientEntry],
) -> ApiResult<()> {
    for entry in entries {
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) VALUES ($1, $2, $3)",
        )
        .bind(recipe_id)
        .bind(entry.id)
        .bind(entry.amount)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}
