//! Repositories for database operations

use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::models::ingredient::Ingredient;
use crate::models::tag::Tag;
use crate::models::user::User;

pub mod recipe;
pub mod relation;
pub mod shopping_list;

/// User repository for database operations
///
/// User rows are written by the external auth service; this repository
/// only reads them.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, username, first_name, last_name, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| User {
            id: row.get("id"),
            email: row.get("email"),
            username: row.get("username"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            created_at: row.get("created_at"),
        }))
    }

    /// Get the authors a user is subscribed to, oldest subscription first
    pub async fn subscriptions(&self, follower: Uuid) -> ApiResult<Vec<User>> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.email, u.username, u.first_name, u.last_name, u.created_at
            FROM subscriptions s
            JOIN users u ON u.id = s.followee_id
            WHERE s.follower_id = $1
            ORDER BY s.created_at
            "#,
        )
        .bind(follower)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| User {
                id: row.get("id"),
                email: row.get("email"),
                username: row.get("username"),
                first_name: row.get("first_name"),
                last_name: row.get("last_name"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}

/// Tag repository for database operations
#[derive(Clone)]
pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    /// Create a new tag repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get all tags
    pub async fn get_all(&self) -> ApiResult<Vec<Tag>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, color, slug
            FROM tags
            ORDER BY id
            "#,
        )
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

    /// Find a tag by ID
    pub async fn find_by_id(&self, id: i64) -> ApiResult<Option<Tag>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, color, slug
            FROM tags
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Tag {
            id: row.get("id"),
            name: row.get("name"),
            color: row.get("color"),
            slug: row.get("slug"),
        }))
    }
}

/// Ingredient repository for database operations
#[derive(Clone)]
pub struct IngredientRepository {
    pool: PgPool,
}

impl IngredientRepository {
    /// Create a new ingredient repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get ingredients, optionally filtered by a case-insensitive name prefix
    pub async fn list(&self, name_prefix: Option<&str>) -> ApiResult<Vec<Ingredient>> {
        let rows = match name_prefix {
            Some(prefix) => {
                let pattern = format!("{}%", prefix.replace('%', "\\%").replace('_', "\\_"));
                sqlx::query(
                    r#"
                    SELECT id, name, measurement_unit
                    FROM ingredients
                    WHERE name ILIKE $1
                    ORDER BY id
                    "#,
                )
                .bind(pattern)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, name, measurement_unit
                    FROM ingredients
                    ORDER BY id
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows
            .into_iter()
            .map(|row| Ingredient {
                id: row.get("id"),
                name: row.get("name"),
                measurement_unit: row.get("measurement_unit"),
            })
            .collect())
    }

    /// Find an ingredient by ID
    pub async fn find_by_id(&self, id: i64) -> ApiResult<Option<Ingredient>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, measurement_unit
            FROM ingredients
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Ingredient {
            id: row.get("id"),
            name: row.get("name"),
            measurement_unit: row.get("measurement_unit"),
        }))
    }
}
