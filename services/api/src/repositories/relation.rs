//! Generic relation toggle repository
//!
//! Favorites, shopping cart entries and subscriptions share the same
//! create-if-absent / delete-if-present shape. One repository covers all
//! three, parameterized by a relation descriptor; the database unique
//! constraint on the key pair is the arbiter for concurrent attaches.

use sqlx::{PgPool, Postgres, Row};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Descriptor of one relation kind: its table and the two key columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationKind {
    /// Human-readable name used in error messages
    pub name: &'static str,
    pub table: &'static str,
    pub owner_col: &'static str,
    pub target_col: &'static str,
}

/// user → recipe favorite relation
pub const FAVORITE: RelationKind = RelationKind {
    name: "favorite",
    table: "favorites",
    owner_col: "user_id",
    target_col: "recipe_id",
};

/// user → recipe shopping cart relation
pub const SHOPPING_CART: RelationKind = RelationKind {
    name: "shopping cart entry",
    table: "shopping_cart_items",
    owner_col: "user_id",
    target_col: "recipe_id",
};

/// user → user subscription relation
pub const SUBSCRIPTION: RelationKind = RelationKind {
    name: "subscription",
    table: "subscriptions",
    owner_col: "follower_id",
    target_col: "followee_id",
};

fn attach_sql(kind: &RelationKind) -> String {
    format!(
        "INSERT INTO {} ({}, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        kind.table, kind.owner_col, kind.target_col
    )
}

fn detach_sql(kind: &RelationKind) -> String {
    format!(
        "DELETE FROM {} WHERE {} = $1 AND {} = $2",
        kind.table, kind.owner_col, kind.target_col
    )
}

fn exists_sql(kind: &RelationKind) -> String {
    format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = $1 AND {} = $2) AS present",
        kind.table, kind.owner_col, kind.target_col
    )
}

/// Relation repository for database operations
#[derive(Clone)]
pub struct RelationRepository {
    pool: PgPool,
}

impl RelationRepository {
    /// Create a new relation repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a relation row; fails with Conflict if it already exists.
    ///
    /// The insert races through `ON CONFLICT DO NOTHING` so that of two
    /// concurrent attaches exactly one wins.
    pub async fn attach<T>(&self, kind: &RelationKind, owner: Uuid, target: T) -> ApiResult<()>
    where
        T: for<'q> sqlx::Encode<'q, Postgres> + sqlx::Type<Postgres> + Send + 'static,
    {
        info!("Attaching {} for user {}", kind.name, owner);

        let sql = attach_sql(kind);
        let result = sqlx::query(&sql)
            .bind(owner)
            .bind(target)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::Conflict(format!(
                "{} already exists",
                kind.name
            )));
        }

        Ok(())
    }

    /// Delete a relation row; fails with Conflict if none exists
    pub async fn detach<T>(&self, kind: &RelationKind, owner: Uuid, target: T) -> ApiResult<()>
    where
        T: for<'q> sqlx::Encode<'q, Postgres> + sqlx::Type<Postgres> + Send + 'static,
    {
        info!("Detaching {} for user {}", kind.name, owner);

        let sql = detach_sql(kind);
        let result = sqlx::query(&sql)
            .bind(owner)
            .bind(target)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::Conflict(format!(
                "{} does not exist",
                kind.name
            )));
        }

        Ok(())
    }

    /// Check whether a relation row exists
    pub async fn exists<T>(&self, kind: &RelationKind, owner: Uuid, target: T) -> ApiResult<bool>
    where
        T: for<'q> sqlx::Encode<'q, Postgres> + sqlx::Type<Postgres> + Send + 'static,
    {
        let sql = exists_sql(kind);
        let row = sqlx::query(&sql)
            .bind(owner)
            .bind(target)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("present"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptors_point_at_distinct_tables() {
        assert_eq!(FAVORITE.table, "favorites");
        assert_eq!(SHOPPING_CART.table, "shopping_cart_items");
        assert_eq!(SUBSCRIPTION.table, "subscriptions");
        assert_eq!(SUBSCRIPTION.owner_col, "follower_id");
        assert_eq!(SUBSCRIPTION.target_col, "followee_id");
    }

    #[test]
    fn test_attach_sql_relies_on_unique_constraint() {
        let sql = attach_sql(&FAVORITE);
        assert_eq!(
            sql,
            "INSERT INTO favorites (user_id, recipe_id) VALUES ($1, $2) ON CONFLICT DO NOTHING"
        );
    }

    #[test]
    fn test_detach_sql_targets_the_key_pair() {
        let sql = detach_sql(&SUBSCRIPTION);
        assert_eq!(
            sql,
            "DELETE FROM subscriptions WHERE follower_id = $1 AND followee_id = $2"
        );
    }

    #[test]
    fn test_exists_sql_shape() {
        let sql = exists_sql(&SHOPPING_CART);
        assert!(sql.starts_with("SELECT EXISTS"));
        assert!(sql.contains("shopping_cart_items"));
    }
}
