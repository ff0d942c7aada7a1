//! Integration tests for the relation toggle against a live PostgreSQL
//! database.
//!
//! These tests run only when `DATABASE_URL` is set; without it they are
//! skipped so the unit suite stays runnable on a bare checkout.

use api::{
    error::ApiError,
    repositories::relation::{RelationRepository, FAVORITE},
};
use serial_test::serial;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use uuid::Uuid;

async fn test_pool() -> Result<Option<PgPool>, Box<dyn std::error::Error>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        return Ok(None);
    };

    let pool = PgPoolOptions::new().max_connections(2).connect(&url).await?;
    Ok(Some(pool))
}

async fn insert_user(pool: &PgPool) -> Result<Uuid, Box<dyn std::error::Error>> {
    let id = Uuid::new_v4();
    let marker = id.simple().to_string();

    sqlx::query(
        "INSERT INTO users (id, email, username, first_name, last_name, created_at) \
         VALUES ($1, $2, $3, $4, $5, now())",
    )
    .bind(id)
    .bind(format!("{marker}@test.invalid"))
    .bind(format!("user_{marker}"))
    .bind("Test")
    .bind("User")
    .execute(pool)
    .await?;

    Ok(id)
}

async fn insert_recipe(pool: &PgPool, author: Uuid) -> Result<i64, Box<dyn std::error::Error>> {
    let row = sqlx::query(
        "INSERT INTO recipes (author_id, name, image, text, cooking_time) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(author)
    .bind("Round-trip fixture")
    .bind("fixture.png")
    .bind("Stir and serve.")
    .bind(5i32)
    .fetch_one(pool)
    .await?;

    Ok(row.get("id"))
}

async fn favorite_row_count(
    pool: &PgPool,
    user: Uuid,
    recipe: i64,
) -> Result<i64, Box<dyn std::error::Error>> {
    let row = sqlx::query("SELECT count(*) AS n FROM favorites WHERE user_id = $1 AND recipe_id = $2")
        .bind(user)
        .bind(recipe)
        .fetch_one(pool)
        .await?;

    Ok(row.get("n"))
}

async fn cleanup(pool: &PgPool, user: Uuid, recipe: i64) -> Result<(), Box<dyn std::error::Error>> {
    sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(recipe)
        .execute(pool)
        .await?;
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user)
        .execute(pool)
        .await?;

    Ok(())
}

#[tokio::test]
#[serial]
async fn test_favorite_attach_detach_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };

    let user = insert_user(&pool).await?;
    let recipe = insert_recipe(&pool, user).await?;
    let relations = RelationRepository::new(pool.clone());

    assert!(!relations.exists(&FAVORITE, user, recipe).await?);

    relations.attach(&FAVORITE, user, recipe).await?;
    assert!(relations.exists(&FAVORITE, user, recipe).await?);

    relations.detach(&FAVORITE, user, recipe).await?;
    assert!(!relations.exists(&FAVORITE, user, recipe).await?);

    cleanup(&pool, user, recipe).await?;
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_duplicate_attach_is_a_conflict_and_leaves_one_row() -> Result<(), Box<dyn std::error::Error>>
{
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };

    let user = insert_user(&pool).await?;
    let recipe = insert_recipe(&pool, user).await?;
    let relations = RelationRepository::new(pool.clone());

    relations.attach(&FAVORITE, user, recipe).await?;
    let second = relations.attach(&FAVORITE, user, recipe).await;

    assert!(matches!(second, Err(ApiError::Conflict(_))));
    assert_eq!(favorite_row_count(&pool, user, recipe).await?, 1);

    cleanup(&pool, user, recipe).await?;
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_detach_without_a_row_is_a_conflict() -> Result<(), Box<dyn std::error::Error>> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };

    let user = insert_user(&pool).await?;
    let recipe = insert_recipe(&pool, user).await?;
    let relations = RelationRepository::new(pool.clone());

    let detached = relations.detach(&FAVORITE, user, recipe).await;
    assert!(matches!(detached, Err(ApiError::Conflict(_))));

    cleanup(&pool, user, recipe).await?;
    Ok(())
}
