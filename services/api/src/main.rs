use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use common::database::{init_pool, DatabaseConfig};
use tokio::net::TcpListener;

use api::{
    repositories::{
        recipe::RecipeRepository, relation::RelationRepository,
        shopping_list::ShoppingListRepository, IngredientRepository, TagRepository,
        UserRepository,
    },
    routes,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting recipe service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Initialize repositories
    let user_repository = UserRepository::new(pool.clone());
    let tag_repository = TagRepository::new(pool.clone());
    let ingredient_repository = IngredientRepository::new(pool.clone());
    let recipe_repository = RecipeRepository::new(pool.clone());
    let relation_repository = RelationRepository::new(pool.clone());
    let shopping_list_repository = ShoppingListRepository::new(pool.clone());

    let app_state = AppState {
        db_pool: pool,
        user_repository,
        tag_repository,
        ingredient_repository,
        recipe_repository,
        relation_repository,
        shopping_list_repository,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind("0.0.0.0:3000").await?;
    info!("Recipe service listening on 0.0.0.0:3000");

    axum::serve(listener, app).await?;

    Ok(())
}
