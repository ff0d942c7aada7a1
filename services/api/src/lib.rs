//! Recipe platform HTTP API: catalogs, recipes, favorites, shopping carts
//! and author subscriptions.

pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod shopping_list;
pub mod state;
pub mod validation;
