//! services/client/src/bin/client.rs

use std::sync::Arc;

use client_lib::{
    adapters::{LocalStore, OfflineStore, RemoteStore},
    app::AppState,
    config::Config,
    error::ClientError,
};
use tastebook_core::ports::{RecipeStore, UserStore};
use tastebook_core::query::{Criteria, FeedTab};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- 2. Pick the Store Backend ---
    let local = LocalStore::open(&config.data_dir)?;
    let recipes: Arc<dyn RecipeStore>;
    let users: Arc<dyn UserStore>;
    match &config.api_base_url {
        Some(base_url) => {
            info!("Using the remote store at {base_url}");
            let remote = Arc::new(RemoteStore::new(base_url.clone(), config.http_timeout)?);
            recipes = remote.clone();
            users = remote;
        }
        None => {
            info!(
                "API_BASE_URL is not set; using the offline store in {}",
                config.data_dir.display()
            );
            let offline = Arc::new(OfflineStore::new(local.clone()));
            recipes = offline.clone();
            users = offline;
        }
    }

    // --- 3. Build the Shared AppState ---
    let state = AppState::new(recipes, users, local, config);

    // --- 4. Browse ---
    let criteria = match std::env::args().nth(1) {
        Some(query) => Criteria::search(query),
        None => Criteria::for_tab(FeedTab::Trending),
    };
    let feed = state.load_feed(&criteria).await?;

    if feed.sign_in_required {
        println!("Please sign in to view your favorite recipes.");
        return Ok(());
    }
    if feed.recipes.is_empty() {
        println!("No recipes found.");
        return Ok(());
    }
    for recipe in &feed.recipes {
        println!(
            "{:<32} {:>5} likes  {:>10}  {}",
            recipe.title, recipe.likes, recipe.cook_time, recipe.cuisine
        );
    }
    Ok(())
}
