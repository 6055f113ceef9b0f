//! services/client/src/app.rs
//!
//! The shared application state and the feed pipeline: one explicit context
//! object in place of ambient globals, holding the injected stores and the
//! services built on them. Pages ask it for a feed; it fetches the
//! collection, overlays engagement and favorites, and runs the query
//! engine.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use tastebook_core::domain::{EngagementKind, EngagementRecord, Recipe, RecipeDraft, User};
use tastebook_core::ports::{RecipeStore, UserStore};
use tastebook_core::query::{self, Criteria, FeedTab};

use crate::adapters::local::LocalStore;
use crate::config::Config;
use crate::engagement::EngagementTracker;
use crate::error::ClientError;
use crate::favorites::FavoritesLedger;
use crate::history::SearchHistory;
use crate::session::SessionProvider;

/// An ordered, overlaid view ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct Feed {
    pub recipes: Vec<Recipe>,
    /// Set when the Favorites view was requested with nobody signed in: the
    /// caller shows a sign-in prompt, not an error.
    pub sign_in_required: bool,
}

/// The shared application state, created once at startup.
#[derive(Clone)]
pub struct AppState {
    pub recipes: Arc<dyn RecipeStore>,
    pub favorites: FavoritesLedger,
    pub engagement: EngagementTracker,
    pub session: Arc<SessionProvider>,
    pub history: SearchHistory,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        recipes: Arc<dyn RecipeStore>,
        users: Arc<dyn UserStore>,
        local: LocalStore,
        config: Arc<Config>,
    ) -> Self {
        Self {
            recipes,
            favorites: FavoritesLedger::new(users.clone()),
            engagement: EngagementTracker::new(local.clone()),
            session: Arc::new(SessionProvider::new(users, local.clone())),
            history: SearchHistory::new(local),
            config,
        }
    }

    /// Fetch, overlay, query: the whole pipeline behind every listing page.
    pub async fn load_feed(&self, criteria: &Criteria) -> Result<Feed, ClientError> {
        let mut source = self.recipes.list_all().await?;
        self.engagement.merge(&mut source)?;

        let current = self.session.current_user();
        let favorite_ids = match &current {
            Some(user) => Some(self.favorites.favorites(&user.id).await?),
            None => None,
        };
        if let Some(ids) = &favorite_ids {
            FavoritesLedger::overlay(&mut source, ids);
        }

        if let Some(search) = &criteria.search {
            self.history.record(search)?;
        }

        let sign_in_required = criteria.tab == Some(FeedTab::Favorites) && current.is_none();
        let recipes = query::run(&source, criteria, favorite_ids.as_deref());
        debug!(
            total = source.len(),
            shown = recipes.len(),
            "assembled feed"
        );
        Ok(Feed {
            recipes,
            sign_in_required,
        })
    }

    /// Creates a recipe owned by the current user.
    pub async fn add_recipe(&self, mut draft: RecipeDraft) -> Result<Recipe, ClientError> {
        let user = self.require_user()?;
        draft.user_id = user.id;
        Ok(self.recipes.create(draft).await?)
    }

    /// Full-record replace, gated on ownership. The owner id is carried
    /// over from the stored record, not taken from the draft.
    pub async fn edit_recipe(&self, id: &str, mut draft: RecipeDraft) -> Result<Recipe, ClientError> {
        let user = self.require_user()?;
        let existing = self.recipes.get_by_id(id).await?;
        if !existing.owned_by(&user.id) {
            return Err(ClientError::Unauthorized(
                "only the recipe owner can edit it".to_string(),
            ));
        }
        draft.user_id = existing.user_id;
        Ok(self.recipes.update(id, draft).await?)
    }

    pub async fn remove_recipe(&self, id: &str) -> Result<(), ClientError> {
        let user = self.require_user()?;
        let existing = self.recipes.get_by_id(id).await?;
        if !existing.owned_by(&user.id) {
            return Err(ClientError::Unauthorized(
                "only the recipe owner can delete it".to_string(),
            ));
        }
        Ok(self.recipes.delete(id).await?)
    }

    /// Flips the current user's favorite for a recipe; the caller refreshes
    /// any derived `is_favorite` flags afterwards.
    pub async fn toggle_favorite(&self, recipe_id: &str) -> Result<Vec<String>, ClientError> {
        let user = self.require_user()?;
        Ok(self.favorites.toggle(&user.id, recipe_id).await?)
    }

    pub fn record_engagement(
        &self,
        recipe_id: &str,
        kind: EngagementKind,
    ) -> Result<EngagementRecord, ClientError> {
        self.require_user()?;
        self.engagement.record(recipe_id, kind)
    }

    /// The "new in the last 24 hours" view: Latest, windowed.
    pub async fn new_recipes(&self) -> Result<Vec<Recipe>, ClientError> {
        let feed = self.load_feed(&Criteria::for_tab(FeedTab::Latest)).await?;
        let now = Utc::now();
        Ok(feed
            .recipes
            .into_iter()
            .filter(|recipe| recipe.is_recent(now))
            .collect())
    }

    /// Recipes owned by the current user.
    pub async fn my_recipes(&self) -> Result<Vec<Recipe>, ClientError> {
        let user = self.require_user()?;
        let mut all = self.recipes.list_all().await?;
        all.retain(|recipe| recipe.owned_by(&user.id));
        Ok(all)
    }

    fn require_user(&self) -> Result<User, ClientError> {
        self.session
            .current_user()
            .ok_or_else(|| ClientError::Unauthorized("sign in to continue".to_string()))
    }
}
