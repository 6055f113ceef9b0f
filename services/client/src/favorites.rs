//! services/client/src/favorites.rs
//!
//! Per-user favorite recipe ids, persisted on the user record itself.
//!
//! Toggling is a read-modify-write against the latest stored record: the
//! backend offers no atomic array update, so two writers racing on the same
//! user are last-writer-wins. That lost-update window is part of the
//! contract and pinned by a test below, not papered over.

use std::sync::Arc;

use tastebook_core::domain::{ids_match, Recipe};
use tastebook_core::ports::{StoreError, StoreResult, UserStore};

#[derive(Clone)]
pub struct FavoritesLedger {
    users: Arc<dyn UserStore>,
}

impl FavoritesLedger {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// The user's favorite ids in insertion order; empty when the user (or
    /// the field) is absent.
    pub async fn favorites(&self, user_id: &str) -> StoreResult<Vec<String>> {
        match self.users.get_by_id(user_id).await {
            Ok(user) => Ok(user.favorites),
            Err(StoreError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Flips membership — remove if present, append if absent — and writes
    /// the full user record back. Returns the new list.
    pub async fn toggle(&self, user_id: &str, recipe_id: &str) -> StoreResult<Vec<String>> {
        let mut user = self.users.get_by_id(user_id).await?;
        if let Some(position) = user
            .favorites
            .iter()
            .position(|id| ids_match(id, recipe_id))
        {
            user.favorites.remove(position);
        } else {
            user.favorites.push(recipe_id.trim().to_string());
        }
        let updated = self.users.update(user).await?;
        Ok(updated.favorites)
    }

    /// Fills the `is_favorite` overlay for rendering.
    pub fn overlay(recipes: &mut [Recipe], favorites: &[String]) {
        for recipe in recipes {
            recipe.is_favorite = favorites.iter().any(|id| ids_match(id, &recipe.id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use tastebook_core::domain::{RecipeDraft, User};
    use tokio::sync::Barrier;

    fn user(id: &str) -> User {
        User {
            id: id.into(),
            name: "Dana".into(),
            email: "dana@example.com".into(),
            password_hash: "$argon2id$stub".into(),
            avatar: String::new(),
            favorites: Vec::new(),
            created_at: String::new(),
        }
    }

    /// Single-user store; `get_by_id` can be gated so two readers observe
    /// the same snapshot before either write lands.
    struct SingleUserStore {
        record: Mutex<User>,
        gate: Option<Barrier>,
    }

    impl SingleUserStore {
        fn new(record: User) -> Self {
            Self {
                record: Mutex::new(record),
                gate: None,
            }
        }

        fn racing(record: User) -> Self {
            Self {
                record: Mutex::new(record),
                gate: Some(Barrier::new(2)),
            }
        }

        fn snapshot(&self) -> User {
            self.record.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl UserStore for SingleUserStore {
        async fn list_all(&self) -> StoreResult<Vec<User>> {
            Ok(vec![self.snapshot()])
        }

        async fn get_by_id(&self, id: &str) -> StoreResult<User> {
            let user = self.snapshot();
            if !ids_match(&user.id, id) {
                return Err(StoreError::NotFound(format!("user {id}")));
            }
            if let Some(gate) = &self.gate {
                gate.wait().await;
            }
            Ok(user)
        }

        async fn get_by_email(&self, email: &str) -> StoreResult<User> {
            let user = self.snapshot();
            if user.email != email {
                return Err(StoreError::NotFound(format!("user {email}")));
            }
            Ok(user)
        }

        async fn create(&self, user: User) -> StoreResult<User> {
            Ok(user)
        }

        async fn update(&self, user: User) -> StoreResult<User> {
            *self.record.lock().expect("lock") = user.clone();
            Ok(user)
        }
    }

    #[tokio::test]
    async fn toggling_twice_restores_the_original_membership() {
        let store = Arc::new(SingleUserStore::new(user("u1")));
        let ledger = FavoritesLedger::new(store.clone());

        let after_add = ledger.toggle("u1", "r9").await.expect("add");
        assert_eq!(after_add, vec!["r9"]);

        let after_remove = ledger.toggle("u1", "r9").await.expect("remove");
        assert!(after_remove.is_empty());
        assert!(store.snapshot().favorites.is_empty());
    }

    #[tokio::test]
    async fn toggle_appends_and_removes_with_normalized_ids() {
        let mut seeded = user("u1");
        seeded.favorites = vec!["r1".into(), "r2".into()];
        let ledger = FavoritesLedger::new(Arc::new(SingleUserStore::new(seeded)));

        // " r1 " matches the stored "r1" and removes it.
        let favorites = ledger.toggle("u1", " r1 ").await.expect("toggle");
        assert_eq!(favorites, vec!["r2"]);
    }

    #[tokio::test]
    async fn absent_users_read_as_an_empty_set() {
        let ledger = FavoritesLedger::new(Arc::new(SingleUserStore::new(user("u1"))));
        assert!(ledger.favorites("ghost").await.expect("read").is_empty());
    }

    #[tokio::test]
    async fn overlay_flags_matching_recipes() {
        let mut recipes = vec![
            RecipeDraft::default().into_recipe("r1".into()),
            RecipeDraft::default().into_recipe("r2".into()),
        ];
        FavoritesLedger::overlay(&mut recipes, &["r2".to_string()]);
        assert!(!recipes[0].is_favorite);
        assert!(recipes[1].is_favorite);
    }

    /// Two toggles that read the same snapshot: the second write clobbers
    /// the first. This is the documented last-writer-wins behavior of the
    /// read-modify-write cycle, not a regression.
    #[tokio::test]
    async fn concurrent_toggles_lose_one_update() {
        let store = Arc::new(SingleUserStore::racing(user("u1")));
        let ledger_a = FavoritesLedger::new(store.clone());
        let ledger_b = FavoritesLedger::new(store.clone());

        let (a, b) = tokio::join!(ledger_a.toggle("u1", "r1"), ledger_b.toggle("u1", "r2"));
        a.expect("toggle a");
        b.expect("toggle b");

        let favorites = store.snapshot().favorites;
        assert_eq!(favorites.len(), 1, "one of the two toggles was lost");
    }
}
