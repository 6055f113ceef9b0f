//! services/client/src/adapters/offline.rs
//!
//! Offline implementations of the store ports over the local key/value
//! store: the local-only variant of the application, where authored recipes
//! and the user list never leave the machine. Also the hermetic backend for
//! tests and the demo binary.

use async_trait::async_trait;
use uuid::Uuid;

use tastebook_core::domain::{ids_match, Recipe, RecipeDraft, User};
use tastebook_core::ports::{RecipeStore, StoreError, StoreResult, UserStore};

use super::local::{keys, LocalStore};
use crate::error::ClientError;

#[derive(Debug, Clone)]
pub struct OfflineStore {
    store: LocalStore,
}

impl OfflineStore {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    fn recipes(&self) -> StoreResult<Vec<Recipe>> {
        Ok(self
            .store
            .get(keys::RECIPES)
            .map_err(unexpected)?
            .unwrap_or_default())
    }

    fn save_recipes(&self, recipes: &[Recipe]) -> StoreResult<()> {
        self.store.put(keys::RECIPES, &recipes).map_err(unexpected)
    }

    fn users(&self) -> StoreResult<Vec<User>> {
        Ok(self
            .store
            .get(keys::USERS)
            .map_err(unexpected)?
            .unwrap_or_default())
    }

    fn save_users(&self, users: &[User]) -> StoreResult<()> {
        self.store.put(keys::USERS, &users).map_err(unexpected)
    }
}

fn unexpected(err: ClientError) -> StoreError {
    StoreError::Unexpected(err.to_string())
}

#[async_trait]
impl RecipeStore for OfflineStore {
    async fn list_all(&self) -> StoreResult<Vec<Recipe>> {
        self.recipes()
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<Recipe> {
        self.recipes()?
            .into_iter()
            .find(|recipe| ids_match(&recipe.id, id))
            .ok_or_else(|| StoreError::NotFound(format!("recipe {id}")))
    }

    async fn create(&self, draft: RecipeDraft) -> StoreResult<Recipe> {
        let recipe = draft.into_recipe(Uuid::new_v4().to_string());
        let mut recipes = self.recipes()?;
        recipes.push(recipe.clone());
        self.save_recipes(&recipes)?;
        Ok(recipe)
    }

    async fn update(&self, id: &str, draft: RecipeDraft) -> StoreResult<Recipe> {
        let mut recipes = self.recipes()?;
        let slot = recipes
            .iter_mut()
            .find(|recipe| ids_match(&recipe.id, id))
            .ok_or_else(|| StoreError::NotFound(format!("recipe {id}")))?;
        *slot = draft.into_recipe(slot.id.clone());
        let updated = slot.clone();
        self.save_recipes(&recipes)?;
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut recipes = self.recipes()?;
        let before = recipes.len();
        recipes.retain(|recipe| !ids_match(&recipe.id, id));
        if recipes.len() == before {
            return Err(StoreError::NotFound(format!("recipe {id}")));
        }
        self.save_recipes(&recipes)
    }
}

#[async_trait]
impl UserStore for OfflineStore {
    async fn list_all(&self) -> StoreResult<Vec<User>> {
        self.users()
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<User> {
        self.users()?
            .into_iter()
            .find(|user| ids_match(&user.id, id))
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))
    }

    async fn get_by_email(&self, email: &str) -> StoreResult<User> {
        let needle = email.trim().to_lowercase();
        self.users()?
            .into_iter()
            .find(|user| user.email.trim().to_lowercase() == needle)
            .ok_or_else(|| StoreError::NotFound(format!("user {email}")))
    }

    async fn create(&self, mut user: User) -> StoreResult<User> {
        if user.id.trim().is_empty() {
            user.id = Uuid::new_v4().to_string();
        }
        let mut users = self.users()?;
        users.push(user.clone());
        self.save_users(&users)?;
        Ok(user)
    }

    async fn update(&self, user: User) -> StoreResult<User> {
        let mut users = self.users()?;
        let slot = users
            .iter_mut()
            .find(|existing| ids_match(&existing.id, &user.id))
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user.id)))?;
        *slot = user.clone();
        self.save_users(&users)?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store() -> (tempfile::TempDir, OfflineStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let local = LocalStore::open(dir.path()).expect("open");
        (dir, OfflineStore::new(local))
    }

    #[tokio::test]
    async fn create_assigns_an_id_and_lists_the_record() {
        let (_dir, store) = store();
        let created = RecipeStore::create(
            &store,
            RecipeDraft {
                title: "Soup".into(),
                ..RecipeDraft::default()
            },
        )
        .await
        .expect("create");
        assert!(!created.id.is_empty());

        let all = RecipeStore::list_all(&store).await.expect("list");
        assert_eq!(all, vec![created]);
    }

    #[tokio::test]
    async fn update_replaces_the_whole_record_but_keeps_the_id() {
        let (_dir, store) = store();
        let created = RecipeStore::create(
            &store,
            RecipeDraft {
                title: "Soup".into(),
                cuisine: "Thai".into(),
                ..RecipeDraft::default()
            },
        )
        .await
        .expect("create");

        let updated = RecipeStore::update(
            &store,
            &created.id,
            RecipeDraft {
                title: "Noodle Soup".into(),
                ..RecipeDraft::default()
            },
        )
        .await
        .expect("update");

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Noodle Soup");
        // Replace semantics: the old cuisine is gone, the default is back.
        assert_eq!(updated.cuisine, "Other");
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let (_dir, store) = store();
        assert!(matches!(
            RecipeStore::get_by_id(&store, "ghost").await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("ghost").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn user_email_lookup_is_case_folded() {
        let (_dir, store) = store();
        let user = User {
            id: String::new(),
            name: "Dana".into(),
            email: "dana@example.com".into(),
            password_hash: "$argon2id$stub".into(),
            avatar: String::new(),
            favorites: Vec::new(),
            created_at: String::new(),
        };
        let created = UserStore::create(&store, user).await.expect("create");
        assert!(!created.id.is_empty());

        let found = store
            .get_by_email("  DANA@Example.COM ")
            .await
            .expect("lookup");
        assert_eq!(found.id, created.id);
    }
}
