//! services/client/src/adapters/remote.rs
//!
//! This module contains the remote store adapter, the concrete
//! implementation of the `RecipeStore` and `UserStore` ports over the
//! REST-style recipe/user collections (JSON over HTTP).
//!
//! The backend cannot store nested arrays, so `ingredients` and `steps`
//! travel as JSON-encoded strings: they are decoded into sequences on every
//! read and re-encoded on every write. The wire records live here and never
//! leak past the adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::error;

use tastebook_core::domain::{Recipe, RecipeDraft, Step, User};
use tastebook_core::ports::{RecipeStore, StoreError, StoreResult, UserStore};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A REST adapter that implements the `RecipeStore` and `UserStore` ports.
#[derive(Clone)]
pub struct RemoteStore {
    base_url: String,
    client: Client,
}

impl RemoteStore {
    /// Creates a new `RemoteStore` against `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> StoreResult<Self> {
        let base_url = sanitize_base_url(base_url.into());
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Unexpected(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends a request and decodes the JSON body. 404 becomes `NotFound`,
    /// any other non-2xx becomes `Network`.
    async fn expect_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> StoreResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Network(format!("{what}: {e}")))?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(what.to_string())),
            status if !status.is_success() => {
                error!(%status, what, "remote store returned an error status");
                Err(StoreError::Network(format!(
                    "{what}: unexpected status {status}"
                )))
            }
            _ => response
                .json::<T>()
                .await
                .map_err(|e| StoreError::Unexpected(format!("{what}: invalid response body: {e}"))),
        }
    }

    async fn expect_ok(&self, request: reqwest::RequestBuilder, what: &str) -> StoreResult<()> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Network(format!("{what}: {e}")))?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(what.to_string())),
            status if !status.is_success() => Err(StoreError::Network(format!(
                "{what}: unexpected status {status}"
            ))),
            _ => Ok(()),
        }
    }
}

fn sanitize_base_url(mut base: String) -> String {
    while base.ends_with('/') {
        base.pop();
    }
    base
}

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

/// Remote backends are inconsistent about id primitives: the same record can
/// come back as `"7"` or `7`. Normalize both to a string.
fn flexible_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Text(String),
        Number(i64),
    }
    Ok(match IdRepr::deserialize(deserializer)? {
        IdRepr::Text(text) => text,
        IdRepr::Number(number) => number.to_string(),
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecipeRecord {
    #[serde(deserialize_with = "flexible_id")]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image: String,
    /// JSON-encoded array of strings.
    #[serde(default)]
    ingredients: String,
    /// JSON-encoded array of steps.
    #[serde(default)]
    steps: String,
    #[serde(default)]
    prep_time: String,
    #[serde(default)]
    cook_time: String,
    #[serde(default)]
    difficulty: String,
    #[serde(default)]
    cuisine: String,
    #[serde(default)]
    category: String,
    #[serde(default, deserialize_with = "flexible_id")]
    user_id: String,
    #[serde(default)]
    created_at: String,
    #[serde(default)]
    likes: u64,
    #[serde(default)]
    shares: u64,
}

impl RecipeRecord {
    fn to_domain(self) -> Recipe {
        Recipe {
            id: self.id,
            title: self.title,
            description: self.description,
            image: self.image,
            ingredients: decode_strings(&self.ingredients),
            steps: decode_steps(&self.steps),
            prep_time: self.prep_time,
            cook_time: self.cook_time,
            difficulty: self.difficulty,
            cuisine: self.cuisine,
            category: self.category,
            user_id: self.user_id,
            created_at: self.created_at,
            likes: self.likes,
            shares: self.shares,
            is_favorite: false,
        }
    }
}

/// Outgoing recipe body; the id stays in the URL.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecipePayload {
    title: String,
    description: String,
    image: String,
    ingredients: String,
    steps: String,
    prep_time: String,
    cook_time: String,
    difficulty: String,
    cuisine: String,
    category: String,
    user_id: String,
    created_at: String,
}

impl RecipePayload {
    fn from_draft(draft: RecipeDraft) -> StoreResult<Self> {
        let draft = draft.normalized();
        Ok(Self {
            ingredients: encode_list(&draft.ingredients)?,
            steps: encode_list(&draft.steps)?,
            title: draft.title,
            description: draft.description,
            image: draft.image,
            prep_time: draft.prep_time,
            cook_time: draft.cook_time,
            difficulty: draft.difficulty,
            cuisine: draft.cuisine,
            category: draft.category,
            user_id: draft.user_id,
            created_at: draft.created_at,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecord {
    #[serde(deserialize_with = "flexible_id")]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password_hash: String,
    #[serde(default)]
    avatar: String,
    /// Unlike recipe steps, the user collection stores favorites as a real
    /// array of recipe ids.
    #[serde(default)]
    favorites: Vec<String>,
    #[serde(default)]
    created_at: String,
}

impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            avatar: self.avatar,
            favorites: self.favorites,
            created_at: self.created_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserPayload {
    name: String,
    email: String,
    password_hash: String,
    avatar: String,
    favorites: Vec<String>,
    created_at: String,
}

impl UserPayload {
    fn from_domain(user: User) -> Self {
        Self {
            name: user.name,
            email: user.email.trim().to_lowercase(),
            password_hash: user.password_hash,
            avatar: user.avatar,
            favorites: user.favorites,
            created_at: user.created_at,
        }
    }
}

//=========================================================================================
// List Codec
//=========================================================================================

fn encode_list<T: Serialize>(items: &[T]) -> StoreResult<String> {
    serde_json::to_string(items)
        .map_err(|e| StoreError::Unexpected(format!("failed to encode list: {e}")))
}

/// Decodes a JSON-encoded array of strings. Legacy records predate the
/// encoding and hold a bare value, which decodes as a single entry.
fn decode_strings(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(items) => items,
        Err(_) => vec![raw.to_string()],
    }
}

fn decode_steps(raw: &str) -> Vec<Step> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<Step>>(raw) {
        Ok(items) => items,
        Err(_) => vec![Step::Text(raw.to_string())],
    }
}

//=========================================================================================
// `RecipeStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl RecipeStore for RemoteStore {
    async fn list_all(&self) -> StoreResult<Vec<Recipe>> {
        let records: Vec<RecipeRecord> = self
            .expect_json(self.client.get(self.url("recipes")), "recipe collection")
            .await?;
        Ok(records.into_iter().map(RecipeRecord::to_domain).collect())
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<Recipe> {
        let record: RecipeRecord = self
            .expect_json(
                self.client.get(self.url(&format!("recipes/{id}"))),
                &format!("recipe {id}"),
            )
            .await?;
        Ok(record.to_domain())
    }

    async fn create(&self, draft: RecipeDraft) -> StoreResult<Recipe> {
        let payload = RecipePayload::from_draft(draft)?;
        let record: RecipeRecord = self
            .expect_json(
                self.client.post(self.url("recipes")).json(&payload),
                "create recipe",
            )
            .await?;
        Ok(record.to_domain())
    }

    async fn update(&self, id: &str, draft: RecipeDraft) -> StoreResult<Recipe> {
        let payload = RecipePayload::from_draft(draft)?;
        let record: RecipeRecord = self
            .expect_json(
                self.client
                    .put(self.url(&format!("recipes/{id}")))
                    .json(&payload),
                &format!("recipe {id}"),
            )
            .await?;
        Ok(record.to_domain())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.expect_ok(
            self.client.delete(self.url(&format!("recipes/{id}"))),
            &format!("recipe {id}"),
        )
        .await
    }
}

//=========================================================================================
// `UserStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl UserStore for RemoteStore {
    async fn list_all(&self) -> StoreResult<Vec<User>> {
        let records: Vec<UserRecord> = self
            .expect_json(self.client.get(self.url("users")), "user collection")
            .await?;
        Ok(records.into_iter().map(UserRecord::to_domain).collect())
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<User> {
        let record: UserRecord = self
            .expect_json(
                self.client.get(self.url(&format!("users/{id}"))),
                &format!("user {id}"),
            )
            .await?;
        Ok(record.to_domain())
    }

    /// The collection offers no email query, so this fetches the list and
    /// filters case-folded — the same policy a browser client uses.
    async fn get_by_email(&self, email: &str) -> StoreResult<User> {
        let needle = email.trim().to_lowercase();
        UserStore::list_all(self)
            .await?
            .into_iter()
            .find(|user| user.email.trim().to_lowercase() == needle)
            .ok_or_else(|| StoreError::NotFound(format!("user {email}")))
    }

    async fn create(&self, user: User) -> StoreResult<User> {
        let payload = UserPayload::from_domain(user);
        let record: UserRecord = self
            .expect_json(
                self.client.post(self.url("users")).json(&payload),
                "create user",
            )
            .await?;
        Ok(record.to_domain())
    }

    async fn update(&self, user: User) -> StoreResult<User> {
        let id = user.id.clone();
        let payload = UserPayload::from_domain(user);
        let record: UserRecord = self
            .expect_json(
                self.client
                    .put(self.url(&format!("users/{id}")))
                    .json(&payload),
                &format!("user {id}"),
            )
            .await?;
        Ok(record.to_domain())
    }
}
