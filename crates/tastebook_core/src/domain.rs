//! crates/tastebook_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage backend or wire format.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long a recipe counts as "new" after creation.
const RECENT_WINDOW_HOURS: i64 = 24;

/// Compares two identifiers that may have crossed different storage layers.
///
/// Ids arrive as strings or numbers depending on the backend; by the time they
/// reach the domain they are strings, but padding can still differ.
pub fn ids_match(a: &str, b: &str) -> bool {
    a.trim() == b.trim()
}

//=========================================================================================
// Recipes
//=========================================================================================

/// A single preparation step.
///
/// Older records store a step as a plain string; newer ones attach an
/// illustration. The untagged representation accepts both shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Illustrated {
        instruction: String,
        #[serde(default)]
        image: String,
    },
    Text(String),
}

impl Step {
    pub fn instruction(&self) -> &str {
        match self {
            Step::Illustrated { instruction, .. } => instruction,
            Step::Text(text) => text,
        }
    }

    fn is_blank(&self) -> bool {
        self.instruction().trim().is_empty()
    }
}

/// The canonical recipe record.
///
/// `likes`, `shares` and `is_favorite` are render-time overlays filled in by
/// the engagement tracker and the favorites ledger; stores are not required
/// to persist them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<Step>,
    /// Free-text durations ("30 mins"); anything ordering on them must parse
    /// defensively.
    pub prep_time: String,
    pub cook_time: String,
    pub difficulty: String,
    pub cuisine: String,
    pub category: String,
    /// Owning user's id. Ownership gates edit and delete.
    pub user_id: String,
    /// ISO-8601 creation timestamp, parsed defensively wherever it is
    /// ordered on.
    pub created_at: String,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Recipe {
    pub fn created_at_parsed(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(self.created_at.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Whether the recipe still falls inside the 24-hour "new" window.
    pub fn is_recent(&self, now: DateTime<Utc>) -> bool {
        self.created_at_parsed()
            .map(|created| now - created < Duration::hours(RECENT_WINDOW_HOURS))
            .unwrap_or(false)
    }

    pub fn owned_by(&self, user_id: &str) -> bool {
        !self.user_id.trim().is_empty() && ids_match(&self.user_id, user_id)
    }
}

/// The create/update payload. Stores normalize a draft before persisting it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub title: String,
    pub description: String,
    pub image: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<Step>,
    pub prep_time: String,
    pub cook_time: String,
    pub difficulty: String,
    pub cuisine: String,
    pub category: String,
    pub user_id: String,
    pub created_at: String,
}

impl RecipeDraft {
    /// Applies the store defaults and drops blank entries.
    ///
    /// Runs before any create or update reaches a backend: time fields
    /// default to "0", classification tags to "Other", difficulty to "easy",
    /// and a missing creation timestamp is stamped with the current time.
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        self.image = self.image.trim().to_string();
        self.prep_time = defaulted(self.prep_time, "0");
        self.cook_time = defaulted(self.cook_time, "0");
        self.difficulty = defaulted(self.difficulty, "easy");
        self.cuisine = defaulted(self.cuisine, "Other");
        self.category = defaulted(self.category, "Other");
        self.user_id = self.user_id.trim().to_string();
        if self.created_at.trim().is_empty() {
            self.created_at = Utc::now().to_rfc3339();
        }
        self.ingredients.retain(|entry| !entry.trim().is_empty());
        self.steps.retain(|step| !step.is_blank());
        self
    }

    /// Builds a full record from a normalized draft and a store-assigned id.
    pub fn into_recipe(self, id: String) -> Recipe {
        let draft = self.normalized();
        Recipe {
            id,
            title: draft.title,
            description: draft.description,
            image: draft.image,
            ingredients: draft.ingredients,
            steps: draft.steps,
            prep_time: draft.prep_time,
            cook_time: draft.cook_time,
            difficulty: draft.difficulty,
            cuisine: draft.cuisine,
            category: draft.category,
            user_id: draft.user_id,
            created_at: draft.created_at,
            likes: 0,
            shares: 0,
            is_favorite: false,
        }
    }
}

fn defaulted(value: String, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Recipe difficulty, ranked easy < moderate < hard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Difficulty {
    Easy,
    Moderate,
    Hard,
}

impl Difficulty {
    /// Case-insensitive parse; anything outside the three known levels is
    /// `None` and sorts after all ranked values.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "moderate" => Some(Difficulty::Moderate),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn rank(self) -> u8 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Moderate => 2,
            Difficulty::Hard => 3,
        }
    }
}

//=========================================================================================
// Users
//=========================================================================================

/// A registered user.
///
/// `password_hash` holds an argon2 PHC string, never a plaintext password.
/// `favorites` keeps insertion order and never holds duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    /// Lowercased; unique across the user collection.
    pub email: String,
    pub password_hash: String,
    pub avatar: String,
    #[serde(default)]
    pub favorites: Vec<String>,
    pub created_at: String,
}

/// Sign-up payload. Only held in memory on the way to the hasher.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub avatar: String,
}

//=========================================================================================
// Engagement
//=========================================================================================

/// Per-recipe like/share counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementRecord {
    pub likes: u64,
    pub shares: u64,
}

impl EngagementRecord {
    pub fn total(&self) -> u64 {
        self.likes.saturating_add(self.shares)
    }
}

/// Which counter an interaction bumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementKind {
    Likes,
    Shares,
}
