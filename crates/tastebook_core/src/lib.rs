pub mod domain;
pub mod ports;
pub mod query;

pub use domain::{
    ids_match, Difficulty, EngagementKind, EngagementRecord, NewUser, Recipe, RecipeDraft, Step,
    User,
};
pub use ports::{RecipeStore, StoreError, StoreResult, UserStore};
pub use query::{Criteria, FeedTab, SortKey};
