//! services/client/src/engagement.rs
//!
//! Like/share counters, local to this profile directory. A lightweight,
//! best-effort signal rather than an authoritative metric: counts never
//! leave the machine, and other holders of the store hear about updates
//! through the change broadcast.

use std::collections::BTreeMap;

use tastebook_core::domain::{EngagementKind, EngagementRecord, Recipe};

use crate::adapters::local::{keys, LocalStore};
use crate::error::ClientError;

/// The persisted shape: recipe id to counters, one document for the map.
pub type EngagementMap = BTreeMap<String, EngagementRecord>;

#[derive(Clone)]
pub struct EngagementTracker {
    store: LocalStore,
}

impl EngagementTracker {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Bumps exactly one counter by one, creating a zeroed record first if
    /// the recipe has never been interacted with. Returns the updated
    /// record for the single recipe.
    pub fn record(
        &self,
        recipe_id: &str,
        kind: EngagementKind,
    ) -> Result<EngagementRecord, ClientError> {
        let mut map: EngagementMap = self.store.get(keys::ENGAGEMENT)?.unwrap_or_default();
        let entry = map.entry(recipe_id.trim().to_string()).or_default();
        match kind {
            EngagementKind::Likes => entry.likes += 1,
            EngagementKind::Shares => entry.shares += 1,
        }
        let updated = *entry;
        self.store.put(keys::ENGAGEMENT, &map)?;
        Ok(updated)
    }

    /// Overlays the persisted counters onto the recipes, defaulting to zero.
    /// Reads only; persisted state is untouched.
    pub fn merge(&self, recipes: &mut [Recipe]) -> Result<(), ClientError> {
        let map: EngagementMap = self.store.get(keys::ENGAGEMENT)?.unwrap_or_default();
        for recipe in recipes.iter_mut() {
            let record = map
                .get(recipe.id.trim())
                .copied()
                .unwrap_or_default();
            recipe.likes = record.likes;
            recipe.shares = record.shares;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tastebook_core::domain::RecipeDraft;

    fn tracker() -> (tempfile::TempDir, EngagementTracker, LocalStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let local = LocalStore::open(dir.path()).expect("open");
        (dir, EngagementTracker::new(local.clone()), local)
    }

    #[test]
    fn records_are_created_lazily_and_increment_one_counter() {
        let (_dir, tracker, _local) = tracker();

        let first = tracker.record("r1", EngagementKind::Likes).expect("like");
        assert_eq!(first, EngagementRecord { likes: 1, shares: 0 });

        let second = tracker.record("r1", EngagementKind::Shares).expect("share");
        assert_eq!(second, EngagementRecord { likes: 1, shares: 1 });

        let other = tracker.record("r2", EngagementKind::Likes).expect("like");
        assert_eq!(other, EngagementRecord { likes: 1, shares: 0 });
    }

    #[test]
    fn counts_survive_a_fresh_handle_over_the_same_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let local = LocalStore::open(dir.path()).expect("open");
            let tracker = EngagementTracker::new(local);
            tracker.record("r1", EngagementKind::Likes).expect("like");
            tracker.record("r1", EngagementKind::Likes).expect("like");
        }
        let reopened = EngagementTracker::new(LocalStore::open(dir.path()).expect("reopen"));
        let record = reopened.record("r1", EngagementKind::Likes).expect("like");
        assert_eq!(record.likes, 3);
    }

    #[test]
    fn merge_overlays_counts_and_defaults_to_zero() {
        let (_dir, tracker, _local) = tracker();
        tracker.record("r1", EngagementKind::Likes).expect("like");
        tracker.record("r1", EngagementKind::Shares).expect("share");

        let mut recipes = vec![
            RecipeDraft::default().into_recipe("r1".into()),
            RecipeDraft::default().into_recipe("r2".into()),
        ];
        tracker.merge(&mut recipes).expect("merge");

        assert_eq!((recipes[0].likes, recipes[0].shares), (1, 1));
        assert_eq!((recipes[1].likes, recipes[1].shares), (0, 0));
    }

    #[test]
    fn merge_does_not_mutate_persisted_state() {
        let (_dir, tracker, local) = tracker();
        tracker.record("r1", EngagementKind::Likes).expect("like");
        let before: EngagementMap = local.get(keys::ENGAGEMENT).expect("get").expect("map");

        let mut recipes = vec![RecipeDraft::default().into_recipe("r1".into())];
        tracker.merge(&mut recipes).expect("merge");

        let after: EngagementMap = local.get(keys::ENGAGEMENT).expect("get").expect("map");
        assert_eq!(before, after);
    }

    #[test]
    fn recording_announces_a_change() {
        let (_dir, tracker, local) = tracker();
        let mut events = local.subscribe();
        tracker.record("r1", EngagementKind::Likes).expect("like");
        assert_eq!(events.try_recv().expect("event").key, keys::ENGAGEMENT);
    }
}
