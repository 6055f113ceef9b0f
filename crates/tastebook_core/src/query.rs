//! crates/tastebook_core/src/query.rs
//!
//! The query engine: given a recipe collection and a set of criteria,
//! produces the filtered, sorted view a page renders. Filtering runs first,
//! then either an explicit sort override or the named tab view. Every sort
//! here is a stable, key-only `sort_by`, so equal keys keep their source
//! order and the engine is deterministic for a fixed input.

use std::cmp::Ordering;

use crate::domain::{Difficulty, Recipe};

/// The Trending view shows at most this many recipes.
pub const TRENDING_CAP: usize = 6;

/// Stand-in curation policy: the Editor's Choice view is the first records
/// of the filtered set, order preserved.
pub const EDITORS_CHOICE_CAP: usize = 5;

//=========================================================================================
// Criteria
//=========================================================================================

/// A named, predefined filter+sort combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedTab {
    Trending,
    Latest,
    Fastest,
    Favorites,
    MostPopular,
    EditorsChoice,
}

impl FeedTab {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "trending" => Some(FeedTab::Trending),
            "new" | "latest" => Some(FeedTab::Latest),
            "fastest" => Some(FeedTab::Fastest),
            "favorites" => Some(FeedTab::Favorites),
            "popular" | "most popular" => Some(FeedTab::MostPopular),
            "editors" | "editor's choice" => Some(FeedTab::EditorsChoice),
            _ => None,
        }
    }
}

/// An explicit sort on listing pages; supersedes the tab view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Title,
    CookTime,
    Difficulty,
}

impl SortKey {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "title" => Some(SortKey::Title),
            "cooktime" | "cook_time" | "cook time" => Some(SortKey::CookTime),
            "difficulty" => Some(SortKey::Difficulty),
            _ => None,
        }
    }
}

/// What a page is asking for. Absent fields act as pass-through; the
/// constructors fold blank strings and the "All" dropdown sentinel to
/// `None`.
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    /// Free-text query matched against title, cuisine, category, difficulty
    /// and any ingredient (logical OR).
    pub search: Option<String>,
    /// Quick-filter chip: exact match against cuisine OR category.
    pub tag: Option<String>,
    pub tab: Option<FeedTab>,
    pub sort: Option<SortKey>,
    /// Dropdown filters: exact match when set.
    pub cuisine: Option<String>,
    pub difficulty: Option<String>,
}

impl Criteria {
    pub fn search(query: impl Into<String>) -> Self {
        Criteria {
            search: select(query),
            ..Criteria::default()
        }
    }

    pub fn for_tab(tab: FeedTab) -> Self {
        Criteria {
            tab: Some(tab),
            ..Criteria::default()
        }
    }

    pub fn for_tag(tag: impl Into<String>) -> Self {
        Criteria {
            tag: select(tag),
            ..Criteria::default()
        }
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine = select(cuisine);
        self
    }

    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = select(difficulty);
        self
    }
}

/// Folds a dropdown/search value to `None` when blank or the "All" sentinel.
fn select(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

//=========================================================================================
// The Pipeline
//=========================================================================================

/// Runs the filter/sort pipeline over `source`.
///
/// `favorites` is the current user's favorite-id list, `None` when nobody is
/// signed in: the Favorites tab then yields an empty result, never an error.
pub fn run(source: &[Recipe], criteria: &Criteria, favorites: Option<&[String]>) -> Vec<Recipe> {
    let needle = criteria.search.as_ref().map(|s| s.trim().to_lowercase());

    let mut matched: Vec<Recipe> = source
        .iter()
        .filter(|recipe| matches(recipe, criteria, needle.as_deref()))
        .cloned()
        .collect();

    // An explicit sort supersedes the tab view.
    if let Some(sort) = criteria.sort {
        apply_sort(&mut matched, sort);
        return matched;
    }

    match criteria.tab {
        Some(FeedTab::Trending) => {
            matched.sort_by(|a, b| b.likes.cmp(&a.likes));
            matched.truncate(TRENDING_CAP);
        }
        Some(FeedTab::Latest) => {
            matched.sort_by(cmp_created_desc);
        }
        Some(FeedTab::Fastest) => {
            matched.sort_by_key(|recipe| parse_minutes(&recipe.cook_time));
        }
        Some(FeedTab::Favorites) => match favorites {
            Some(ids) => matched.retain(|recipe| {
                ids.iter()
                    .any(|id| crate::domain::ids_match(id, &recipe.id))
            }),
            None => matched.clear(),
        },
        Some(FeedTab::MostPopular) => {
            matched.sort_by(|a, b| {
                b.likes
                    .saturating_add(b.shares)
                    .cmp(&a.likes.saturating_add(a.shares))
            });
        }
        Some(FeedTab::EditorsChoice) => {
            matched.truncate(EDITORS_CHOICE_CAP);
        }
        None => {}
    }

    matched
}

fn matches(recipe: &Recipe, criteria: &Criteria, needle: Option<&str>) -> bool {
    if let Some(needle) = needle {
        if !matches_search(recipe, needle) {
            return false;
        }
    }
    if let Some(tag) = &criteria.tag {
        if !(eq_fold(&recipe.cuisine, tag) || eq_fold(&recipe.category, tag)) {
            return false;
        }
    }
    if let Some(cuisine) = &criteria.cuisine {
        if !eq_fold(&recipe.cuisine, cuisine) {
            return false;
        }
    }
    if let Some(difficulty) = &criteria.difficulty {
        if !eq_fold(&recipe.difficulty, difficulty) {
            return false;
        }
    }
    true
}

/// Case-insensitive substring match; a recipe matches if any field does.
fn matches_search(recipe: &Recipe, needle: &str) -> bool {
    contains_fold(&recipe.title, needle)
        || contains_fold(&recipe.cuisine, needle)
        || contains_fold(&recipe.category, needle)
        || contains_fold(&recipe.difficulty, needle)
        || recipe
            .ingredients
            .iter()
            .any(|ingredient| contains_fold(ingredient, needle))
}

fn contains_fold(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn eq_fold(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn apply_sort(recipes: &mut [Recipe], sort: SortKey) {
    match sort {
        SortKey::Title => recipes.sort_by_key(|recipe| recipe.title.to_lowercase()),
        SortKey::CookTime => recipes.sort_by_key(|recipe| parse_minutes(&recipe.cook_time)),
        SortKey::Difficulty => recipes.sort_by_key(|recipe| difficulty_rank(&recipe.difficulty)),
    }
}

/// Newest first; records whose timestamp does not parse sort last.
fn cmp_created_desc(a: &Recipe, b: &Recipe) -> Ordering {
    match (a.created_at_parsed(), b.created_at_parsed()) {
        (Some(left), Some(right)) => right.cmp(&left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Unknown difficulty sorts after all ranked values.
fn difficulty_rank(value: &str) -> u8 {
    Difficulty::parse(value)
        .map(Difficulty::rank)
        .unwrap_or(u8::MAX)
}

/// Parses the leading number out of a free-text duration: "30 mins" is 30,
/// "about 45" is 45, "1 hr" is 1 (units are ignored). No digits at all sorts
/// last.
pub fn parse_minutes(value: &str) -> u64 {
    let digits: String = value
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecipeDraft;
    use pretty_assertions::assert_eq;

    fn recipe(id: &str, title: &str) -> Recipe {
        RecipeDraft {
            title: title.into(),
            created_at: "2024-06-01T12:00:00Z".into(),
            ..RecipeDraft::default()
        }
        .into_recipe(id.into())
    }

    fn titles(recipes: &[Recipe]) -> Vec<&str> {
        recipes.iter().map(|r| r.title.as_str()).collect()
    }

    fn ids(recipes: &[Recipe]) -> Vec<&str> {
        recipes.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn search_matches_any_field_case_insensitively() {
        let mut soup = recipe("1", "Soup");
        soup.cuisine = "Thai".into();
        soup.ingredients = vec!["lime".into(), "broth".into()];
        let mut cake = recipe("2", "Cake");
        cake.cuisine = "French".into();
        let source = vec![soup, cake];

        for query in ["thai", "LIME", "soup"] {
            let result = run(&source, &Criteria::search(query), None);
            assert_eq!(ids(&result), vec!["1"], "query {query:?}");
        }
        let result = run(&source, &Criteria::search("pasta"), None);
        assert!(result.is_empty());
    }

    #[test]
    fn search_matches_difficulty_text() {
        let mut stew = recipe("1", "Stew");
        stew.difficulty = "moderate".into();
        let result = run(&[stew], &Criteria::search("moder"), None);
        assert_eq!(ids(&result), vec!["1"]);
    }

    #[test]
    fn blank_and_all_criteria_pass_through() {
        let source = vec![recipe("1", "A"), recipe("2", "B")];
        let criteria = Criteria::search("   ")
            .with_cuisine("All")
            .with_difficulty("");
        let result = run(&source, &criteria, None);
        assert_eq!(ids(&result), vec!["1", "2"]);
    }

    #[test]
    fn tag_matches_cuisine_or_category_exactly() {
        let mut curry = recipe("1", "Curry");
        curry.cuisine = "Indian".into();
        let mut naan = recipe("2", "Naan");
        naan.category = "indian".into();
        let mut taco = recipe("3", "Taco");
        taco.cuisine = "Indian food".into();
        let source = vec![curry, naan, taco];

        let result = run(&source, &Criteria::for_tag("INDIAN"), None);
        assert_eq!(ids(&result), vec!["1", "2"]);
    }

    #[test]
    fn dropdown_filters_require_exact_equality() {
        let mut a = recipe("1", "A");
        a.cuisine = "Thai".into();
        a.difficulty = "Hard".into();
        let mut b = recipe("2", "B");
        b.cuisine = "Thai".into();
        b.difficulty = "easy".into();
        let source = vec![a, b];

        let criteria = Criteria::default()
            .with_cuisine("thai")
            .with_difficulty("hard");
        assert_eq!(ids(&run(&source, &criteria, None)), vec!["1"]);
    }

    #[test]
    fn trending_caps_at_six_by_likes_descending() {
        let source: Vec<Recipe> = (0..10)
            .map(|i| {
                let mut r = recipe(&i.to_string(), &format!("R{i}"));
                r.likes = i as u64;
                r
            })
            .collect();

        let result = run(&source, &Criteria::for_tab(FeedTab::Trending), None);
        assert_eq!(ids(&result), vec!["9", "8", "7", "6", "5", "4"]);
    }

    #[test]
    fn latest_sorts_unparseable_timestamps_last() {
        let mut old = recipe("1", "Old");
        old.created_at = "2023-01-01T00:00:00Z".into();
        let mut new = recipe("2", "New");
        new.created_at = "2024-01-01T00:00:00Z".into();
        let mut junk = recipe("3", "Junk");
        junk.created_at = "not a date".into();
        let source = vec![junk, old, new];

        let result = run(&source, &Criteria::for_tab(FeedTab::Latest), None);
        assert_eq!(titles(&result), vec!["New", "Old", "Junk"]);
    }

    #[test]
    fn fastest_parses_leading_numbers_and_sorts_junk_last() {
        assert_eq!(parse_minutes("5 min"), 5);
        assert_eq!(parse_minutes("45"), 45);
        assert_eq!(parse_minutes("1 hr"), 1);
        assert_eq!(parse_minutes("about 30 mins"), 30);
        assert_eq!(parse_minutes("quick"), u64::MAX);

        let mut fast = recipe("1", "Fast");
        fast.cook_time = "5 min".into();
        let mut slow = recipe("2", "Slow");
        slow.cook_time = "45".into();
        let mut hour = recipe("3", "Hour");
        hour.cook_time = "1 hr".into();
        let mut junk = recipe("4", "Junk");
        junk.cook_time = "quick".into();
        let source = vec![slow, junk, fast, hour];

        let result = run(&source, &Criteria::for_tab(FeedTab::Fastest), None);
        assert_eq!(titles(&result), vec!["Hour", "Fast", "Slow", "Junk"]);
    }

    #[test]
    fn favorites_tab_without_a_user_is_empty_not_an_error() {
        let source = vec![recipe("1", "A"), recipe("2", "B")];
        let result = run(&source, &Criteria::for_tab(FeedTab::Favorites), None);
        assert!(result.is_empty());
    }

    #[test]
    fn favorites_tab_filters_by_membership_with_normalized_ids() {
        let source = vec![recipe("1", "A"), recipe("2", "B"), recipe("3", "C")];
        let favorites = vec![" 3 ".to_string(), "1".to_string()];
        let result = run(
            &source,
            &Criteria::for_tab(FeedTab::Favorites),
            Some(&favorites),
        );
        assert_eq!(ids(&result), vec!["1", "3"]);
    }

    #[test]
    fn most_popular_ties_preserve_source_order() {
        let mut a = recipe("1", "A");
        a.likes = 5;
        a.shares = 1;
        let mut b = recipe("2", "B");
        b.likes = 3;
        b.shares = 4;
        let mut c = recipe("3", "C");
        c.likes = 10;
        let source = vec![a, b, c];

        let result = run(&source, &Criteria::for_tab(FeedTab::MostPopular), None);
        // A and B both total 6; A stays first because the sort is stable.
        assert_eq!(ids(&result), vec!["3", "1", "2"]);
    }

    #[test]
    fn editors_choice_takes_the_first_five_in_order() {
        let source: Vec<Recipe> = (0..8)
            .map(|i| recipe(&i.to_string(), &format!("R{i}")))
            .collect();
        let result = run(&source, &Criteria::for_tab(FeedTab::EditorsChoice), None);
        assert_eq!(ids(&result), vec!["0", "1", "2", "3", "4"]);
    }

    #[test]
    fn explicit_sort_supersedes_the_tab_view() {
        let mut a = recipe("1", "Zucchini Bake");
        a.likes = 100;
        let mut b = recipe("2", "Apple Pie");
        b.likes = 1;
        let source = vec![a, b];

        let criteria = Criteria::for_tab(FeedTab::Trending).with_sort(SortKey::Title);
        let result = run(&source, &criteria, None);
        assert_eq!(titles(&result), vec!["Apple Pie", "Zucchini Bake"]);
    }

    #[test]
    fn title_sort_is_case_folded() {
        let source = vec![
            recipe("1", "banana bread"),
            recipe("2", "Apple Pie"),
            recipe("3", "Cherry Tart"),
        ];
        let result = run(
            &source,
            &Criteria::default().with_sort(SortKey::Title),
            None,
        );
        assert_eq!(titles(&result), vec!["Apple Pie", "banana bread", "Cherry Tart"]);
    }

    #[test]
    fn difficulty_sort_ranks_easy_moderate_hard_then_unknown() {
        let mut hard = recipe("1", "Hard");
        hard.difficulty = "hard".into();
        let mut easy = recipe("2", "Easy");
        easy.difficulty = "Easy".into();
        let mut moderate = recipe("3", "Moderate");
        moderate.difficulty = "moderate".into();
        let mut unknown = recipe("4", "Unknown");
        unknown.difficulty = "chef-only".into();
        let source = vec![hard, unknown, easy, moderate];

        let result = run(
            &source,
            &Criteria::default().with_sort(SortKey::Difficulty),
            None,
        );
        assert_eq!(titles(&result), vec!["Easy", "Moderate", "Hard", "Unknown"]);
    }

    #[test]
    fn sort_is_stable_for_tied_keys() {
        let mut first = recipe("1", "Same");
        first.likes = 7;
        let mut second = recipe("2", "Same");
        second.likes = 7;
        let mut third = recipe("3", "Same");
        third.likes = 7;
        let source = vec![first, second, third];

        let result = run(&source, &Criteria::for_tab(FeedTab::Trending), None);
        assert_eq!(ids(&result), vec!["1", "2", "3"]);
    }

    #[test]
    fn engine_is_deterministic_across_invocations() {
        let source: Vec<Recipe> = (0..20)
            .map(|i| {
                let mut r = recipe(&i.to_string(), &format!("R{}", i % 4));
                r.likes = (i % 3) as u64;
                r
            })
            .collect();
        let criteria = Criteria::for_tab(FeedTab::MostPopular);
        let first = run(&source, &criteria, None);
        let second = run(&source, &criteria, None);
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn tab_and_sort_parse_from_page_labels() {
        assert_eq!(FeedTab::parse("Trending"), Some(FeedTab::Trending));
        assert_eq!(FeedTab::parse("new"), Some(FeedTab::Latest));
        assert_eq!(FeedTab::parse("Most Popular"), Some(FeedTab::MostPopular));
        assert_eq!(FeedTab::parse("brunch"), None);
        assert_eq!(SortKey::parse("cookTime"), Some(SortKey::CookTime));
        assert_eq!(SortKey::parse("title"), Some(SortKey::Title));
        assert_eq!(SortKey::parse(""), None);
    }
}
