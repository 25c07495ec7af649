//! Menu derivation from activity types and their latest activities.
//!
//! # Algorithm Summary
//!
//! 1. Look up the last activity of every type concurrently. The first failed
//!    lookup aborts the whole pass.
//! 2. Resolve each type into a [`MenuItem`] (see [`crate::toggle`]).
//! 3. Assemble the items into a menu:
//!    - v1: flat `"{name} ({elapsed})"` labels, deduplicated, plus one
//!      `"{id},{status}"` entry per type (never deduplicated).
//!    - v2: grouped as in-progress, not-started, non-toggle. Toggle groups
//!      sort never-logged first, then most recent first. The non-toggle group
//!      sorts never-logged first, then oldest first.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extract::active_game;
use crate::toggle::{MenuItem, MenuStatus, resolve};
use crate::types::{Activity, ActivityType, ActivityTypeId};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Substring that marks an in-progress item as a gaming session.
const GAMING_KEYWORD: &str = "gaming";

/// Menu derivation errors.
#[derive(Debug, Error)]
pub enum MenuError {
    /// Looking up the last activity for a type failed.
    #[error("failed to look up last activity for type {type_id}")]
    LookupFailure {
        type_id: ActivityTypeId,
        #[source]
        source: BoxError,
    },
    /// Listing the activity types failed.
    #[error("failed to list activity types")]
    ListFailure {
        #[source]
        source: BoxError,
    },
}

/// Where activity types and their latest activities come from.
///
/// Implemented by the storage layer, or by test fixtures.
pub trait ActivitySource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns every activity type.
    fn list_activity_types(&self)
    -> impl Future<Output = Result<Vec<ActivityType>, Self::Error>>;

    /// Returns the most recent activity of the given type, if any.
    fn last_activity_for_type(
        &self,
        type_id: ActivityTypeId,
    ) -> impl Future<Output = Result<Option<Activity>, Self::Error>>;
}

/// Flat, deduplicated menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuV1 {
    /// Unique `"{name} ({elapsed})"` labels in first-seen order.
    pub items: Vec<String>,
    /// One `"{id},{status}"` entry per activity type.
    pub ids: Vec<String>,
}

/// Grouped and sorted menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuV2 {
    pub labels: Vec<String>,
    /// Items in the same group order as `labels`.
    pub ids: Vec<MenuItem>,
}

/// Derives the v1 menu as of now.
pub async fn derive_menu_v1<S: ActivitySource>(
    types: &[ActivityType],
    source: &S,
) -> Result<MenuV1, MenuError> {
    derive_menu_v1_at(types, source, Utc::now()).await
}

/// Derives the v1 menu with elapsed times measured from `now`.
pub async fn derive_menu_v1_at<S: ActivitySource>(
    types: &[ActivityType],
    source: &S,
    now: DateTime<Utc>,
) -> Result<MenuV1, MenuError> {
    let items = resolve_all(types, source, now).await?;
    Ok(assemble_v1(&items))
}

/// Derives the v2 menu as of now.
pub async fn derive_menu_v2<S: ActivitySource>(
    types: &[ActivityType],
    source: &S,
) -> Result<MenuV2, MenuError> {
    derive_menu_v2_at(types, source, Utc::now()).await
}

/// Derives the v2 menu with elapsed times measured from `now`.
pub async fn derive_menu_v2_at<S: ActivitySource>(
    types: &[ActivityType],
    source: &S,
    now: DateTime<Utc>,
) -> Result<MenuV2, MenuError> {
    let items = resolve_all(types, source, now).await?;
    Ok(assemble_v2(items))
}

/// Lists the types through `source`, then derives the v1 menu.
pub async fn menu_v1_for<S: ActivitySource>(source: &S) -> Result<MenuV1, MenuError> {
    let types = list_types(source).await?;
    derive_menu_v1(&types, source).await
}

/// Lists the types through `source`, then derives the v2 menu.
pub async fn menu_v2_for<S: ActivitySource>(source: &S) -> Result<MenuV2, MenuError> {
    let types = list_types(source).await?;
    derive_menu_v2(&types, source).await
}

async fn list_types<S: ActivitySource>(source: &S) -> Result<Vec<ActivityType>, MenuError> {
    source
        .list_activity_types()
        .await
        .map_err(|err| MenuError::ListFailure {
            source: Box::new(err),
        })
}

/// Resolves every type, keeping the input order.
async fn resolve_all<S: ActivitySource>(
    types: &[ActivityType],
    source: &S,
    now: DateTime<Utc>,
) -> Result<Vec<MenuItem>, MenuError> {
    let lookups = types.iter().map(|activity_type| async move {
        let last = source
            .last_activity_for_type(activity_type.id)
            .await
            .map_err(|err| {
                tracing::debug!(
                    type_id = %activity_type.id,
                    error = %err,
                    "last activity lookup failed"
                );
                MenuError::LookupFailure {
                    type_id: activity_type.id,
                    source: Box::new(err),
                }
            })?;
        Ok::<_, MenuError>(resolve(activity_type, last.as_ref(), now))
    });

    let items = try_join_all(lookups).await?;
    tracing::debug!(types = items.len(), "resolved menu items");
    Ok(items)
}

fn assemble_v1(items: &[MenuItem]) -> MenuV1 {
    let mut seen = HashSet::new();
    let labels = items
        .iter()
        .map(MenuItem::label)
        .filter(|label| seen.insert(label.clone()))
        .collect();
    let ids = items
        .iter()
        .map(|item| format!("{},{}", item.id, item.status))
        .collect();

    MenuV1 { items: labels, ids }
}

fn assemble_v2(items: Vec<MenuItem>) -> MenuV2 {
    let mut in_progress = Vec::new();
    let mut not_started = Vec::new();
    let mut non_toggle = Vec::new();
    for item in items {
        match item.status {
            MenuStatus::End => in_progress.push(item),
            MenuStatus::Start => not_started.push(item),
            MenuStatus::None => non_toggle.push(item),
        }
    }

    non_toggle.sort_by(|a, b| oldest_first(a.last_logged, b.last_logged));

    let mut in_progress_labels: Vec<_> = in_progress
        .iter()
        .map(|item| (item.last_logged, in_progress_label(item)))
        .collect();
    in_progress_labels.sort_by(|a, b| most_recent_first(a.0, b.0));

    let mut not_started_labels: Vec<_> = not_started
        .iter()
        .map(|item| (item.last_logged, item.label()))
        .collect();
    not_started_labels.sort_by(|a, b| most_recent_first(a.0, b.0));

    let labels = in_progress_labels
        .into_iter()
        .chain(not_started_labels)
        .map(|(_, label)| label)
        .chain(non_toggle.iter().map(MenuItem::label))
        .collect();

    let mut ids = in_progress;
    ids.append(&mut not_started);
    ids.append(&mut non_toggle);

    MenuV2 { labels, ids }
}

fn in_progress_label(item: &MenuItem) -> String {
    if item.name.contains(GAMING_KEYWORD) {
        if let Some(game) = active_game(&item.description) {
            return format!("{} - {game} ({})", item.name, item.time_elapsed);
        }
    }
    item.label()
}

/// Never-logged (`0`) first, then descending timestamp.
fn most_recent_first(a: i64, b: i64) -> Ordering {
    match (a, b) {
        (0, 0) => Ordering::Equal,
        (0, _) => Ordering::Less,
        (_, 0) => Ordering::Greater,
        _ => b.cmp(&a),
    }
}

/// Never-logged (`0`) first, then ascending timestamp.
fn oldest_first(a: i64, b: i64) -> Ordering {
    match (a, b) {
        (0, 0) => Ordering::Equal,
        (0, _) => Ordering::Less,
        (_, 0) => Ordering::Greater,
        _ => a.cmp(&b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;
    use std::collections::HashMap;

    use crate::elapsed::NOT_AVAILABLE;
    use crate::types::{ActivityId, ActivityStatus};

    const HOUR: i64 = 3_600_000;

    #[derive(Debug, Error)]
    #[error("store unavailable")]
    struct StoreDown;

    /// In-memory source that yields once per lookup so lookups interleave.
    #[derive(Default)]
    struct FakeSource {
        types: Vec<ActivityType>,
        last: HashMap<ActivityTypeId, Activity>,
        failing: Option<ActivityTypeId>,
        in_flight: Cell<usize>,
        peak_in_flight: Cell<usize>,
    }

    impl FakeSource {
        fn with_types(types: Vec<ActivityType>) -> Self {
            Self {
                types,
                ..Default::default()
            }
        }

        fn log(&mut self, type_id: i64, status: Option<ActivityStatus>, at: i64, desc: &str) {
            let type_id = ActivityTypeId::from(type_id);
            self.last.insert(
                type_id,
                Activity {
                    id: ActivityId::from(type_id.get() * 100),
                    type_id,
                    timestamp: at,
                    status,
                    description: Some(desc.to_string()),
                },
            );
        }
    }

    impl ActivitySource for FakeSource {
        type Error = StoreDown;

        async fn list_activity_types(&self) -> Result<Vec<ActivityType>, StoreDown> {
            Ok(self.types.clone())
        }

        async fn last_activity_for_type(
            &self,
            type_id: ActivityTypeId,
        ) -> Result<Option<Activity>, StoreDown> {
            self.in_flight.set(self.in_flight.get() + 1);
            self.peak_in_flight
                .set(self.peak_in_flight.get().max(self.in_flight.get()));
            tokio::task::yield_now().await;
            self.in_flight.set(self.in_flight.get() - 1);

            if self.failing == Some(type_id) {
                return Err(StoreDown);
            }
            Ok(self.last.get(&type_id).cloned())
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
    }

    fn hours_ago(hours: i64) -> i64 {
        now().timestamp_millis() - hours * HOUR
    }

    fn toggle(id: i64, name: &str) -> ActivityType {
        ActivityType {
            id: ActivityTypeId::from(id),
            name: name.to_string(),
            toggle: true,
            start_label: Some(format!("Start {name}")),
            end_label: Some(format!("End {name}")),
            category_id: None,
            description: None,
        }
    }

    fn plain(id: i64, name: &str) -> ActivityType {
        ActivityType {
            id: ActivityTypeId::from(id),
            name: name.to_string(),
            toggle: false,
            start_label: None,
            end_label: None,
            category_id: None,
            description: None,
        }
    }

    fn item(id: i64, status: MenuStatus, last_logged: i64) -> MenuItem {
        MenuItem {
            name: format!("item {id}"),
            id: ActivityTypeId::from(id),
            status,
            time_elapsed: "1h".to_string(),
            description: String::new(),
            last_logged,
        }
    }

    // ========== v1 ==========

    #[tokio::test]
    async fn v1_formats_labels_and_id_pairs() {
        let mut source = FakeSource::with_types(vec![toggle(1, "work"), plain(2, "water")]);
        source.log(1, Some(ActivityStatus::Start), hours_ago(2), "");

        let menu = derive_menu_v1_at(&source.types, &source, now()).await.unwrap();

        assert_eq!(menu.items, vec!["End work (2h)", "water (N/A)"]);
        assert_eq!(menu.ids, vec!["1,end", "2,none"]);
    }

    #[tokio::test]
    async fn v1_deduplicates_labels_but_not_ids() {
        // Two types named alike, both logged at the same moment.
        let mut source = FakeSource::with_types(vec![
            plain(1, "stretch"),
            plain(2, "stretch"),
            plain(3, "walk"),
        ]);
        source.log(1, None, hours_ago(1), "");
        source.log(2, None, hours_ago(1), "");

        let menu = derive_menu_v1_at(&source.types, &source, now()).await.unwrap();

        assert_eq!(menu.items, vec!["stretch (1h)", "walk (N/A)"]);
        assert_eq!(menu.ids, vec!["1,none", "2,none", "3,none"]);
        assert!(menu.items.len() <= menu.ids.len());
    }

    #[test]
    fn v1_ids_may_repeat_while_items_stay_unique() {
        let items = vec![
            item(7, MenuStatus::Start, 0),
            item(7, MenuStatus::Start, 0),
        ];
        let menu = assemble_v1(&items);
        assert_eq!(menu.items, vec!["item 7 (1h)"]);
        assert_eq!(menu.ids, vec!["7,start", "7,start"]);
    }

    #[tokio::test]
    async fn v1_empty_types_yield_empty_menu() {
        let source = FakeSource::default();
        let menu = derive_menu_v1_at(&[], &source, now()).await.unwrap();
        assert_eq!(menu, MenuV1::default());
    }

    // ========== v2 ==========

    #[tokio::test]
    async fn v2_groups_in_progress_then_not_started_then_non_toggle() {
        let mut source = FakeSource::with_types(vec![
            plain(1, "water"),
            toggle(2, "work"),
            toggle(3, "reading"),
        ]);
        source.log(1, None, hours_ago(4), "");
        source.log(3, Some(ActivityStatus::Start), hours_ago(1), "chapter 3");

        let menu = derive_menu_v2_at(&source.types, &source, now()).await.unwrap();

        assert_eq!(
            menu.labels,
            vec!["End reading (1h)", "Start work (N/A)", "water (4h)"]
        );
        let statuses: Vec<_> = menu.ids.iter().map(|item| item.status).collect();
        assert_eq!(
            statuses,
            vec![MenuStatus::End, MenuStatus::Start, MenuStatus::None]
        );
        assert_eq!(menu.ids[0].description, "chapter 3");
    }

    #[tokio::test]
    async fn v2_labels_and_ids_share_group_boundaries() {
        let mut source = FakeSource::with_types(vec![
            toggle(1, "a"),
            toggle(2, "b"),
            plain(3, "c"),
            toggle(4, "d"),
            plain(5, "e"),
        ]);
        source.log(1, Some(ActivityStatus::Start), hours_ago(1), "");
        source.log(2, Some(ActivityStatus::End), hours_ago(2), "");
        source.log(4, Some(ActivityStatus::Start), hours_ago(3), "");

        let menu = derive_menu_v2_at(&source.types, &source, now()).await.unwrap();

        assert_eq!(menu.labels.len(), menu.ids.len());
        let count = |status| menu.ids.iter().filter(|i| i.status == status).count();
        assert_eq!(count(MenuStatus::End), 2);
        assert_eq!(count(MenuStatus::Start), 1);
        assert_eq!(count(MenuStatus::None), 2);
        assert!(menu.labels[..2].iter().all(|l| l.starts_with("End ")));
        assert!(menu.labels[2].starts_with("Start "));
    }

    #[test]
    fn v2_toggle_groups_sort_never_logged_then_most_recent() {
        let menu = assemble_v2(vec![
            item(1, MenuStatus::End, 0),
            item(2, MenuStatus::End, 500),
            item(3, MenuStatus::End, 100),
            item(4, MenuStatus::Start, 100),
            item(5, MenuStatus::Start, 500),
            item(6, MenuStatus::Start, 0),
        ]);

        assert_eq!(
            menu.labels,
            vec![
                "item 1 (1h)",
                "item 2 (1h)",
                "item 3 (1h)",
                "item 6 (1h)",
                "item 5 (1h)",
                "item 4 (1h)",
            ]
        );
    }

    #[test]
    fn v2_non_toggle_group_sorts_never_logged_then_oldest() {
        let menu = assemble_v2(vec![
            item(1, MenuStatus::None, 0),
            item(2, MenuStatus::None, 500),
            item(3, MenuStatus::None, 100),
        ]);

        assert_eq!(
            menu.labels,
            vec!["item 1 (1h)", "item 3 (1h)", "item 2 (1h)"]
        );
        let ids: Vec<_> = menu.ids.iter().map(|i| i.id.get()).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn v2_toggle_ids_keep_resolver_order() {
        let menu = assemble_v2(vec![
            item(1, MenuStatus::End, 100),
            item(2, MenuStatus::End, 500),
            item(3, MenuStatus::Start, 100),
            item(4, MenuStatus::Start, 500),
        ]);

        assert_eq!(
            menu.labels,
            vec!["item 2 (1h)", "item 1 (1h)", "item 4 (1h)", "item 3 (1h)"]
        );
        let ids: Vec<_> = menu.ids.iter().map(|i| i.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn v2_gaming_label_names_active_game() {
        let mut source = FakeSource::with_types(vec![ActivityType {
            end_label: Some("gaming session".to_string()),
            ..toggle(1, "gaming")
        }]);
        source.log(1, Some(ActivityStatus::Start), hours_ago(2), "Game: Chess");

        let menu = derive_menu_v2_at(&source.types, &source, now()).await.unwrap();

        assert_eq!(menu.labels, vec!["gaming session - Chess (2h)"]);
    }

    #[tokio::test]
    async fn v2_gaming_label_without_game_falls_back() {
        let mut source = FakeSource::with_types(vec![ActivityType {
            end_label: Some("gaming session".to_string()),
            ..toggle(1, "gaming")
        }]);
        source.log(1, Some(ActivityStatus::Start), hours_ago(2), "with friends");

        let menu = derive_menu_v2_at(&source.types, &source, now()).await.unwrap();

        assert_eq!(menu.labels, vec!["gaming session (2h)"]);
    }

    #[test]
    fn v2_game_extraction_only_applies_to_in_progress_gaming_items() {
        let mut not_started = item(1, MenuStatus::Start, 0);
        not_started.name = "Start gaming".to_string();
        not_started.description = "Game: Chess".to_string();
        let mut other = item(2, MenuStatus::End, 0);
        other.name = "End reading".to_string();
        other.description = "Game: Chess".to_string();
        let mut capitalised = item(3, MenuStatus::End, 0);
        capitalised.name = "End Gaming".to_string();
        capitalised.description = "Game: Chess".to_string();

        let menu = assemble_v2(vec![not_started, other, capitalised]);

        assert_eq!(
            menu.labels,
            vec!["End reading (1h)", "End Gaming (1h)", "Start gaming (1h)"]
        );
    }

    #[tokio::test]
    async fn v2_never_logged_items_carry_sentinels() {
        let source = FakeSource::with_types(vec![toggle(1, "work"), plain(2, "water")]);

        let menu = derive_menu_v2_at(&source.types, &source, now()).await.unwrap();

        for item in &menu.ids {
            assert_eq!(item.last_logged, 0);
            assert_eq!(item.time_elapsed, NOT_AVAILABLE);
        }
    }

    // ========== concurrency & failure ==========

    #[tokio::test]
    async fn lookups_run_concurrently() {
        let source = FakeSource::with_types((1..=5).map(|i| toggle(i, "t")).collect());

        derive_menu_v1_at(&source.types, &source, now()).await.unwrap();

        assert_eq!(source.peak_in_flight.get(), 5);
    }

    #[tokio::test]
    async fn one_failed_lookup_fails_the_whole_pass() {
        let mut source = FakeSource::with_types((1..=4).map(|i| toggle(i, "t")).collect());
        source.failing = Some(ActivityTypeId::from(3));

        let v1 = derive_menu_v1_at(&source.types, &source, now()).await;
        let v2 = derive_menu_v2_at(&source.types, &source, now()).await;

        for err in [v1.unwrap_err(), v2.unwrap_err()] {
            match err {
                MenuError::LookupFailure { type_id, source: cause } => {
                    assert_eq!(type_id, ActivityTypeId::from(3));
                    assert_eq!(cause.to_string(), "store unavailable");
                }
                MenuError::ListFailure { .. } => panic!("expected a lookup failure"),
            }
        }
    }

    #[tokio::test]
    async fn menu_for_source_lists_types_first() {
        let mut source = FakeSource::with_types(vec![toggle(1, "work")]);
        source.log(1, Some(ActivityStatus::End), hours_ago(1), "");

        let v1 = menu_v1_for(&source).await.unwrap();
        assert_eq!(v1.ids, vec!["1,start"]);

        let v2 = menu_v2_for(&source).await.unwrap();
        assert_eq!(v2.ids.len(), 1);
        assert_eq!(v2.ids[0].status, MenuStatus::Start);
    }

    #[test]
    fn recency_comparators_put_never_logged_first() {
        let mut values = vec![100, 0, 500];
        values.sort_by(|a, b| most_recent_first(*a, *b));
        assert_eq!(values, vec![0, 500, 100]);

        let mut values = vec![500, 0, 100];
        values.sort_by(|a, b| oldest_first(*a, *b));
        assert_eq!(values, vec![0, 100, 500]);
    }
}
