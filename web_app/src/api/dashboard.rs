//! # Dashboard Aggregator
//!
//! Pure reductions of an [`AnalyticsSnapshot`] into the values shown on the
//! Admin analytics screen. Nothing here writes; missing keys count as zero
//! and an empty snapshot simply means no data yet.

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::{
    api::keys::{self, CounterKind},
    consts,
    models::analytics::{AnalyticsSnapshot, CounterDoc, CounterMapping, Scope},
    repo,
};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailyPoint {
    /// `YYYY-MM-DD` suffix of the counter key.
    pub date: String,
    /// Short `MM/DD` label for the chart axis.
    pub label: String,
    pub count: i64,
    /// Bar height relative to the chart scale, in `0.0..=1.0`.
    pub ratio: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailySeries {
    pub points: Vec<DailyPoint>,
    /// Chart denominator, never below [`consts::MIN_CHART_SCALE`].
    pub scale: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TopEvent {
    /// Counter key without the scope prefix.
    pub label: String,
    pub count: i64,
    /// Share of the scope's total interactions, in percent.
    pub share: f64,
}

/// Global figures shown regardless of the selected scope.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Overview {
    pub today_hits: i64,
    pub total_hits: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardStats {
    pub scope: Scope,
    pub total_visits: i64,
    pub total_interactions: i64,
    pub today: i64,
    pub daily: DailySeries,
    pub top_events: Vec<TopEvent>,
    pub overview: Overview,
}

fn counter(mapping: &CounterMapping, key: &str) -> i64 {
    mapping.get(key).copied().unwrap_or_default()
}

pub fn total_visits(snapshot: &AnalyticsSnapshot, scope: Scope) -> i64 {
    counter(
        &snapshot.visits,
        &keys::build_key(scope, &CounterKind::TotalHits),
    )
}

pub fn total_interactions(snapshot: &AnalyticsSnapshot, scope: Scope) -> i64 {
    counter(
        &snapshot.events,
        &keys::build_key(scope, &CounterKind::TotalInteractions),
    )
}

pub fn today_count(snapshot: &AnalyticsSnapshot, scope: Scope, today: NaiveDate) -> i64 {
    counter(
        &snapshot.visits,
        &keys::build_key(scope, &CounterKind::Daily(today)),
    )
}

/// The last `days` daily counters of the scope, oldest first.
///
/// Days without a counter are not filled in, so fewer than `days` points
/// come back when the history is short.
///
/// # Arguments
/// * `snapshot` - Counter documents read for this request
/// * `scope` - Partition to read, `All` reads the unprefixed keys
/// * `days` - Maximum number of points
///
/// # Returns
/// * `DailySeries` - Points with their bar ratio and the chart scale,
///   which never drops below 10
pub fn daily_series(snapshot: &AnalyticsSnapshot, scope: Scope, days: usize) -> DailySeries {
    let prefix = keys::daily_prefix(scope);

    // BTreeMap iteration is already sorted by key, and ISO dates sort chronologically
    let daily: Vec<(&String, i64)> = snapshot
        .visits
        .iter()
        .filter(|(key, _)| key.starts_with(&prefix))
        .map(|(key, count)| (key, *count))
        .collect();

    let skip = daily.len().saturating_sub(days);
    let window = &daily[skip..];

    let scale = window
        .iter()
        .map(|(_, count)| *count)
        .max()
        .unwrap_or_default()
        .max(consts::MIN_CHART_SCALE);

    let points = window
        .iter()
        .map(|(key, count)| {
            let date = key[prefix.len()..].to_string();
            DailyPoint {
                label: axis_label(&date),
                ratio: *count as f64 / scale as f64,
                count: *count,
                date,
            }
        })
        .collect();

    DailySeries { points, scale }
}

/// `2024-03-09` becomes `03/09`.
fn axis_label(date: &str) -> String {
    date.split('-').skip(1).collect::<Vec<_>>().join("/")
}

fn is_event_detail_key(key: &str, scope: Scope) -> bool {
    match scope {
        Scope::All => {
            !key.starts_with(keys::EVENT_COUNT_PREFIX)
                && key != keys::TOTAL_INTERACTIONS
                && !key.starts_with(&Scope::Local.prefix())
                && !key.starts_with(&Scope::Prod.prefix())
        }
        env => {
            key.starts_with(&env.prefix())
                && !key.contains(keys::EVENT_COUNT_PREFIX)
                && !key.contains(keys::TOTAL_INTERACTIONS)
        }
    }
}

/// The `limit` busiest event details of the scope, busiest first.
///
/// # Arguments
/// * `snapshot` - Counter documents read for this request
/// * `scope` - Partition to read
/// * `limit` - Maximum number of events
///
/// # Returns
/// * `Vec<TopEvent>` - Labels without the scope prefix, with their share of
///   the scope's total interactions. Equal counts keep key order.
pub fn top_events(snapshot: &AnalyticsSnapshot, scope: Scope, limit: usize) -> Vec<TopEvent> {
    let prefix = scope.prefix();
    let total = total_interactions(snapshot, scope).max(1);

    let mut details: Vec<(&String, i64)> = snapshot
        .events
        .iter()
        .filter(|(key, _)| is_event_detail_key(key, scope))
        .map(|(key, count)| (key, *count))
        .collect();
    details.sort_by(|a, b| b.1.cmp(&a.1));

    details
        .into_iter()
        .take(limit)
        .map(|(key, count)| TopEvent {
            label: key.strip_prefix(&prefix).unwrap_or(key).to_string(),
            share: count as f64 * 100.0 / total as f64,
            count,
        })
        .collect()
}

/// Builds everything the Admin analytics screen shows for one scope.
///
/// # Arguments
/// * `snapshot` - Counter documents read for this request
/// * `scope` - Partition selected on the screen
/// * `days` - Length of the daily series
/// * `top` - Number of top events
/// * `today` - Date used for today's counters (UTC)
///
/// # Returns
/// * `DashboardStats` - Scoped figures plus an all-scope overview
pub fn dashboard_stats(
    snapshot: &AnalyticsSnapshot,
    scope: Scope,
    days: usize,
    top: usize,
    today: NaiveDate,
) -> DashboardStats {
    DashboardStats {
        scope,
        total_visits: total_visits(snapshot, scope),
        total_interactions: total_interactions(snapshot, scope),
        today: today_count(snapshot, scope, today),
        daily: daily_series(snapshot, scope, days),
        top_events: top_events(snapshot, scope, top),
        overview: Overview {
            today_hits: today_count(snapshot, Scope::All, today),
            total_hits: total_visits(snapshot, Scope::All),
        },
    }
}

/// Reads both counter documents.
///
/// A failed read is logged and treated as an empty document, the screen
/// then shows "no data yet" instead of an error.
pub async fn load_snapshot(repo: &repo::ImplSiteRepo) -> AnalyticsSnapshot {
    AnalyticsSnapshot {
        visits: read_or_empty(repo, CounterDoc::Visits).await,
        events: read_or_empty(repo, CounterDoc::Events).await,
        taken_at: Utc::now(),
    }
}

async fn read_or_empty(repo: &repo::ImplSiteRepo, doc: CounterDoc) -> CounterMapping {
    repo.read_document(doc).await.unwrap_or_else(|e| {
        log::warn!("analytics read failed for {doc}: {e}");
        CounterMapping::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::recorder::{EventRecorder, TrackedEvent},
        models::analytics::{Environment, NavigationContext},
        repo::{MockSiteRepo, sqlite},
    };
    use serde_json::json;
    use std::sync::Arc;

    fn mapping(pairs: &[(&str, i64)]) -> CounterMapping {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn snapshot(visits: &[(&str, i64)], events: &[(&str, i64)]) -> AnalyticsSnapshot {
        AnalyticsSnapshot {
            visits: mapping(visits),
            events: mapping(events),
            taken_at: Utc::now(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_totals_by_scope() {
        let snap = snapshot(
            &[("totalHits", 9), ("prod_totalHits", 7), ("local_totalHits", 2)],
            &[("total_interactions", 4), ("prod_total_interactions", 4)],
        );

        assert_eq!(total_visits(&snap, Scope::All), 9);
        assert_eq!(total_visits(&snap, Scope::Prod), 7);
        assert_eq!(total_visits(&snap, Scope::Local), 2);
        assert_eq!(total_interactions(&snap, Scope::All), 4);
        assert_eq!(total_interactions(&snap, Scope::Local), 0);
    }

    #[test]
    fn test_empty_snapshot_is_zero() {
        let snap = AnalyticsSnapshot::default();
        let today = date("2025-01-01");

        let stats = dashboard_stats(&snap, Scope::All, 7, 6, today);

        assert_eq!(stats.total_visits, 0);
        assert_eq!(stats.total_interactions, 0);
        assert_eq!(stats.today, 0);
        assert!(stats.daily.points.is_empty());
        assert_eq!(stats.daily.scale, 10);
        assert!(stats.top_events.is_empty());
    }

    #[test]
    fn test_daily_series_takes_last_days_ascending() {
        let visits: Vec<(String, i64)> = (1..=9)
            .map(|d| (format!("prod_daily_2025-02-0{d}"), d as i64))
            .collect();
        let mut snap = AnalyticsSnapshot::default();
        snap.visits = visits.into_iter().collect();
        snap.visits.insert("daily_2025-02-09".into(), 100);

        let series = daily_series(&snap, Scope::Prod, 7);

        let dates: Vec<&str> = series.points.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(
            dates,
            vec![
                "2025-02-03",
                "2025-02-04",
                "2025-02-05",
                "2025-02-06",
                "2025-02-07",
                "2025-02-08",
                "2025-02-09"
            ]
        );
        assert_eq!(series.points[0].label, "02/03");
        assert_eq!(series.scale, 10);
    }

    #[test]
    fn test_daily_series_does_not_zero_fill() {
        let snap = snapshot(
            &[("prod_daily_2025-03-01", 3), ("prod_daily_2025-03-05", 40)],
            &[],
        );

        let series = daily_series(&snap, Scope::Prod, 7);

        assert_eq!(series.points.len(), 2);
        assert_eq!(series.scale, 40);
        assert_eq!(series.points[1].ratio, 1.0);
    }

    #[test]
    fn test_daily_series_all_scope_ignores_environment_keys() {
        let snap = snapshot(
            &[
                ("daily_2025-03-01", 5),
                ("local_daily_2025-03-02", 1),
                ("prod_daily_2025-03-01", 4),
            ],
            &[],
        );

        let series = daily_series(&snap, Scope::All, 7);

        assert_eq!(series.points.len(), 1);
        assert_eq!(series.points[0].count, 5);
    }

    #[test]
    fn test_top_events_all_scope_filters_aggregates() {
        let snap = snapshot(
            &[],
            &[
                ("total_interactions", 20),
                ("count_nav_click", 12),
                ("nav_click_skills", 8),
                ("nav_click_home", 4),
                ("cta_click_lets_connect", 8),
                ("prod_nav_click_skills", 8),
                ("local_cta_click_lets_connect", 1),
            ],
        );

        let top = top_events(&snap, Scope::All, 6);

        let labels: Vec<&str> = top.iter().map(|e| e.label.as_str()).collect();
        // equal counts keep key order
        assert_eq!(
            labels,
            vec!["cta_click_lets_connect", "nav_click_skills", "nav_click_home"]
        );
        assert_eq!(top[0].share, 40.0);
        assert!(top.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn test_top_events_environment_scope_strips_prefix() {
        let snap = snapshot(
            &[],
            &[
                ("prod_total_interactions", 3),
                ("prod_count_cta_click", 3),
                ("prod_cta_click_view_projects", 2),
                ("prod_cta_click_lets_connect", 1),
                ("local_cta_click_view_projects", 9),
            ],
        );

        let top = top_events(&snap, Scope::Prod, 6);

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].label, "cta_click_view_projects");
        assert_eq!(top[0].count, 2);
        assert_eq!(top[1].label, "cta_click_lets_connect");
    }

    #[test]
    fn test_top_events_limit() {
        let events: Vec<(String, i64)> = (0..10).map(|i| (format!("e_{i}"), i)).collect();
        let mut snap = AnalyticsSnapshot::default();
        snap.events = events.into_iter().collect();

        let top = top_events(&snap, Scope::All, 6);

        assert_eq!(top.len(), 6);
        assert_eq!(top[0].label, "e_9");
        // no total_interactions: share falls back to a denominator of 1
        assert_eq!(top[0].share, 900.0);
    }

    #[test]
    fn test_today_count() {
        let snap = snapshot(
            &[("daily_2025-04-02", 6), ("local_daily_2025-04-02", 2)],
            &[],
        );
        let today = date("2025-04-02");

        assert_eq!(today_count(&snap, Scope::All, today), 6);
        assert_eq!(today_count(&snap, Scope::Local, today), 2);
        assert_eq!(today_count(&snap, Scope::Prod, today), 0);
    }

    #[test]
    fn test_reads_are_repeatable() {
        let snap = snapshot(
            &[("totalHits", 3), ("daily_2025-04-02", 3)],
            &[("a_total", 2), ("b_total", 2), ("total_interactions", 4)],
        );
        let today = date("2025-04-02");

        assert_eq!(
            dashboard_stats(&snap, Scope::All, 7, 6, today),
            dashboard_stats(&snap, Scope::All, 7, 6, today)
        );
    }

    #[ntex::test]
    async fn test_recorded_keys_land_in_matching_scope() {
        let repo: repo::ImplSiteRepo = Arc::new(sqlite::memory_repo().await);
        let prod = EventRecorder::new(repo.clone(), None, Environment::Prod);
        let local = EventRecorder::new(repo.clone(), None, Environment::Local);
        let today = date("2025-05-05");

        prod.record_visit_on(today).await;
        local.record_visit_on(today).await;
        prod.record_event(
            NavigationContext::Portfolio,
            &TrackedEvent::new("cta_click", json!({"button": "hire"}).as_object().cloned().unwrap()),
        )
        .await;
        local
            .record_event(NavigationContext::Portfolio, &TrackedEvent::resume_download())
            .await;

        let snap = load_snapshot(&repo).await;

        assert_eq!(total_visits(&snap, Scope::All), 2);
        assert_eq!(total_visits(&snap, Scope::Prod), 1);
        assert_eq!(today_count(&snap, Scope::Local, today), 1);
        assert_eq!(daily_series(&snap, Scope::All, 7).points.len(), 1);
        assert_eq!(total_interactions(&snap, Scope::All), 2);

        let all: Vec<String> = top_events(&snap, Scope::All, 6)
            .into_iter()
            .map(|e| e.label)
            .collect();
        assert_eq!(all, vec!["cta_click_hire", "resume_download_total"]);

        let prod_top = top_events(&snap, Scope::Prod, 6);
        assert_eq!(prod_top.len(), 1);
        assert_eq!(prod_top[0].label, "cta_click_hire");
        assert_eq!(prod_top[0].share, 100.0);

        // no visit key is ever counted as an event and the other way round
        for key in snap.visits.keys() {
            assert!(key.ends_with("totalHits") || key.contains("daily_"), "{key}");
        }
        for key in snap.events.keys() {
            assert!(!key.ends_with("totalHits") && !key.contains("daily_"), "{key}");
        }
    }

    #[ntex::test]
    async fn test_load_snapshot_failure_is_empty() {
        let mut mock_repo = MockSiteRepo::new();
        mock_repo
            .expect_read_document()
            .times(2)
            .returning(|_| Err(anyhow::anyhow!("unavailable")));
        let repo: repo::ImplSiteRepo = Arc::new(mock_repo);

        let snap = load_snapshot(&repo).await;

        assert!(snap.visits.is_empty() && snap.events.is_empty());
    }
}
