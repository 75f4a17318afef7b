//! Tracking endpoints called by the site and the Admin analytics screen.

use chrono::Utc;
use futures::stream;
use ntex::{util::Bytes, web};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;

use crate::{
    api::{dashboard, recorder::TrackedEvent},
    consts,
    front::{AppState, errors, middleware::admin_access::AdminAccess},
    models::analytics::{ErrorReport, EventParams, NavigationContext, Scope},
};

/// Counts a visit. The write runs detached, the response does not wait for it.
#[web::post("/visit")]
pub async fn track_visit(app_state: web::types::State<AppState>) -> impl web::Responder {
    app_state.recorder.spawn_visit();
    web::HttpResponse::Accepted().finish()
}

#[derive(Debug, Deserialize)]
pub struct TrackEventRequest {
    pub event_name: String,
    #[serde(default)]
    pub params: EventParams,
    /// `window.location.hash` of the page that fired the event
    pub location_hash: Option<String>,
}

#[web::post("/event")]
pub async fn track_event(
    app_state: web::types::State<AppState>,
    form: web::types::Json<TrackEventRequest>,
) -> Result<impl web::Responder, web::Error> {
    let form = form.into_inner();

    if form.event_name.trim().is_empty() {
        return Err(
            errors::UserError::FormInputValueError("event_name must not be empty".into()).into(),
        );
    }

    let context = NavigationContext::from_location_hash(form.location_hash.as_deref());
    app_state
        .recorder
        .spawn_event(context, TrackedEvent::new(&form.event_name, form.params));

    Ok(web::HttpResponse::Accepted().finish())
}

#[derive(Debug, Deserialize)]
pub struct PresetQuery {
    pub location_hash: Option<String>,
}

fn spawn_preset(
    app_state: &AppState,
    query: &PresetQuery,
    event: TrackedEvent,
) -> web::HttpResponse {
    let context = NavigationContext::from_location_hash(query.location_hash.as_deref());
    app_state.recorder.spawn_event(context, event);
    web::HttpResponse::Accepted().finish()
}

#[web::post("/page_view/{page_name}")]
pub async fn track_page_view(
    app_state: web::types::State<AppState>,
    page_name: web::types::Path<String>,
    query: web::types::Query<PresetQuery>,
) -> impl web::Responder {
    spawn_preset(&app_state, &query, TrackedEvent::page_view(&page_name))
}

#[web::post("/project_click/{project_id}")]
pub async fn track_project_click(
    app_state: web::types::State<AppState>,
    project_id: web::types::Path<String>,
    query: web::types::Query<PresetQuery>,
) -> impl web::Responder {
    spawn_preset(&app_state, &query, TrackedEvent::project_click(&project_id))
}

#[web::post("/resume_download")]
pub async fn track_resume_download(
    app_state: web::types::State<AppState>,
    query: web::types::Query<PresetQuery>,
) -> impl web::Responder {
    spawn_preset(&app_state, &query, TrackedEvent::resume_download())
}

#[web::post("/contact_click/{method}")]
pub async fn track_contact_click(
    app_state: web::types::State<AppState>,
    method: web::types::Path<String>,
    query: web::types::Query<PresetQuery>,
) -> impl web::Responder {
    spawn_preset(&app_state, &query, TrackedEvent::contact_click(&method))
}

#[web::post("/error")]
pub async fn track_error(
    app_state: web::types::State<AppState>,
    report: web::types::Json<ErrorReport>,
) -> impl web::Responder {
    app_state.recorder.record_error(&report);
    web::HttpResponse::Accepted().finish()
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub scope: Scope,
    pub days: Option<usize>,
    pub top: Option<usize>,
}

/// Aggregated counters for the Admin analytics screen.
#[web::get("/analytics")]
pub async fn get_dashboard(
    _: AdminAccess,
    app_state: web::types::State<AppState>,
    query: web::types::Query<DashboardQuery>,
) -> impl web::Responder {
    let snapshot = dashboard::load_snapshot(&app_state.repo).await;

    let stats = dashboard::dashboard_stats(
        &snapshot,
        query.scope,
        query.days.unwrap_or(consts::DEFAULT_DAILY_SERIES_DAYS),
        query.top.unwrap_or(consts::DEFAULT_TOP_EVENTS),
        Utc::now().date_naive(),
    );

    web::HttpResponse::Ok().json(&stats)
}

/// Server-sent events, one `change` message per counter document write.
///
/// The Admin screen refetches [`get_dashboard`] when a message arrives.
#[web::get("/analytics/stream")]
pub async fn stream_changes(
    _: AdminAccess,
    app_state: web::types::State<AppState>,
) -> impl web::Responder {
    let changes = app_state.repo.subscribe();

    let events = stream::unfold(changes, |mut changes| async move {
        loop {
            match changes.recv().await {
                Ok(doc) => {
                    let msg = Bytes::from(format!("event: change\ndata: {doc}\n\n"));
                    return Some((Ok::<_, std::io::Error>(msg), changes));
                }
                // skipped notifications are fine, the client refetches anyway
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return None,
            }
        }
    });

    web::HttpResponse::Ok()
        .content_type("text/event-stream")
        .set_header("cache-control", "no-cache")
        .streaming(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        front::{routes, test_state},
        models::analytics::CounterDoc,
        repo::{self, MockSiteRepo, sqlite},
    };
    use ntex::{http, web::test};
    use serde_json::json;
    use std::sync::Arc;

    #[ntex::test]
    async fn test_track_visit_is_recorded_in_background() {
        let repo: repo::ImplSiteRepo = Arc::new(sqlite::memory_repo().await);
        let mut changes = repo.subscribe();
        let app = test::init_service(
            web::App::new()
                .state(test_state(repo.clone()))
                .configure(routes::analytics),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/analytics/visit")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), http::StatusCode::ACCEPTED);
        assert_eq!(changes.recv().await.unwrap(), CounterDoc::Visits);

        let visits = repo.read_document(CounterDoc::Visits).await.unwrap();
        assert_eq!(visits.get("totalHits"), Some(&1));
        assert_eq!(visits.get("prod_totalHits"), Some(&1));
    }

    #[ntex::test]
    async fn test_track_event_rejects_blank_name() {
        let mut mock_repo = MockSiteRepo::new();
        mock_repo.expect_merge_increment().times(0);
        let app = test::init_service(
            web::App::new()
                .state(test_state(Arc::new(mock_repo)))
                .configure(routes::analytics),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/analytics/event")
            .set_json(&json!({"event_name": "  "}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);
    }

    #[ntex::test]
    async fn test_track_event_counts_detail() {
        let repo: repo::ImplSiteRepo = Arc::new(sqlite::memory_repo().await);
        let mut changes = repo.subscribe();
        let app = test::init_service(
            web::App::new()
                .state(test_state(repo.clone()))
                .configure(routes::analytics),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/analytics/event")
            .set_json(&json!({
                "event_name": "nav_click",
                "params": {"section_id": "projects"},
                "location_hash": "#projects"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), http::StatusCode::ACCEPTED);
        assert_eq!(changes.recv().await.unwrap(), CounterDoc::Events);

        let events = repo.read_document(CounterDoc::Events).await.unwrap();
        assert_eq!(events.get("nav_click_projects"), Some(&1));
        assert_eq!(events.get("prod_count_nav_click"), Some(&1));
    }

    #[ntex::test]
    async fn test_preset_contact_click() {
        let repo: repo::ImplSiteRepo = Arc::new(sqlite::memory_repo().await);
        let mut changes = repo.subscribe();
        let app = test::init_service(
            web::App::new()
                .state(test_state(repo.clone()))
                .configure(routes::analytics),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/analytics/contact_click/email")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), http::StatusCode::ACCEPTED);
        assert_eq!(changes.recv().await.unwrap(), CounterDoc::Events);

        let events = repo.read_document(CounterDoc::Events).await.unwrap();
        assert_eq!(events.get("contact_click_email"), Some(&1));
        assert_eq!(events.get("prod_count_contact_click"), Some(&1));
    }

    #[ntex::test]
    async fn test_preset_from_admin_is_dropped() {
        let repo: repo::ImplSiteRepo = Arc::new(sqlite::memory_repo().await);
        let mut changes = repo.subscribe();
        let app = test::init_service(
            web::App::new()
                .state(test_state(repo.clone()))
                .configure(routes::analytics),
        )
        .await;

        for uri in [
            "/api/analytics/page_view/home?location_hash=%23admin",
            "/api/analytics/page_view/home",
        ] {
            let req = test::TestRequest::post().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), http::StatusCode::ACCEPTED);
        }
        assert_eq!(changes.recv().await.unwrap(), CounterDoc::Events);

        let events = repo.read_document(CounterDoc::Events).await.unwrap();
        assert_eq!(events.get("count_page_view"), Some(&1));
        assert!(changes.try_recv().is_err());
    }

    #[ntex::test]
    async fn test_dashboard_requires_admin_pin() {
        let app = test::init_service(
            web::App::new()
                .state(test_state(Arc::new(MockSiteRepo::new())))
                .configure(routes::admin),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/admin/api/analytics")
            .header(consts::ADMIN_PIN_HEADER, "0000")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), http::StatusCode::UNAUTHORIZED);
    }

    #[ntex::test]
    async fn test_dashboard_returns_scoped_stats() {
        let repo: repo::ImplSiteRepo = Arc::new(sqlite::memory_repo().await);
        let state = test_state(repo.clone());
        state.recorder.record_visit().await;
        state.recorder.record_visit().await;
        let app = test::init_service(web::App::new().state(state).configure(routes::admin)).await;

        let req = test::TestRequest::get()
            .uri("/admin/api/analytics?scope=local")
            .header(consts::ADMIN_PIN_HEADER, "4321")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), http::StatusCode::OK);

        let body: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body["scope"], json!("local"));
        assert_eq!(body["total_visits"], json!(0));
        assert_eq!(body["overview"]["total_hits"], json!(2));
        assert_eq!(body["daily"]["scale"], json!(10));
    }
}
