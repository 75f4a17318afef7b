pub mod analytics;
pub mod content;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod server;

use crate::{api::recorder::EventRecorder, repo};

pub struct AppState {
    pub repo: repo::ImplSiteRepo,
    pub recorder: EventRecorder,
    /// 🔒 SENSITIVE: expected value of the admin pin header
    pub admin_pin: String,
    pub static_dir: String,
}

#[cfg(test)]
pub(crate) fn test_state(repo: repo::ImplSiteRepo) -> AppState {
    use crate::models::analytics::Environment;

    AppState {
        recorder: EventRecorder::new(repo.clone(), None, Environment::Prod),
        repo,
        admin_pin: "4321".into(),
        static_dir: "web/dist".into(),
    }
}
