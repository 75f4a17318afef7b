//! Handlers not linked to a specific url

use ntex::web;
use ntex_files::NamedFile;

use crate::front::{AppState, errors};

/// Serve `favicon.ico`
#[web::get("/favicon.ico")]
pub async fn serve_favicon(
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    Ok(NamedFile::open(format!("{}/favicon.ico", app_state.static_dir))?)
}

/// Return a [UrlNotFound](errors::UserError::UrlNotFound) error for urls not defined
pub async fn serve_not_found() -> Result<web::HttpResponse, web::Error> {
    Err(errors::UserError::UrlNotFound.into())
}

/// Serves the built single page site; the client handles the `#admin` view
#[web::get("/")]
pub async fn index(app_state: web::types::State<AppState>) -> Result<impl web::Responder, web::Error> {
    Ok(NamedFile::open(format!("{}/index.html", app_state.static_dir))?)
}
