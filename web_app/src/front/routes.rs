//! Frontend route configuration module.
//!
//! Routes are grouped by caller: the public site posts analytics and reads
//! content, the Admin console works under `/admin/api`.

use super::{analytics, content};
use ntex::web;

/// Configures tracking routes called by the public site.
///
/// Writes are fire-and-forget and answer `202 Accepted` right away.
///
/// # Routes
/// - `POST /api/analytics/visit` - Count one visit
/// - `POST /api/analytics/event` - Count one tracked event
/// - `POST /api/analytics/error` - Forward a client error report
///
/// # Shorthand Routes
/// Optional `?location_hash=` query, `#admin` drops the event.
/// - `POST /api/analytics/page_view/{page_name}`
/// - `POST /api/analytics/project_click/{project_id}`
/// - `POST /api/analytics/resume_download`
/// - `POST /api/analytics/contact_click/{method}`
pub fn analytics(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/analytics").service((
        analytics::track_visit,
        analytics::track_event,
        analytics::track_error,
        analytics::track_page_view,
        analytics::track_project_click,
        analytics::track_resume_download,
        analytics::track_contact_click,
    )));
}

/// Configures read-only content routes for the public site.
///
/// # Routes
/// - `GET /api/content/{collection}` - Documents of a collection
/// - `GET /api/content/{collection}/{doc_id}` - One document
pub fn content(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/content").service((
        content::get_public_collection,
        content::get_public_document,
    )));
}

/// Configures Admin console routes.
///
/// Every route requires the `X-Admin-Pin` header.
///
/// # Analytics
/// - `GET /admin/api/analytics` - Dashboard stats (`scope`, `days`, `top`)
/// - `GET /admin/api/analytics/stream` - Server-sent change notifications
///
/// # Content
/// - `GET /admin/api/collections` - Editable collections
/// - `GET /admin/api/content/{collection}` - Documents with admin-only fields
/// - `GET /admin/api/content/{collection}/template` - New item fields
/// - `GET /admin/api/content/{collection}/{doc_id}/fields` - Field descriptors
/// - `PUT /admin/api/content/{collection}/{doc_id}` - Merge save, `new` allocates an id
/// - `DELETE /admin/api/content/{collection}/{doc_id}` - Delete document
pub fn admin(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/admin/api").service((
        analytics::get_dashboard,
        analytics::stream_changes,
        content::get_collections,
        content::get_admin_collection,
        content::get_new_item_template,
        content::get_document_fields,
        content::put_document,
        content::delete_document,
    )));
}
