use ntex::web;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::{
    api::content,
    front::{
        AppState,
        errors::{ServerError, UserError},
        middleware::admin_access::AdminAccess,
    },
    models::content::{CollectionDef, ContentDocument},
};

#[derive(Debug, Deserialize)]
pub struct CollectionPath {
    pub collection: String,
}

#[derive(Debug, Deserialize)]
pub struct DocumentPath {
    pub collection: String,
    pub doc_id: String,
}

fn known_collection(collection: &str) -> Result<&'static CollectionDef, UserError> {
    content::find_collection(collection).ok_or(UserError::UrlNotFound)
}

fn internal(e: anyhow::Error) -> ServerError {
    ServerError::InternalServerError(e.to_string())
}

#[web::get("/{collection}")]
pub async fn get_public_collection(
    app_state: web::types::State<AppState>,
    path: web::types::Path<CollectionPath>,
) -> Result<impl web::Responder, web::Error> {
    known_collection(&path.collection)?;

    let docs: Vec<_> = content::list_documents(&path.collection, &app_state.repo)
        .await
        .map_err(internal)?
        .into_iter()
        .map(content::public_view)
        .collect();

    Ok(web::HttpResponse::Ok().json(&docs))
}

#[web::get("/{collection}/{doc_id}")]
pub async fn get_public_document(
    app_state: web::types::State<AppState>,
    path: web::types::Path<DocumentPath>,
) -> Result<impl web::Responder, web::Error> {
    known_collection(&path.collection)?;

    let doc = content::get_document(&path.collection, &path.doc_id, &app_state.repo)
        .await
        .map_err(internal)?
        .ok_or(UserError::UrlNotFound)?;

    Ok(web::HttpResponse::Ok().json(&content::public_view(doc)))
}

/// Collections the Admin console can edit.
#[web::get("/collections")]
pub async fn get_collections(_: AdminAccess) -> impl web::Responder {
    web::HttpResponse::Ok().json(&content::COLLECTIONS)
}

#[web::get("/content/{collection}")]
pub async fn get_admin_collection(
    _: AdminAccess,
    app_state: web::types::State<AppState>,
    path: web::types::Path<CollectionPath>,
) -> Result<impl web::Responder, web::Error> {
    known_collection(&path.collection)?;

    let docs = content::list_documents(&path.collection, &app_state.repo)
        .await
        .map_err(internal)?;

    Ok(web::HttpResponse::Ok().json(&docs))
}

/// Prefilled fields of a new item, ordered after the existing ones.
#[web::get("/content/{collection}/template")]
pub async fn get_new_item_template(
    _: AdminAccess,
    app_state: web::types::State<AppState>,
    path: web::types::Path<CollectionPath>,
) -> Result<impl web::Responder, web::Error> {
    known_collection(&path.collection)?;

    let existing = content::list_documents(&path.collection, &app_state.repo)
        .await
        .map_err(internal)?
        .len();

    Ok(web::HttpResponse::Ok().json(&content::new_item_template(&path.collection, existing)))
}

#[web::get("/content/{collection}/{doc_id}/fields")]
pub async fn get_document_fields(
    _: AdminAccess,
    app_state: web::types::State<AppState>,
    path: web::types::Path<DocumentPath>,
) -> Result<impl web::Responder, web::Error> {
    known_collection(&path.collection)?;

    let doc = content::get_document(&path.collection, &path.doc_id, &app_state.repo)
        .await
        .map_err(internal)?;

    let (doc, is_new) = match doc {
        Some(doc) => (doc, false),
        None => (
            ContentDocument {
                id: path.doc_id.clone(),
                ..Default::default()
            },
            true,
        ),
    };

    Ok(web::HttpResponse::Ok().json(&json!({
        "id": doc.id,
        "is_new": is_new,
        "fields": content::describe_fields(&doc, is_new),
    })))
}

#[web::put("/content/{collection}/{doc_id}")]
pub async fn put_document(
    _: AdminAccess,
    app_state: web::types::State<AppState>,
    path: web::types::Path<DocumentPath>,
    body: web::types::Json<Map<String, Value>>,
) -> Result<impl web::Responder, web::Error> {
    known_collection(&path.collection)?;

    let saved = content::save_document(&path.collection, &path.doc_id, &body, &app_state.repo)
        .await
        .map_err(internal)?;

    log::info!("content saved: {}/{}", path.collection, saved.id);
    Ok(web::HttpResponse::Ok().json(&saved))
}

#[web::delete("/content/{collection}/{doc_id}")]
pub async fn delete_document(
    _: AdminAccess,
    app_state: web::types::State<AppState>,
    path: web::types::Path<DocumentPath>,
) -> Result<impl web::Responder, web::Error> {
    known_collection(&path.collection)?;

    content::delete_document(&path.collection, &path.doc_id, &app_state.repo)
        .await
        .map_err(internal)?;

    log::info!("content deleted: {}/{}", path.collection, path.doc_id);
    Ok(web::HttpResponse::NoContent().finish())
}
