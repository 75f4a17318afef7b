//! # Content API Module
//!
//! Backend of the Admin console editor. Documents are schema-less JSON
//! objects grouped in collections; the editor learns how to render a
//! document by introspecting its fields with [`describe_fields`].

use chrono::Local;
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::{
    consts,
    models::content::{CollectionDef, CollectionKind, ContentDocument, FieldDescriptor, FieldKind},
    repo,
};

pub static COLLECTIONS: [CollectionDef; 10] = [
    CollectionDef {
        id: "settings",
        label: "Global Settings",
        kind: CollectionKind::Documents(&["global"]),
    },
    CollectionDef {
        id: "content",
        label: "Page Content",
        kind: CollectionKind::Documents(&["home", "skills", "experience", "projects", "contact"]),
    },
    CollectionDef {
        id: "navigation",
        label: "Navigation Menu",
        kind: CollectionKind::Ordered,
    },
    CollectionDef {
        id: "stats",
        label: "Dashboard Stats",
        kind: CollectionKind::Ordered,
    },
    CollectionDef {
        id: "skills",
        label: "Skills & Tech",
        kind: CollectionKind::Ordered,
    },
    CollectionDef {
        id: "experience",
        label: "Job History",
        kind: CollectionKind::Ordered,
    },
    CollectionDef {
        id: "projects",
        label: "Featured Projects",
        kind: CollectionKind::Ordered,
    },
    CollectionDef {
        id: "services",
        label: "Service Offerings",
        kind: CollectionKind::Ordered,
    },
    CollectionDef {
        id: "contacts",
        label: "Contact Info",
        kind: CollectionKind::Ordered,
    },
    CollectionDef {
        id: "deployment",
        label: "Deployment Hub",
        kind: CollectionKind::Ordered,
    },
];

const FIELD_LABELS: [(&str, &str); 30] = [
    ("profileImageUrl", "Profile Photo URL"),
    ("logoText", "Website Logo Text"),
    ("availabilityText", "Availability Status"),
    ("resumeUrl", "Resume File/Link"),
    ("adminPin", "Admin Master PIN"),
    ("title", "Main Title"),
    ("label", "Section Label"),
    ("description", "Full Description"),
    ("typedTexts", "Typewriter Sentences"),
    ("order", "Display Priority Order"),
    ("icon", "Icon Name/URL"),
    ("appVersion", "CMS Version Number"),
    ("buildVersion", "Build ID (e.g. 1.0.1+12)"),
    ("environment", "Environment (Prod/Staging)"),
    ("status", "Status (Live/Maintenance)"),
    ("deployedAt", "Deployment Date/Time"),
    ("notes", "Release Notes"),
    ("techStack", "Technologies Used"),
    ("highlights", "Key Success Points"),
    ("link", "Project Live URL"),
    ("github", "Source Code Link"),
    ("metrics", "Key Performance Data"),
    ("company", "Organization"),
    ("year", "Date/Duration"),
    ("achievements", "Responsibilities"),
    ("technologies", "Tech List"),
    ("tags", "Skill Tags"),
    ("value", "Contact Value/URL"),
    ("ctaTitle", "Call to Action Title"),
    ("ctaDescription", "CTA Subtext"),
];

pub fn find_collection(id: &str) -> Option<&'static CollectionDef> {
    COLLECTIONS.iter().find(|c| c.id == id)
}

/// Editor label for a field: the known label, or the key split on its
/// capitals, followed by the raw key.
pub fn field_label(key: &str) -> String {
    let label = FIELD_LABELS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| humanize_key(key));

    format!("{label} ({key})")
}

/// `ctaButtonText` becomes `Cta Button Text`.
fn humanize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, ch) in key.chars().enumerate() {
        if ch.is_uppercase() && i > 0 {
            out.push(' ');
        }
        if i == 0 {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn field_kind(key: &str, value: &Value) -> FieldKind {
    match value {
        Value::Array(_) => FieldKind::List,
        Value::Object(obj) => FieldKind::Group(obj.keys().cloned().collect()),
        _ if key.to_lowercase().contains("description") => FieldKind::LongText,
        _ => FieldKind::Text,
    }
}

/// Describes every field of a document for the editor form.
///
/// # Arguments
/// * `doc` - Stored document, or an empty one for a new id
/// * `is_new` - Whether the document is not stored yet
///
/// # Returns
/// * `Vec<FieldDescriptor>` - `id` first, then the document fields. `id` is
///   locked once the document exists.
pub fn describe_fields(doc: &ContentDocument, is_new: bool) -> Vec<FieldDescriptor> {
    let id = ("id".to_string(), Value::String(doc.id.clone()));

    std::iter::once(id)
        .chain(doc.fields.clone())
        .map(|(key, value)| FieldDescriptor {
            label: field_label(&key),
            kind: field_kind(&key, &value),
            locked: key == "id" && !is_new,
            key,
        })
        .collect()
}

/// Starting fields of a new item in `collection`, placed after `existing` items.
pub fn new_item_template(collection: &str, existing: usize) -> Map<String, Value> {
    let template = match collection {
        "projects" => json!({
            "title": "", "category": "Mobile", "description": "",
            "tech": [], "highlights": [], "icon": "📱"
        }),
        "skills" => json!({"title": "", "icon": "⚡", "description": "", "tags": []}),
        "experience" => json!({
            "title": "", "company": "", "year": "", "description": "",
            "achievements": [], "technologies": []
        }),
        "services" => json!({"title": "", "description": "", "icon": "🛠️"}),
        "contacts" => json!({"title": "", "value": "", "icon": "✉️", "link": ""}),
        "navigation" => json!({"title": "", "section": "home"}),
        "deployment" => json!({
            "title": format!("v1.0.{}", existing + 1),
            "buildVersion": "1.0.0",
            "environment": "Production",
            "status": "Success",
            "deployedAt": Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            "notes": "Initial production build for portfolio."
        }),
        _ => json!({}),
    };

    let mut fields = template.as_object().cloned().unwrap_or_default();
    fields.insert(consts::ORDER_FIELD.into(), json!(existing + 1));
    fields
}

/// Removes fields the public site must never see.
pub fn public_view(mut doc: ContentDocument) -> ContentDocument {
    doc.fields.remove(consts::ADMIN_PIN_FIELD);
    doc
}

pub async fn list_documents(
    collection: &str,
    repo: &repo::ImplSiteRepo,
) -> anyhow::Result<Vec<ContentDocument>> {
    repo.list_content(collection).await
}

pub async fn get_document(
    collection: &str,
    doc_id: &str,
    repo: &repo::ImplSiteRepo,
) -> anyhow::Result<Option<ContentDocument>> {
    repo.get_content(collection, doc_id).await
}

/// Saves the editor form with merge semantics.
///
/// # Arguments
/// * `collection` - Target collection
/// * `doc_id` - Document id; the placeholder `new` allocates a fresh one
/// * `fields` - Top level fields to set, other stored fields are kept
/// * `repo` - Repository instance for database operations
///
/// # Returns
/// * `anyhow::Result<ContentDocument>` - The document as stored
///
/// # Errors
/// Returns an error if the stored body can't be read back or the write fails.
pub async fn save_document(
    collection: &str,
    doc_id: &str,
    fields: &Map<String, Value>,
    repo: &repo::ImplSiteRepo,
) -> anyhow::Result<ContentDocument> {
    let doc_id = if doc_id == consts::NEW_DOCUMENT_ID {
        Uuid::new_v4().simple().to_string()
    } else {
        doc_id.to_string()
    };

    repo.merge_content(collection, &doc_id, fields).await
}

/// Removes a document; deleting a missing one is not an error.
pub async fn delete_document(
    collection: &str,
    doc_id: &str,
    repo: &repo::ImplSiteRepo,
) -> anyhow::Result<()> {
    repo.delete_content(collection, doc_id).await
}
