use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema-less document edited from the Admin console.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ContentDocument {
    pub id: String,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
    #[serde(skip)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(tag = "type", content = "docs", rename_all = "snake_case")]
pub enum CollectionKind {
    /// A fixed set of named documents.
    Documents(&'static [&'static str]),
    /// Open list of items sorted by their `order` field.
    Ordered,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct CollectionDef {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: CollectionKind,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", content = "keys", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    LongText,
    List,
    Group(Vec<String>),
}

/// How the Admin console should render one document field.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldDescriptor {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
    pub locked: bool,
}
