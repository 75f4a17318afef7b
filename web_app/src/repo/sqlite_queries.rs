pub const QUERY_CREATE_TABLES: &str = include_str!("../../../migrations/init.sql");

/// Takes the write lock up front so a read inside the transaction can't
/// be invalidated by another connection's commit.
pub const QUERY_BEGIN_WRITE: &str = "BEGIN IMMEDIATE";

pub const QUERY_INCREMENT_COUNTER_FIELD: &str = r#"
INSERT INTO counter_field(collection,doc_id,field,value,updated_at)
VALUES($1,$2,$3,$4,$5)
ON CONFLICT(collection,doc_id,field) DO UPDATE SET
    value = counter_field.value + excluded.value,
    updated_at = excluded.updated_at;
"#;

pub const QUERY_GET_COUNTER_DOCUMENT: &str = r#"
SELECT field,value
FROM counter_field
WHERE collection=$1 AND doc_id=$2;
"#;

pub const QUERY_LIST_CONTENT_DOCUMENTS: &str = r#"
SELECT doc_id,body,updated_at
FROM content_document
WHERE collection=$1
ORDER BY sort_order ASC, doc_id ASC;
"#;

pub const QUERY_GET_CONTENT_DOCUMENT: &str = r#"
SELECT doc_id,body,updated_at
FROM content_document
WHERE collection=$1 AND doc_id=$2;
"#;

pub const QUERY_UPSERT_CONTENT_DOCUMENT: &str = r#"
INSERT INTO content_document(collection,doc_id,body,sort_order,created_at,updated_at)
VALUES($1,$2,$3,$4,$5,$5)
ON CONFLICT(collection,doc_id) DO UPDATE SET
    body = excluded.body,
    sort_order = excluded.sort_order,
    updated_at = excluded.updated_at;
"#;

pub const QUERY_DELETE_CONTENT_DOCUMENT: &str = r#"
DELETE FROM content_document WHERE collection=$1 AND doc_id=$2;
"#;
