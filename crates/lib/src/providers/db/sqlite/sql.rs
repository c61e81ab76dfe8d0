//! # SQLite Specific SQL Queries
//!
//! Each record lives in a single row: its id and a JSON object with every
//! other attribute.

pub fn create_documents_table(table: &str) -> String {
    format!(
        r#"CREATE TABLE IF NOT EXISTS "{table}" (
            id TEXT PRIMARY KEY,
            attributes TEXT NOT NULL
        );"#
    )
}

pub fn select_document(table: &str) -> String {
    format!(r#"SELECT attributes FROM "{table}" WHERE id = ?"#)
}

pub fn upsert_document(table: &str) -> String {
    format!(
        r#"INSERT INTO "{table}" (id, attributes) VALUES (?, ?)
           ON CONFLICT(id) DO UPDATE SET attributes = excluded.attributes"#
    )
}
