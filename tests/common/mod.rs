//! Shared fixture for integration tests: an in-memory SQLite database with
//! system tables, a foreign-key edge to a label table, and the polymorphic
//! content layout.

use quadro::SqliteRepositories;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

pub const FIXTURE_SQL: &str = r#"
CREATE TABLE locales (
    id INTEGER PRIMARY KEY,
    code TEXT NOT NULL,
    language TEXT NOT NULL
);
CREATE TABLE settings (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    value TEXT,
    locale_id INTEGER REFERENCES locales(id)
);
CREATE TABLE flags (
    name TEXT PRIMARY KEY,
    enabled INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE content_types (
    id INTEGER PRIMARY KEY,
    slug TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL
);
CREATE TABLE contents (
    id INTEGER PRIMARY KEY,
    type_id INTEGER NOT NULL REFERENCES content_types(id),
    title TEXT NOT NULL,
    body TEXT,
    published INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE categories (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);
CREATE TABLE content_categories (
    content_id INTEGER NOT NULL REFERENCES contents(id),
    category_id INTEGER NOT NULL REFERENCES categories(id)
);
CREATE TABLE content_meta (
    content_id INTEGER NOT NULL REFERENCES contents(id),
    key TEXT NOT NULL,
    value TEXT
);

INSERT INTO locales (id, code, language) VALUES
    (1, 'en', 'English'),
    (2, 'pt', 'Portuguese');
INSERT INTO settings (id, name, value, locale_id) VALUES
    (1, 'setup_done', 'yes', 2),
    (2, 'site_title', 'Quadro', 1);
INSERT INTO flags (name, enabled) VALUES
    ('beta', 1),
    ('maintenance', 0);
INSERT INTO content_types (id, slug, name) VALUES
    (1, 'article', 'Article'),
    (2, 'page', 'Page');
INSERT INTO contents (id, type_id, title, body, published) VALUES
    (1, 1, 'Borrowed light', 'First article body', 1),
    (2, 1, 'Quiet interfaces', 'Second article body', 0),
    (3, 2, 'About', 'About page body', 1);
INSERT INTO categories (id, name) VALUES
    (1, 'News'),
    (2, 'Tech');
INSERT INTO content_categories (content_id, category_id) VALUES
    (1, 1),
    (1, 2),
    (2, 1);
INSERT INTO content_meta (content_id, key, value) VALUES
    (1, 'subtitle', 'A study in borrowed light'),
    (1, 'reading_minutes', '7'),
    (2, 'reading_minutes', 'long');
"#;

pub async fn memory_pool() -> SqlitePool {
    // A single long-lived connection keeps the in-memory database alive for
    // the whole test.
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite pool")
}

pub async fn seeded_repos() -> SqliteRepositories {
    let pool = memory_pool().await;
    sqlx::raw_sql(FIXTURE_SQL)
        .execute(&pool)
        .await
        .expect("seed fixture schema");
    SqliteRepositories::new(pool)
}
