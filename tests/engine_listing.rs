//! Dynamic listing behavior: introspection, joins, filters, ordering and
//! pagination against a live schema.

mod common;

use common::seeded_repos;
use quadro::{ContentEngine, ListParams, OrderDirection, SourceKind};

fn filter(entries: &[(&str, &str)]) -> ListParams {
    let mut params = ListParams::default();
    for (key, value) in entries {
        params.filter.insert(key.to_string(), value.to_string());
    }
    params
}

#[tokio::test]
async fn settings_fit_on_one_page() {
    let engine = ContentEngine::new(seeded_repos().await);
    let page = engine
        .list(
            "settings",
            &ListParams {
                limit: Some(10),
                page: Some(1),
                ..Default::default()
            },
        )
        .await
        .expect("list settings");

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total, 2);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.page, 1);
    assert_eq!(page.limit, 10);
}

#[tokio::test]
async fn filter_matches_substring() {
    let engine = ContentEngine::new(seeded_repos().await);
    let page = engine
        .list("settings", &filter(&[("name", "setup")]))
        .await
        .expect("list settings");

    assert_eq!(page.total, 1);
    assert_eq!(page.items[0]["name"], "setup_done");
}

#[tokio::test]
async fn joined_label_columns_are_projected() {
    let engine = ContentEngine::new(seeded_repos().await);
    let page = engine
        .list("settings", &ListParams::default())
        .await
        .expect("list settings");

    let columns: Vec<&str> = page.columns.iter().map(|c| c.as_str()).collect();
    assert_eq!(
        columns,
        ["id", "name", "value", "locale_id", "locales_code", "locales_language"]
    );

    let setup = page
        .items
        .iter()
        .find(|item| item["name"] == "setup_done")
        .expect("setup_done row");
    assert_eq!(setup["locales_language"], "Portuguese");
}

#[tokio::test]
async fn order_by_joined_column() {
    let engine = ContentEngine::new(seeded_repos().await);

    let asc = engine
        .list(
            "settings",
            &ListParams {
                order: Some("locales_language".into()),
                order_dir: OrderDirection::Asc,
                ..Default::default()
            },
        )
        .await
        .expect("list ascending");
    assert_eq!(asc.items[0]["locales_language"], "English");

    let desc = engine
        .list(
            "settings",
            &ListParams {
                order: Some("locales_language".into()),
                order_dir: OrderDirection::Desc,
                ..Default::default()
            },
        )
        .await
        .expect("list descending");
    assert_eq!(desc.items[0]["locales_language"], "Portuguese");
}

#[tokio::test]
async fn filter_on_joined_column() {
    let engine = ContentEngine::new(seeded_repos().await);
    let page = engine
        .list("settings", &filter(&[("locales_language", "Portu")]))
        .await
        .expect("list settings");

    assert_eq!(page.total, 1);
    assert_eq!(page.items[0]["name"], "setup_done");
}

#[tokio::test]
async fn page_beyond_last_keeps_totals() {
    let engine = ContentEngine::new(seeded_repos().await);
    let first = engine
        .list(
            "settings",
            &ListParams {
                limit: Some(1),
                page: Some(1),
                ..Default::default()
            },
        )
        .await
        .expect("first page");
    let beyond = engine
        .list(
            "settings",
            &ListParams {
                limit: Some(1),
                page: Some(99),
                ..Default::default()
            },
        )
        .await
        .expect("page beyond last");

    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total, first.total);
    assert_eq!(beyond.total_pages, first.total_pages);
    assert_eq!(beyond.total_pages, 2);
}

#[tokio::test]
async fn limit_and_page_are_clamped() {
    let engine = ContentEngine::new(seeded_repos().await);
    let page = engine
        .list(
            "settings",
            &ListParams {
                limit: Some(0),
                page: Some(0),
                ..Default::default()
            },
        )
        .await
        .expect("list with out-of-range paging");

    assert_eq!(page.limit, 1);
    assert_eq!(page.page, 1);
    assert_eq!(page.items.len(), 1);

    let wide = engine
        .list(
            "settings",
            &ListParams {
                limit: Some(10_000),
                ..Default::default()
            },
        )
        .await
        .expect("list with oversized limit");
    assert_eq!(wide.limit, 100);
}

#[tokio::test]
async fn unknown_filter_and_order_keys_are_dropped() {
    let engine = ContentEngine::new(seeded_repos().await);
    let mut params = filter(&[("no_such_column", "x")]);
    params.order = Some("also_missing".into());

    let page = engine.list("settings", &params).await.expect("list settings");
    assert_eq!(page.total, 2);
    // Default order falls back to the first projected column.
    assert_eq!(page.items[0]["id"], 1);
}

#[tokio::test]
async fn malformed_table_short_circuits_before_the_store() {
    let repos = seeded_repos().await;
    repos.pool().close().await;
    let engine = ContentEngine::new(repos);

    // A closed pool fails any statement, so success here proves none ran.
    let page = engine
        .list("settings; DROP TABLE settings", &ListParams::default())
        .await
        .expect("malformed token degrades to empty");
    assert!(page.items.is_empty());
    assert_eq!(page.total, 0);
    assert!(page.columns.is_empty());
}

#[tokio::test]
async fn unknown_table_yields_empty_shape() {
    let engine = ContentEngine::new(seeded_repos().await);
    let page = engine
        .list("widgets", &ListParams::default())
        .await
        .expect("unknown table degrades to empty");

    assert!(page.items.is_empty());
    assert_eq!(page.total, 0);
    assert_eq!(page.total_pages, 1);
    assert!(page.columns.is_empty());
}

#[tokio::test]
async fn table_without_foreign_keys_lists_plainly() {
    let engine = ContentEngine::new(seeded_repos().await);
    let page = engine
        .list("locales", &ListParams::default())
        .await
        .expect("list locales");

    let columns: Vec<&str> = page.columns.iter().map(|c| c.as_str()).collect();
    assert_eq!(columns, ["id", "code", "language"]);
    assert_eq!(page.total, 2);
}

#[tokio::test]
async fn introspection_reflects_the_fixture() {
    let repos = seeded_repos().await;

    let tables = repos.list_tables().await.expect("list tables");
    let names: Vec<&str> = tables.iter().map(|t| t.as_str()).collect();
    for expected in ["settings", "locales", "contents", "content_types"] {
        assert!(names.contains(&expected), "missing {expected}");
    }

    let text = repos
        .list_text_columns("locales")
        .await
        .expect("text columns");
    let text: Vec<&str> = text.iter().map(|c| c.as_str()).collect();
    assert_eq!(text, ["code", "language"]);

    let fks = repos
        .list_foreign_keys("settings")
        .await
        .expect("foreign keys");
    assert_eq!(fks.len(), 1);
    assert_eq!(fks[0].column.as_str(), "locale_id");
    assert_eq!(fks[0].referenced_table.as_str(), "locales");
    assert_eq!(fks[0].referenced_column.as_str(), "id");

    let descriptor = repos
        .describe_table("settings")
        .await
        .expect("describe settings")
        .expect("settings exists");
    assert_eq!(descriptor.columns.len(), 4);
    assert!(descriptor.columns[0].primary_key);

    assert!(repos.describe_table("widgets").await.expect("unknown").is_none());
    assert!(
        repos
            .list_columns("not a name")
            .await
            .expect("invalid token")
            .is_empty()
    );
}

#[tokio::test]
async fn internal_catalog_objects_never_route_as_tables() {
    let repos = seeded_repos().await;
    let engine = ContentEngine::new(repos.clone());

    // An AUTOINCREMENT table makes sqlite_sequence appear in the catalog.
    sqlx::raw_sql(
        "CREATE TABLE counters (id INTEGER PRIMARY KEY AUTOINCREMENT, label TEXT);
         INSERT INTO counters (label) VALUES ('one');",
    )
    .execute(repos.pool())
    .await
    .expect("create autoincrement table");

    let tables = repos.list_tables().await.expect("list tables");
    assert!(tables.iter().any(|t| t.as_str() == "counters"));
    assert!(!tables.iter().any(|t| t.as_str() == "sqlite_sequence"));

    assert_eq!(
        engine
            .resolve_kind("sqlite_sequence")
            .await
            .expect("resolve"),
        SourceKind::Content
    );

    let lookup = engine
        .get_record("sqlite_sequence", "1")
        .await
        .expect("lookup");
    assert_eq!(lookup.kind, SourceKind::Content);
    assert!(lookup.record.is_none());
}

#[tokio::test]
async fn overlong_join_aliases_are_dropped_consistently() {
    let repos = seeded_repos().await;
    let long_table = format!("ref_{}", "x".repeat(58));

    // `<table>_label` exceeds the identifier length cap; `<table>_c` fits.
    let ddl = format!(
        "CREATE TABLE \"{t}\" (id INTEGER PRIMARY KEY, label TEXT, c TEXT);
         INSERT INTO \"{t}\" (id, label, c) VALUES (1, 'Long', 'L');
         CREATE TABLE gadgets (id INTEGER PRIMARY KEY, ref_id INTEGER REFERENCES \"{t}\"(id));
         INSERT INTO gadgets (id, ref_id) VALUES (1, 1);",
        t = long_table
    );
    sqlx::raw_sql(&ddl)
        .execute(repos.pool())
        .await
        .expect("seed long-name schema");

    let engine = ContentEngine::new(repos);
    let page = engine
        .list("gadgets", &ListParams::default())
        .await
        .expect("list gadgets");

    let kept = format!("{long_table}_c");
    let columns: Vec<&str> = page.columns.iter().map(|c| c.as_str()).collect();
    assert_eq!(columns, ["id", "ref_id", kept.as_str()]);

    let item = &page.items[0];
    assert_eq!(item.len(), page.columns.len());
    assert_eq!(item[kept.as_str()], "L");
}

#[tokio::test]
async fn main_columns_shadow_colliding_join_aliases() {
    let repos = seeded_repos().await;
    sqlx::raw_sql(
        "CREATE TABLE banners (
             id INTEGER PRIMARY KEY,
             locales_code TEXT,
             locale_id INTEGER REFERENCES locales(id)
         );
         INSERT INTO banners (id, locales_code, locale_id) VALUES (1, 'own-value', 1);",
    )
    .execute(repos.pool())
    .await
    .expect("seed banners");

    let engine = ContentEngine::new(repos);
    let page = engine
        .list("banners", &ListParams::default())
        .await
        .expect("list banners");

    let columns: Vec<&str> = page.columns.iter().map(|c| c.as_str()).collect();
    assert_eq!(
        columns,
        ["id", "locales_code", "locale_id", "locales_language"]
    );

    let item = &page.items[0];
    assert_eq!(item.len(), page.columns.len());
    // The main-table column wins; the joined `locales.code` stays hidden.
    assert_eq!(item["locales_code"], "own-value");
    assert_eq!(item["locales_language"], "English");
}

#[tokio::test]
async fn resolve_kind_follows_live_schema() {
    let repos = seeded_repos().await;
    let engine = ContentEngine::new(repos.clone());

    assert_eq!(
        engine.resolve_kind("settings").await.expect("resolve"),
        SourceKind::Table
    );
    assert_eq!(
        engine.resolve_kind("widgets").await.expect("resolve"),
        SourceKind::Content
    );

    sqlx::raw_sql("CREATE TABLE widgets (id INTEGER PRIMARY KEY, label TEXT)")
        .execute(repos.pool())
        .await
        .expect("create widgets");

    assert_eq!(
        engine.resolve_kind("widgets").await.expect("resolve"),
        SourceKind::Table
    );
}
