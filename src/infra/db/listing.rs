//! Dynamic list queries.
//!
//! Builds the row-listing statement for an arbitrary table from introspected
//! schema: left joins expose text columns of referenced tables under
//! `<table>_<column>` aliases, filters and ordering resolve against the main
//! table first and the exposed aliases second, and a matching `COUNT(*)`
//! statement shares the same source and filter. Identifiers only ever enter
//! the statement after passing [`Identifier::parse`]; every value is bound.

use sqlx::{QueryBuilder, Sqlite};

use crate::application::params::ListParams;
use crate::application::repos::StoreError;
use crate::config::EngineConfig;
use crate::domain::{ColumnDescriptor, Identifier, ListPage};

use super::SqliteRepositories;
use super::util::{decode_row, map_sqlx_error};

/// One left join discovered from a foreign key, together with the text
/// columns it exposes.
pub(crate) struct JoinEdge {
    pub fk_column: Identifier,
    pub table: Identifier,
    pub ref_column: Identifier,
    pub text_columns: Vec<Identifier>,
}

impl JoinEdge {
    fn alias(&self, column: &Identifier) -> String {
        format!("{}_{}", self.table, column)
    }
}

impl SqliteRepositories {
    /// Execute the filtered, ordered, paginated list query for `table`.
    ///
    /// Invalid or unknown tables return a well-formed empty page with
    /// `columns = []`; no list statement is ever attempted for them.
    pub async fn list_rows(
        &self,
        table: &str,
        params: &ListParams,
        config: &EngineConfig,
    ) -> Result<ListPage, StoreError> {
        let limit = params.effective_limit(config);
        let page = params.effective_page();

        let Ok(table) = Identifier::parse(table) else {
            return Ok(ListPage::empty(page, limit));
        };
        let columns = self.columns_of(&table).await?;
        if columns.is_empty() {
            return Ok(ListPage::empty(page, limit));
        }
        let edges = self.join_edges(&table).await?;
        let joined = joined_columns(&columns, &edges);
        let projected = projected_names(&columns, &joined);

        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*)");
        push_source(&mut count_qb, &table, &edges);
        push_filters(&mut count_qb, &table, &columns, &joined, params);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        let total = u64::try_from(total).unwrap_or(0);

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT ");
        push_projection(&mut qb, &table, &columns, &joined);
        push_source(&mut qb, &table, &edges);
        push_filters(&mut qb, &table, &columns, &joined, params);
        qb.push(" ORDER BY ");
        qb.push(order_expression(&table, &columns, &joined, params));
        qb.push(" ");
        qb.push(params.order_dir.as_sql());
        qb.push(" LIMIT ");
        qb.push_bind(i64::from(limit));
        qb.push(" OFFSET ");
        qb.push_bind(params.offset(config) as i64);

        let rows = qb
            .build()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        let items = rows
            .iter()
            .map(decode_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ListPage::new(items, total, page, limit, projected))
    }

    /// Join edges worth following for `table`: one per referenced table
    /// (first declared edge wins, so aliases stay unambiguous), and only
    /// when the referenced table exposes at least one text column.
    pub(crate) async fn join_edges(&self, table: &Identifier) -> Result<Vec<JoinEdge>, StoreError> {
        let mut edges = Vec::new();
        let mut seen: Vec<Identifier> = Vec::new();
        for fk in self.foreign_keys_of(table).await? {
            if seen.contains(&fk.referenced_table) {
                continue;
            }
            seen.push(fk.referenced_table.clone());
            let text_columns = self.text_columns_of(&fk.referenced_table).await?;
            if text_columns.is_empty() {
                continue;
            }
            edges.push(JoinEdge {
                fk_column: fk.column,
                table: fk.referenced_table,
                ref_column: fk.referenced_column,
                text_columns,
            });
        }
        Ok(edges)
    }
}

/// One joined column that survived alias derivation: its alias fits the
/// identifier grammar and collides with neither a main-table column nor an
/// earlier alias. The single source of truth for the projected joined
/// shape.
pub(crate) struct JoinedColumn {
    pub table: Identifier,
    pub column: Identifier,
    pub alias: Identifier,
}

fn joined_columns(columns: &[ColumnDescriptor], edges: &[JoinEdge]) -> Vec<JoinedColumn> {
    let mut joined: Vec<JoinedColumn> = Vec::new();
    for edge in edges {
        for column in &edge.text_columns {
            let Ok(alias) = Identifier::parse(&edge.alias(column)) else {
                continue;
            };
            if columns.iter().any(|c| c.name == alias)
                || joined.iter().any(|j| j.alias == alias)
            {
                continue;
            }
            joined.push(JoinedColumn {
                table: edge.table.clone(),
                column: column.clone(),
                alias,
            });
        }
    }
    joined
}

/// The projected shape: main-table columns first, then every exposed joined
/// alias. Independent of whether any row matches.
fn projected_names(columns: &[ColumnDescriptor], joined: &[JoinedColumn]) -> Vec<Identifier> {
    columns
        .iter()
        .map(|c| c.name.clone())
        .chain(joined.iter().map(|j| j.alias.clone()))
        .collect()
}

fn push_projection(
    qb: &mut QueryBuilder<'_, Sqlite>,
    table: &Identifier,
    columns: &[ColumnDescriptor],
    joined: &[JoinedColumn],
) {
    for (idx, column) in columns.iter().enumerate() {
        if idx > 0 {
            qb.push(", ");
        }
        qb.push(format!("\"{table}\".\"{}\"", column.name));
    }
    for j in joined {
        qb.push(format!(
            ", \"{}\".\"{}\" AS \"{}\"",
            j.table, j.column, j.alias
        ));
    }
}

fn push_source(qb: &mut QueryBuilder<'_, Sqlite>, table: &Identifier, edges: &[JoinEdge]) {
    qb.push(format!(" FROM \"{table}\""));
    for edge in edges {
        qb.push(format!(
            " LEFT JOIN \"{}\" ON \"{}\".\"{}\" = \"{}\".\"{}\"",
            edge.table, table, edge.fk_column, edge.table, edge.ref_column
        ));
    }
    qb.push(" WHERE 1=1");
}

fn push_filters(
    qb: &mut QueryBuilder<'_, Sqlite>,
    table: &Identifier,
    columns: &[ColumnDescriptor],
    joined: &[JoinedColumn],
    params: &ListParams,
) {
    for (key, value) in &params.filter {
        // Unresolvable filter keys are dropped, not errors.
        let Some(target) = resolve_column(key, table, columns, joined) else {
            continue;
        };
        qb.push(format!(" AND {target} LIKE "));
        qb.push_bind(format!("%{}%", value));
    }
}

fn order_expression(
    table: &Identifier,
    columns: &[ColumnDescriptor],
    joined: &[JoinedColumn],
    params: &ListParams,
) -> String {
    params
        .order
        .as_deref()
        .and_then(|order| resolve_column(order, table, columns, joined))
        .unwrap_or_else(|| format!("\"{table}\".\"{}\"", columns[0].name))
}

/// Two-tier column resolution: a main-table column by name, then an exposed
/// joined alias. Returns the fully qualified, quote-wrapped expression.
fn resolve_column(
    key: &str,
    table: &Identifier,
    columns: &[ColumnDescriptor],
    joined: &[JoinedColumn],
) -> Option<String> {
    if let Some(column) = columns.iter().find(|column| column.name.as_str() == key) {
        return Some(format!("\"{table}\".\"{}\"", column.name));
    }
    joined
        .iter()
        .find(|j| j.alias.as_str() == key)
        .map(|j| format!("\"{}\".\"{}\"", j.table, j.column))
}
