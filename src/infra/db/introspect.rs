//! Schema introspection.
//!
//! All knowledge of tables, columns and foreign keys is discovered fresh at
//! call time from the store's own catalog; nothing here is persisted or
//! memoized. The string-accepting methods are the public contract: an
//! invalid or unknown name yields an empty answer, never an error and never
//! a statement built from the raw token.

use sqlx::Row as SqlxRow;

use crate::application::repos::StoreError;
use crate::domain::{
    ColumnCategory, ColumnDescriptor, ForeignKeyDescriptor, Identifier, TableDescriptor,
};

use super::SqliteRepositories;
use super::util::map_sqlx_error;

impl SqliteRepositories {
    /// User-defined table names, excluding the store's internal catalog
    /// objects, sorted by name.
    pub async fn list_tables(&self) -> Result<Vec<Identifier>, StoreError> {
        let rows = sqlx::query(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
             ORDER BY name",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let tables = rows
            .iter()
            .filter_map(|row| row.try_get::<String, _>("name").ok())
            .filter_map(|name| Identifier::parse(&name).ok())
            .collect();
        Ok(tables)
    }

    /// Whether `table` names a user-defined table. Internal catalog objects
    /// such as `sqlite_sequence` are invisible here, matching
    /// [`list_tables`](Self::list_tables).
    pub async fn table_exists(&self, table: &Identifier) -> Result<bool, StoreError> {
        let row = sqlx::query(
            "SELECT 1 FROM sqlite_master \
             WHERE type = 'table' AND name = ?1 AND name NOT LIKE 'sqlite_%'",
        )
        .bind(table.as_str())
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.is_some())
    }

    /// Columns of `table`; empty if the token fails sanitization or the
    /// table does not exist.
    pub async fn list_columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>, StoreError> {
        let Ok(table) = Identifier::parse(table) else {
            return Ok(Vec::new());
        };
        self.columns_of(&table).await
    }

    pub(crate) async fn columns_of(
        &self,
        table: &Identifier,
    ) -> Result<Vec<ColumnDescriptor>, StoreError> {
        let rows = sqlx::query("SELECT name, type, pk FROM pragma_table_info(?1)")
            .bind(table.as_str())
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let name = row.try_get::<String, _>("name").map_err(map_sqlx_error)?;
            let declared = row.try_get::<String, _>("type").map_err(map_sqlx_error)?;
            let pk = row.try_get::<i64, _>("pk").map_err(map_sqlx_error)?;
            // Columns the grammar cannot express are invisible to the engine.
            let Ok(name) = Identifier::parse(&name) else {
                continue;
            };
            columns.push(ColumnDescriptor {
                name,
                category: ColumnCategory::from_declared_type(&declared),
                primary_key: pk > 0,
            });
        }
        Ok(columns)
    }

    /// Full descriptor for `table`, or `None` for invalid/unknown names.
    pub async fn describe_table(&self, table: &str) -> Result<Option<TableDescriptor>, StoreError> {
        let Ok(name) = Identifier::parse(table) else {
            return Ok(None);
        };
        let columns = self.columns_of(&name).await?;
        if columns.is_empty() {
            return Ok(None);
        }
        Ok(Some(TableDescriptor { name, columns }))
    }

    /// Declared single-column foreign keys of `table`; empty if none, or if
    /// the token is invalid. Composite keys are not joinable label edges
    /// and are skipped.
    pub async fn list_foreign_keys(
        &self,
        table: &str,
    ) -> Result<Vec<ForeignKeyDescriptor>, StoreError> {
        let Ok(table) = Identifier::parse(table) else {
            return Ok(Vec::new());
        };
        self.foreign_keys_of(&table).await
    }

    pub(crate) async fn foreign_keys_of(
        &self,
        table: &Identifier,
    ) -> Result<Vec<ForeignKeyDescriptor>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, seq, \"table\" AS ref_table, \"from\" AS fk_column, \"to\" AS ref_column \
             FROM pragma_foreign_key_list(?1) \
             ORDER BY id, seq",
        )
        .bind(table.as_str())
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let mut edges: Vec<(i64, ForeignKeyDescriptor)> = Vec::new();
        let mut composite: Vec<i64> = Vec::new();
        for row in &rows {
            let id = row.try_get::<i64, _>("id").map_err(map_sqlx_error)?;
            let seq = row.try_get::<i64, _>("seq").map_err(map_sqlx_error)?;
            if seq > 0 {
                composite.push(id);
                continue;
            }
            let ref_table = row
                .try_get::<String, _>("ref_table")
                .map_err(map_sqlx_error)?;
            let fk_column = row
                .try_get::<String, _>("fk_column")
                .map_err(map_sqlx_error)?;
            let ref_column = row
                .try_get::<Option<String>, _>("ref_column")
                .map_err(map_sqlx_error)?;

            let (Ok(referenced_table), Ok(column)) =
                (Identifier::parse(&ref_table), Identifier::parse(&fk_column))
            else {
                continue;
            };
            // An omitted referenced column means the referenced table's
            // primary key.
            let referenced_column = match ref_column {
                Some(name) => match Identifier::parse(&name) {
                    Ok(ident) => ident,
                    Err(_) => continue,
                },
                None => match self.primary_key_of(&referenced_table).await? {
                    Some(pk) => pk.name,
                    None => continue,
                },
            };
            edges.push((
                id,
                ForeignKeyDescriptor {
                    column,
                    referenced_table,
                    referenced_column,
                },
            ));
        }

        Ok(edges
            .into_iter()
            .filter(|(id, _)| !composite.contains(id))
            .map(|(_, edge)| edge)
            .collect())
    }

    /// Text-family columns of `table`, the ones eligible as joined labels.
    pub async fn list_text_columns(&self, table: &str) -> Result<Vec<Identifier>, StoreError> {
        let Ok(table) = Identifier::parse(table) else {
            return Ok(Vec::new());
        };
        self.text_columns_of(&table).await
    }

    pub(crate) async fn text_columns_of(
        &self,
        table: &Identifier,
    ) -> Result<Vec<Identifier>, StoreError> {
        let columns = self.columns_of(table).await?;
        Ok(columns
            .into_iter()
            .filter(|column| column.category == ColumnCategory::Text)
            .map(|column| column.name)
            .collect())
    }

    /// The table's primary-key column, falling back to a column literally
    /// named `id` for tables declared without one.
    pub(crate) async fn primary_key_of(
        &self,
        table: &Identifier,
    ) -> Result<Option<ColumnDescriptor>, StoreError> {
        let columns = self.columns_of(table).await?;
        let pk = columns
            .iter()
            .find(|column| column.primary_key)
            .or_else(|| columns.iter().find(|column| column.name.as_str() == "id"))
            .cloned();
        Ok(pk)
    }
}
