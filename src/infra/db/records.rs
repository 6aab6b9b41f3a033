//! Single-record lookups and the polymorphic content partition.

use serde_json::Value;
use sqlx::{QueryBuilder, Sqlite};

use crate::application::params::ListParams;
use crate::application::repos::StoreError;
use crate::config::{ContentSchema, EngineConfig};
use crate::domain::{ColumnCategory, ColumnDescriptor, Identifier, ListPage, Row};

use super::SqliteRepositories;
use super::util::{decode_row, map_sqlx_error};
use sqlx::Row as SqlxRow;

impl SqliteRepositories {
    /// Fetch one row of `table` by its primary key.
    ///
    /// Numeric key columns require `id` to parse as an integer; text keys
    /// match the raw string. An unparseable id, a table without a usable
    /// key, or no matching row all yield `None`.
    pub async fn find_row_by_pk(
        &self,
        table: &Identifier,
        id: &str,
    ) -> Result<Option<Row>, StoreError> {
        let columns = self.columns_of(table).await?;
        if columns.is_empty() {
            return Ok(None);
        }
        let Some(pk) = pick_primary_key(&columns) else {
            return Ok(None);
        };

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT ");
        push_projection(&mut qb, table, &columns);
        qb.push(format!(" FROM \"{table}\" WHERE \"{table}\".\"{}\" = ", pk.name));
        match pk.category {
            ColumnCategory::Numeric => {
                let Ok(id) = id.parse::<i64>() else {
                    return Ok(None);
                };
                qb.push_bind(id);
            }
            _ => {
                qb.push_bind(id.to_string());
            }
        }

        let row = qb
            .build()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        row.as_ref().map(decode_row).transpose()
    }

    /// Resolve the discriminator row whose slug equals `slug`, returning its
    /// key. `None` when the discriminator table or the row is absent.
    pub async fn find_content_type_id(
        &self,
        schema: &ContentSchema,
        slug: &str,
    ) -> Result<Option<i64>, StoreError> {
        let Some(pk) = self.primary_key_of(&schema.type_table).await? else {
            return Ok(None);
        };
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT \"{}\" FROM \"{}\" WHERE \"{}\" = ",
            pk.name, schema.type_table, schema.type_slug_column
        ));
        qb.push_bind(slug.to_string());

        let id: Option<i64> = qb
            .build_query_scalar()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(id)
    }

    /// Fetch one polymorphic content row. Both conditions are mandatory:
    /// the id and the discriminator foreign key must match, so a record of
    /// one content type is never surfaced under another type's token.
    pub async fn find_content_row(
        &self,
        schema: &ContentSchema,
        id: i64,
        type_id: i64,
    ) -> Result<Option<Row>, StoreError> {
        let columns = self.columns_of(&schema.table).await?;
        if columns.is_empty() {
            return Ok(None);
        }
        let Some(pk) = pick_primary_key(&columns) else {
            return Ok(None);
        };

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT ");
        push_projection(&mut qb, &schema.table, &columns);
        qb.push(format!(
            " FROM \"{}\" WHERE \"{}\".\"{}\" = ",
            schema.table, schema.table, pk.name
        ));
        qb.push_bind(id);
        qb.push(format!(" AND \"{}\".\"{}\" = ", schema.table, schema.type_fk));
        qb.push_bind(type_id);

        let row = qb
            .build()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        row.as_ref().map(decode_row).transpose()
    }

    /// Load the stored meta blob of one content row as key-value pairs.
    /// Values that parse as JSON keep their parsed type; anything else is
    /// kept as a string. Missing meta table yields an empty blob.
    pub async fn load_meta_values(
        &self,
        schema: &ContentSchema,
        content_id: i64,
    ) -> Result<Row, StoreError> {
        let columns = self.columns_of(&schema.meta_table).await?;
        if columns.is_empty() {
            return Ok(Row::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT \"{}\", \"{}\" FROM \"{}\" WHERE \"{}\" = ",
            schema.meta_key_column, schema.meta_value_column, schema.meta_table,
            schema.meta_content_column
        ));
        qb.push_bind(content_id);

        let rows = qb
            .build()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let mut blob = Row::new();
        for row in &rows {
            let key = row.try_get::<String, _>(0).map_err(map_sqlx_error)?;
            let raw = row
                .try_get::<Option<String>, _>(1)
                .map_err(map_sqlx_error)?;
            let value = match raw {
                Some(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
                None => Value::Null,
            };
            blob.insert(key, value);
        }
        Ok(blob)
    }

    /// List one content partition under the shared filter/order/paginate
    /// contract, aggregating category labels per row when the category
    /// layout is present.
    pub async fn list_content(
        &self,
        schema: &ContentSchema,
        type_slug: &str,
        params: &ListParams,
        config: &EngineConfig,
    ) -> Result<ListPage, StoreError> {
        let limit = params.effective_limit(config);
        let page = params.effective_page();

        let columns = self.columns_of(&schema.table).await?;
        if columns.is_empty() {
            return Ok(ListPage::empty(page, limit));
        }
        let Some(pk) = pick_primary_key(&columns) else {
            return Ok(ListPage::empty(page, limit));
        };

        let category_pk = match self.columns_of(&schema.category_link_table).await? {
            link if link.is_empty() => None,
            _ => self.primary_key_of(&schema.category_table).await?,
        };

        let mut projected: Vec<Identifier> = columns.iter().map(|c| c.name.clone()).collect();
        if category_pk.is_some() {
            projected.push(schema.category_table.clone());
        }

        let Some(type_id) = self.find_content_type_id(schema, type_slug).await? else {
            return Ok(ListPage::new(Vec::new(), 0, page, limit, projected));
        };

        let mut count_qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT COUNT(*) FROM \"{}\" WHERE \"{}\".\"{}\" = ",
            schema.table, schema.table, schema.type_fk
        ));
        count_qb.push_bind(type_id);
        push_content_filters(&mut count_qb, &schema.table, &columns, params);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        let total = u64::try_from(total).unwrap_or(0);

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT ");
        push_projection(&mut qb, &schema.table, &columns);
        if let Some(category_pk) = &category_pk {
            qb.push(format!(
                ", GROUP_CONCAT(\"{cat}\".\"{label}\", ', ') AS \"{cat}\"",
                cat = schema.category_table,
                label = schema.category_label_column
            ));
            qb.push(format!(" FROM \"{}\"", schema.table));
            qb.push(format!(
                " LEFT JOIN \"{link}\" ON \"{link}\".\"{link_content}\" = \"{table}\".\"{pk}\"",
                link = schema.category_link_table,
                link_content = schema.link_content_column,
                table = schema.table,
                pk = pk.name
            ));
            qb.push(format!(
                " LEFT JOIN \"{cat}\" ON \"{cat}\".\"{cat_pk}\" = \"{link}\".\"{link_category}\"",
                cat = schema.category_table,
                cat_pk = category_pk.name,
                link = schema.category_link_table,
                link_category = schema.link_category_column
            ));
        } else {
            qb.push(format!(" FROM \"{}\"", schema.table));
        }
        qb.push(format!(" WHERE \"{}\".\"{}\" = ", schema.table, schema.type_fk));
        qb.push_bind(type_id);
        push_content_filters(&mut qb, &schema.table, &columns, params);
        if category_pk.is_some() {
            qb.push(format!(" GROUP BY \"{}\".\"{}\"", schema.table, pk.name));
        }
        qb.push(" ORDER BY ");
        let order = params
            .order
            .as_deref()
            .and_then(|order| {
                columns
                    .iter()
                    .find(|column| column.name.as_str() == order)
                    .map(|column| format!("\"{}\".\"{}\"", schema.table, column.name))
            })
            .unwrap_or_else(|| format!("\"{}\".\"{}\"", schema.table, columns[0].name));
        qb.push(order);
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
}

fn pick_primary_key(columns: &[ColumnDescriptor]) -> Option<&ColumnDescriptor> {
    columns
        .iter()
        .find(|column| column.primary_key)
        .or_else(|| columns.iter().find(|column| column.name.as_str() == "id"))
}

fn push_projection(
    qb: &mut QueryBuilder<'_, Sqlite>,
    table: &Identifier,
    columns: &[ColumnDescriptor],
) {
    for (idx, column) in columns.iter().enumerate() {
        if idx > 0 {
            qb.push(", ");
        }
        qb.push(format!("\"{table}\".\"{}\"", column.name));
    }
}

fn push_content_filters(
    qb: &mut QueryBuilder<'_, Sqlite>,
    table: &Identifier,
    columns: &[ColumnDescriptor],
    params: &ListParams,
) {
    for (key, value) in &params.filter {
        let Some(column) = columns.iter().find(|column| column.name.as_str() == key) else {
            continue;
        };
        qb.push(format!(" AND \"{table}\".\"{}\" LIKE ", column.name));
        qb.push_bind(format!("%{}%", value));
    }
}
