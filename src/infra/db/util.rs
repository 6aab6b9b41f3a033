use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row as SqlxRow, TypeInfo, ValueRef};

use crate::application::repos::StoreError;
use crate::domain::Row;

pub fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut => StoreError::Timeout,
        sqlx::Error::Database(db)
            if db.message().contains("database is locked")
                || db.message().contains("database table is locked") =>
        {
            StoreError::Timeout
        }
        other => StoreError::from_persistence(other),
    }
}

/// Decode a dynamically shaped result row into JSON scalars, keyed by the
/// projected column names in projection order.
pub(crate) fn decode_row(row: &SqliteRow) -> Result<Row, StoreError> {
    let mut decoded = Row::new();
    for (idx, column) in row.columns().iter().enumerate() {
        decoded.insert(column.name().to_string(), decode_value(row, idx)?);
    }
    Ok(decoded)
}

fn decode_value(row: &SqliteRow, idx: usize) -> Result<Value, StoreError> {
    let raw = row.try_get_raw(idx).map_err(map_sqlx_error)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let type_name = raw.type_info().name().to_string();
    drop(raw);

    let value = match type_name.as_str() {
        "INTEGER" => Value::from(row.try_get::<i64, _>(idx).map_err(map_sqlx_error)?),
        "REAL" => {
            let real = row.try_get::<f64, _>(idx).map_err(map_sqlx_error)?;
            serde_json::Number::from_f64(real)
                .map(Value::Number)
                .unwrap_or(Value::Null)
        }
        "BLOB" => {
            let bytes = row.try_get::<Vec<u8>, _>(idx).map_err(map_sqlx_error)?;
            Value::String(hex::encode(bytes))
        }
        _ => Value::String(row.try_get::<String, _>(idx).map_err(map_sqlx_error)?),
    };
    Ok(value)
}
