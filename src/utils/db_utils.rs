use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

use crate::error::{AppError, AppResult};

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    U64(u64),
    I32(i32),
    Bool(bool),
    DateTime(DateTime<Utc>),
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Column/value pairs collected from a partial update DTO.
///
/// Column names come from code, never from the request body.
#[derive(Debug, Default)]
pub struct UpdateSet {
    fields: Vec<(&'static str, SqlValue)>,
}

impl UpdateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: &'static str, value: SqlValue) -> &mut Self {
        self.fields.push((column, value));
        self
    }

    pub fn set_opt<T: Into<SqlValue>>(&mut self, column: &'static str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.fields.push((column, v.into()));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::String(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::String(v.to_string())
    }
}

impl From<u64> for SqlValue {
    fn from(v: u64) -> Self {
        SqlValue::U64(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::I32(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::DateTime(v)
    }
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
pub fn build_update_sql(
    table: &str,
    set: UpdateSet,
    id_column: &str,
    id_value: u64,
) -> AppResult<SqlUpdate> {
    if set.is_empty() {
        return Err(AppError::validation("No fields provided for update"));
    }

    let set_clause = set
        .fields
        .iter()
        .map(|(column, _)| format!("{} = ?", column))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values: Vec<SqlValue> = set.fields.into_iter().map(|(_, v)| v).collect();
    values.push(SqlValue::U64(id_value));

    Ok(SqlUpdate { sql, values })
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
            SqlValue::I32(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_set_clause_in_insertion_order() {
        let mut set = UpdateSet::new();
        set.set_opt("full_name", Some("Jane Smith"))
            .set_opt::<i32>("leave_balance", None)
            .set("is_active", SqlValue::Bool(false));

        let update = build_update_sql("users", set, "id", 7).unwrap();

        assert_eq!(
            update.sql,
            "UPDATE users SET full_name = ?, is_active = ? WHERE id = ?"
        );
        assert_eq!(
            update.values,
            vec![
                SqlValue::String("Jane Smith".into()),
                SqlValue::Bool(false),
                SqlValue::U64(7),
            ]
        );
    }

    #[test]
    fn rejects_empty_updates() {
        let err = build_update_sql("schedules", UpdateSet::new(), "id", 1).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
