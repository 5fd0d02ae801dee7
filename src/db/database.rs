//! Prepared-statement execution with named placeholders.

use std::collections::HashMap;
use std::time::Duration;

use sqlx::sqlite::{SqliteArguments, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Arguments, FromRow};
use thiserror::Error;

use crate::config::{DatabaseConfig, TimeoutConfig};

const SCHEMA: &str = include_str!("schema.sql");

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database connection failed: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("query failed to execute: {0}")]
    Query(#[from] sqlx::Error),
    #[error("no value bound for placeholder :{0}")]
    MissingParameter(String),
    #[error("cannot bind :{name}: {message}")]
    Bind { name: String, message: String },
}

/// A value bound to a named placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum DbValue {
    Null,
    Int(i64),
    Text(String),
}

impl From<i64> for DbValue {
    fn from(value: i64) -> Self {
        DbValue::Int(value)
    }
}

impl From<&str> for DbValue {
    fn from(value: &str) -> Self {
        DbValue::Text(value.to_string())
    }
}

impl From<String> for DbValue {
    fn from(value: String) -> Self {
        DbValue::Text(value)
    }
}

impl<T: Into<DbValue>> From<Option<T>> for DbValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(DbValue::Null, Into::into)
    }
}

/// Placeholder name → bound value.
pub type NamedParams = HashMap<String, DbValue>;

/// Build [`NamedParams`] from `(name, value)` pairs.
pub fn named<I, K, V>(pairs: I) -> NamedParams
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<DbValue>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

/// Result of a statement that returns no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Executed {
    pub rows_affected: u64,
    pub last_insert_id: i64,
}

/// Rewrite `:name` placeholders to positional `?`, returning the names in
/// binding order. Quoted text and `::` are left alone.
pub fn compile_named(sql: &str) -> (String, Vec<String>) {
    let mut out = String::with_capacity(sql.len());
    let mut names = Vec::new();
    let mut chars = sql.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' => {
                quote = Some(c);
                out.push(c);
            }
            ':' if chars.peek() == Some(&':') => {
                out.push(c);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            ':' if chars.peek().is_some_and(|n| n.is_ascii_alphabetic() || *n == '_') => {
                let mut name = String::new();
                while let Some(&n) = chars.peek() {
                    if n.is_ascii_alphanumeric() || n == '_' {
                        name.push(n);
                        chars.next();
                    } else {
                        break;
                    }
                }
                names.push(name);
                out.push('?');
            }
            _ => out.push(c),
        }
    }

    (out, names)
}

fn bind<'q>(names: &[String], params: &NamedParams) -> Result<SqliteArguments<'q>, DbError> {
    let mut args = SqliteArguments::default();
    for name in names {
        let added = match params.get(name) {
            Some(DbValue::Null) => args.add(Option::<String>::None),
            Some(DbValue::Int(value)) => args.add(*value),
            Some(DbValue::Text(value)) => args.add(value.clone()),
            None => return Err(DbError::MissingParameter(name.clone())),
        };
        added.map_err(|e| DbError::Bind {
            name: name.clone(),
            message: e.to_string(),
        })?;
    }
    Ok(args)
}

/// Thin wrapper over a SQLite pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the pool described by `config`.
    pub async fn connect(config: &DatabaseConfig, timeouts: &TimeoutConfig) -> Result<Self, DbError> {
        let mut options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(timeouts.database_acquire_secs));

        // Every connection to `:memory:` is its own database; keep the one we have.
        if config.url.contains(":memory:") {
            options = options.idle_timeout(None).max_lifetime(None);
        }

        let pool = options.connect(&config.url).await.map_err(DbError::Connect)?;
        let db = Self { pool };

        if config.migrate {
            db.migrate().await?;
        }

        tracing::info!(max_connections = config.max_connections, "Database connected");
        Ok(db)
    }

    /// Create missing tables.
    pub async fn migrate(&self) -> Result<(), DbError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    /// Run a row-returning query and decode every row.
    pub async fn fetch_all<T>(&self, sql: &str, params: &NamedParams) -> Result<Vec<T>, DbError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let (sql, names) = compile_named(sql);
        let args = bind(&names, params)?;
        tracing::trace!(sql = %sql, "fetch_all");
        Ok(sqlx::query_as_with::<_, T, _>(&sql, args)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Run a query and decode the first row, if any.
    pub async fn fetch_optional<T>(&self, sql: &str, params: &NamedParams) -> Result<Option<T>, DbError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let (sql, names) = compile_named(sql);
        let args = bind(&names, params)?;
        tracing::trace!(sql = %sql, "fetch_optional");
        Ok(sqlx::query_as_with::<_, T, _>(&sql, args)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Run a statement that returns no rows.
    pub async fn execute(&self, sql: &str, params: &NamedParams) -> Result<Executed, DbError> {
        let (sql, names) = compile_named(sql);
        let args = bind(&names, params)?;
        tracing::trace!(sql = %sql, "execute");
        let result = sqlx::query_with(&sql, args).execute(&self.pool).await?;
        Ok(Executed {
            rows_affected: result.rows_affected(),
            last_insert_id: result.last_insert_rowid(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_db() -> Database {
        let config = DatabaseConfig {
            url: "sqlite::memory:".into(),
            max_connections: 1,
            migrate: true,
        };
        Database::connect(&config, &TimeoutConfig::default()).await.unwrap()
    }

    #[test]
    fn test_compile_named() {
        let (sql, names) = compile_named("SELECT * FROM listings WHERE id = :id AND user_id = :user_id");
        assert_eq!(sql, "SELECT * FROM listings WHERE id = ? AND user_id = ?");
        assert_eq!(names, vec!["id", "user_id"]);
    }

    #[test]
    fn test_compile_named_skips_quotes_and_casts() {
        let (sql, names) = compile_named("SELECT ':nope', a::text FROM t WHERE b = :b");
        assert_eq!(sql, "SELECT ':nope', a::text FROM t WHERE b = ?");
        assert_eq!(names, vec!["b"]);
    }

    #[test]
    fn test_repeated_placeholder_binds_twice() {
        let (sql, names) = compile_named("WHERE title LIKE :q OR tags LIKE :q");
        assert_eq!(sql, "WHERE title LIKE ? OR tags LIKE ?");
        assert_eq!(names, vec!["q", "q"]);
    }

    #[test]
    fn test_missing_parameter() {
        let err = bind(&["id".to_string()], &NamedParams::new()).unwrap_err();
        assert!(matches!(err, DbError::MissingParameter(name) if name == "id"));
    }

    #[derive(Debug, sqlx::FromRow)]
    struct Name {
        name: String,
    }

    #[tokio::test]
    async fn test_execute_and_fetch() {
        let db = memory_db().await;
        let inserted = db
            .execute(
                "INSERT INTO users (name, email, city, state, password) VALUES (:name, :email, :city, :state, :password)",
                &named([
                    ("name", DbValue::from("Ada")),
                    ("email", "ada@example.com".into()),
                    ("city", "London".into()),
                    ("state", DbValue::Null),
                    ("password", "x".into()),
                ]),
            )
            .await
            .unwrap();
        assert_eq!(inserted.rows_affected, 1);

        let row: Option<Name> = db
            .fetch_optional("SELECT name FROM users WHERE id = :id", &named([("id", inserted.last_insert_id)]))
            .await
            .unwrap();
        assert_eq!(row.unwrap().name, "Ada");

        let none: Option<Name> = db
            .fetch_optional("SELECT name FROM users WHERE id = :id", &named([("id", 999_i64)]))
            .await
            .unwrap();
        assert!(none.is_none());
    }
}
