//! Database session used by every report section.
//!
//! The report engine only needs two operations from the server: run a query
//! and get its rows back, or fetch a single value. [`Session`] is that seam;
//! [`MySqlSession`] implements it over one sqlx connection that lives for
//! the whole run.

use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Column, Connection, Row};
use tracing::{debug, info};

use crate::error::ReportError;
use crate::table::{Cell, ReportRow};

/// Query returning the server version string.
pub const VERSION_QUERY: &str = "SELECT @@version";

/// Minimal database surface consumed by the report engine.
#[allow(async_fn_in_trait)]
pub trait Session {
    /// Runs `query` and returns every row, each value kept verbatim.
    async fn execute(&mut self, query: &str) -> Result<Vec<ReportRow>, ReportError>;

    /// Runs `query` and returns the first column of the first row, if any.
    async fn scalar(&mut self, query: &str) -> Result<Option<String>, ReportError> {
        let rows = self.execute(query).await?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .and_then(|cell| match cell {
                Cell::Null => None,
                other => Some(other.to_string()),
            }))
    }
}

/// Connection parameters for the MySQL server.
#[derive(Debug, Clone)]
pub struct ConnectParams {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

/// A single serial MySQL connection.
pub struct MySqlSession {
    conn: MySqlConnection,
}

impl MySqlSession {
    /// Opens the connection. Failure is a connectivity error; it is not
    /// retried.
    pub async fn connect(params: &ConnectParams) -> Result<Self, ReportError> {
        let options = MySqlConnectOptions::new()
            .host(&params.host)
            .port(params.port)
            .username(&params.user)
            .password(&params.password)
            .database(&params.database);

        debug!(
            "Connecting to mysql://{}@{}:{}/{}",
            params.user, params.host, params.port, params.database
        );
        let conn = MySqlConnection::connect_with(&options).await?;
        info!("Connected to MySQL at {}:{}", params.host, params.port);

        Ok(Self { conn })
    }

    /// Closes the connection gracefully.
    pub async fn close(self) -> Result<(), ReportError> {
        self.conn.close().await?;
        Ok(())
    }
}

impl Session for MySqlSession {
    async fn execute(&mut self, query: &str) -> Result<Vec<ReportRow>, ReportError> {
        debug!("Executing query: {}", query.split_whitespace().collect::<Vec<_>>().join(" "));
        // Text protocol: every value arrives in its textual form, whatever the
        // column type, so rows can be forwarded without per-type decoding.
        let rows = sqlx::raw_sql(query).fetch_all(&mut self.conn).await?;
        Ok(rows.iter().map(row_to_cells).collect())
    }
}

fn row_to_cells(row: &MySqlRow) -> ReportRow {
    (0..row.columns().len())
        .map(|idx| match row.try_get_unchecked::<Option<Vec<u8>>, _>(idx) {
            Ok(Some(bytes)) => Cell::Text(String::from_utf8_lossy(&bytes).into_owned()),
            Ok(None) => Cell::Null,
            Err(e) => {
                debug!(
                    "Column '{}' could not be decoded: {}",
                    row.columns()[idx].name(),
                    e
                );
                Cell::Null
            }
        })
        .collect()
}

/// Server features that gate report sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerCapabilities {
    pub version: String,
    pub sys_schema: bool,
}

impl ServerCapabilities {
    /// Detects the server version and whether the `sys` schema is installed.
    pub async fn detect<S: Session>(session: &mut S) -> Result<Self, ReportError> {
        let version = session.scalar(VERSION_QUERY).await?.unwrap_or_default();
        let databases = session.execute("SHOW DATABASES").await?;
        let sys_schema = databases
            .iter()
            .any(|row| matches!(row.first(), Some(Cell::Text(name)) if name == "sys"));

        debug!("Server version '{}', sys schema present: {}", version, sys_schema);
        Ok(Self {
            version,
            sys_schema,
        })
    }

    /// Substring match on the version string, e.g. `"5.6"`.
    pub fn version_contains(&self, needle: &str) -> bool {
        self.version.contains(needle)
    }

    /// Schema exposing `global_variables`: `information_schema` on 5.6,
    /// `performance_schema` from 5.7 on.
    pub fn variables_schema(&self) -> &'static str {
        if self.version_contains("5.6") {
            "information_schema"
        } else {
            "performance_schema"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted {
        rows: Vec<ReportRow>,
    }

    impl Session for Scripted {
        async fn execute(&mut self, _query: &str) -> Result<Vec<ReportRow>, ReportError> {
            Ok(self.rows.clone())
        }
    }

    #[tokio::test]
    async fn test_scalar_takes_first_column_of_first_row() {
        let mut session = Scripted {
            rows: vec![
                vec![Cell::text("8.0.36"), Cell::text("ignored")],
                vec![Cell::text("other")],
            ],
        };
        let value = session.scalar(VERSION_QUERY).await.unwrap();
        assert_eq!(value.as_deref(), Some("8.0.36"));
    }

    #[tokio::test]
    async fn test_scalar_empty_and_null() {
        let mut empty = Scripted { rows: vec![] };
        assert_eq!(empty.scalar("x").await.unwrap(), None);

        let mut null = Scripted {
            rows: vec![vec![Cell::Null]],
        };
        assert_eq!(null.scalar("x").await.unwrap(), None);
    }

    #[test]
    fn test_variables_schema() {
        let old = ServerCapabilities {
            version: "5.6.51-log".into(),
            sys_schema: false,
        };
        assert_eq!(old.variables_schema(), "information_schema");

        let new = ServerCapabilities {
            version: "8.0.36".into(),
            sys_schema: true,
        };
        assert_eq!(new.variables_schema(), "performance_schema");
        assert!(!new.version_contains("5.7"));
    }
}
