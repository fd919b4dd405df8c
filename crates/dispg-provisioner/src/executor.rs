//! SQL execution seam

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgSslMode};
use sqlx::{ConnectOptions, Connection};
use std::str::FromStr;

/// The two kinds of statement the provisioning job issues
#[async_trait]
pub trait SqlExecutor: Send {
    /// Run a query returning a single boolean
    async fn query_bool(&mut self, sql: &str, param: &str) -> Result<bool, sqlx::Error>;

    /// Run a statement with text parameters, discarding any rows
    async fn execute(&mut self, sql: &str, params: &[&str]) -> Result<(), sqlx::Error>;
}

/// [`SqlExecutor`] over a single PostgreSQL connection
pub struct PgExecutor {
    conn: PgConnection,
}

impl PgExecutor {
    pub async fn connect(
        host: &str,
        port: u16,
        database: &str,
        ssl_mode: &str,
        user: &str,
        password: &str,
    ) -> Result<Self, sqlx::Error> {
        let options = PgConnectOptions::new()
            .host(host)
            .port(port)
            .database(database)
            .ssl_mode(PgSslMode::from_str(ssl_mode)?)
            .username(user)
            .password(password);

        let conn = options.connect().await?;
        Ok(Self { conn })
    }

    pub async fn close(self) -> Result<(), sqlx::Error> {
        self.conn.close().await
    }
}

#[async_trait]
impl SqlExecutor for PgExecutor {
    async fn query_bool(&mut self, sql: &str, param: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(sql)
            .bind(param)
            .fetch_one(&mut self.conn)
            .await
    }

    async fn execute(&mut self, sql: &str, params: &[&str]) -> Result<(), sqlx::Error> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = query.bind(*param);
        }
        query.execute(&mut self.conn).await?;
        Ok(())
    }
}
