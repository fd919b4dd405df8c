//! Ensuring the application user exists with its own schema

use crate::error::{ProvisionError, Result};
use crate::executor::{PgExecutor, SqlExecutor};
use crate::settings::{POSTGRES_PORT, ProvisionSettings};
use crate::sql::{
    AAD_PRINCIPAL_TYPE, CREATE_AAD_PRINCIPAL_SQL, ROLE_EXISTS_SQL, alter_schema_owner_sql,
    create_role_sql, create_schema_sql, grant_connect_sql, set_search_path_sql,
};
use dispg_azure::{POSTGRES_SCOPE, TokenCredential, WorkloadIdentityCredential};
use tracing::{info, warn};

/// What [`ensure_user`] needs to know about the user
#[derive(Debug, Clone, Copy)]
pub struct UserGrant<'a> {
    pub user: &'a str,
    pub principal_id: &'a str,
    pub db_name: &'a str,
    pub schema: &'a str,
    /// Create the role as an Entra principal instead of a plain login role
    pub use_aad: bool,
}

fn sql_step(step: &'static str) -> impl FnOnce(sqlx::Error) -> ProvisionError {
    move |source| ProvisionError::Sql { step, source }
}

/// Create the role if needed, then grant it CONNECT, give it its schema and
/// make that schema its default search path. Safe to run repeatedly.
pub async fn ensure_user<E: SqlExecutor>(executor: &mut E, grant: UserGrant<'_>) -> Result<()> {
    let exists = executor
        .query_bool(ROLE_EXISTS_SQL, grant.user)
        .await
        .map_err(sql_step("check role existence"))?;

    if exists {
        info!(user = grant.user, "Role already exists");
    } else if grant.use_aad {
        if grant.principal_id.is_empty() {
            return Err(ProvisionError::MissingPrincipalId);
        }
        executor
            .execute(
                CREATE_AAD_PRINCIPAL_SQL,
                &[grant.user, grant.principal_id, AAD_PRINCIPAL_TYPE],
            )
            .await
            .map_err(sql_step("create Entra principal"))?;
        info!(user = grant.user, "Created Entra principal");
    } else {
        executor
            .execute(&create_role_sql(grant.user), &[])
            .await
            .map_err(sql_step("create role"))?;
        info!(user = grant.user, "Created role");
    }

    executor
        .execute(&grant_connect_sql(grant.db_name, grant.user), &[])
        .await
        .map_err(sql_step("grant connect"))?;
    executor
        .execute(&create_schema_sql(grant.schema, grant.user), &[])
        .await
        .map_err(sql_step("create schema"))?;
    executor
        .execute(&alter_schema_owner_sql(grant.schema, grant.user), &[])
        .await
        .map_err(sql_step("alter schema owner"))?;
    executor
        .execute(&set_search_path_sql(grant.user, grant.schema), &[])
        .await
        .map_err(sql_step("set role search_path"))?;

    info!(user = grant.user, schema = grant.schema, "User provisioned");
    Ok(())
}

/// Run the provisioning task described by `settings`
pub async fn run(settings: &ProvisionSettings) -> Result<()> {
    let password = if settings.disable_aad {
        settings.password.clone()
    } else {
        let credential = WorkloadIdentityCredential::from_env()?;
        credential.get_token(POSTGRES_SCOPE).await?.token
    };

    info!(
        host = %settings.host,
        database = %settings.db_name,
        user = settings.login_user(),
        "Connecting to PostgreSQL"
    );
    let mut executor = PgExecutor::connect(
        &settings.host,
        POSTGRES_PORT,
        &settings.db_name,
        &settings.ssl_mode,
        settings.login_user(),
        &password,
    )
    .await
    .map_err(ProvisionError::Connect)?;

    let result = ensure_user(
        &mut executor,
        UserGrant {
            user: &settings.user_identity,
            principal_id: &settings.user_principal_id,
            db_name: &settings.db_name,
            schema: &settings.schema,
            use_aad: !settings.disable_aad,
        },
    )
    .await;

    if let Err(err) = executor.close().await {
        warn!(error = %err, "Failed to close PostgreSQL connection");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Call {
        sql: String,
        params: Vec<String>,
    }

    /// Records every statement; fails the statement at index `fail_at`
    #[derive(Default)]
    struct RecordingExecutor {
        role_exists: bool,
        fail_at: Option<usize>,
        calls: Vec<Call>,
    }

    impl RecordingExecutor {
        fn record(&mut self, sql: &str, params: &[&str]) -> std::result::Result<(), sqlx::Error> {
            self.calls.push(Call {
                sql: sql.to_string(),
                params: params.iter().map(|p| p.to_string()).collect(),
            });
            if self.fail_at == Some(self.calls.len() - 1) {
                return Err(sqlx::Error::Protocol("boom".to_string()));
            }
            Ok(())
        }

        fn statements(&self) -> Vec<&str> {
            self.calls.iter().map(|c| c.sql.as_str()).collect()
        }
    }

    #[async_trait]
    impl SqlExecutor for RecordingExecutor {
        async fn query_bool(&mut self, sql: &str, param: &str) -> std::result::Result<bool, sqlx::Error> {
            self.record(sql, &[param])?;
            Ok(self.role_exists)
        }

        async fn execute(&mut self, sql: &str, params: &[&str]) -> std::result::Result<(), sqlx::Error> {
            self.record(sql, params)
        }
    }

    fn grant(use_aad: bool, principal_id: &str) -> UserGrant<'_> {
        UserGrant {
            user: "orders-app",
            principal_id,
            db_name: "postgres",
            schema: "orders",
            use_aad,
        }
    }

    #[tokio::test]
    async fn test_entra_user_statement_order() {
        let mut executor = RecordingExecutor::default();
        ensure_user(&mut executor, grant(true, "pid-user")).await.unwrap();

        assert_eq!(
            executor.statements(),
            vec![
                ROLE_EXISTS_SQL,
                CREATE_AAD_PRINCIPAL_SQL,
                "GRANT CONNECT ON DATABASE \"postgres\" TO \"orders-app\";",
                "CREATE SCHEMA IF NOT EXISTS \"orders\" AUTHORIZATION \"orders-app\";",
                "ALTER SCHEMA \"orders\" OWNER TO \"orders-app\";",
                "ALTER ROLE \"orders-app\" SET search_path = \"orders\", public;",
            ]
        );
        assert_eq!(executor.calls[0].params, vec!["orders-app"]);
        assert_eq!(executor.calls[1].params, vec!["orders-app", "pid-user", "service"]);
    }

    #[tokio::test]
    async fn test_plain_role_when_aad_disabled() {
        let mut executor = RecordingExecutor::default();
        ensure_user(&mut executor, grant(false, "")).await.unwrap();

        assert_eq!(executor.statements()[1], "CREATE ROLE \"orders-app\" LOGIN;");
        assert_eq!(executor.calls.len(), 6);
    }

    #[tokio::test]
    async fn test_existing_role_is_not_recreated() {
        let mut executor = RecordingExecutor {
            role_exists: true,
            ..Default::default()
        };
        ensure_user(&mut executor, grant(true, "pid-user")).await.unwrap();

        assert_eq!(executor.calls.len(), 5);
        assert!(!executor.statements().contains(&CREATE_AAD_PRINCIPAL_SQL));
    }

    #[tokio::test]
    async fn test_entra_requires_principal_id() {
        let mut executor = RecordingExecutor::default();
        let err = ensure_user(&mut executor, grant(true, "")).await.unwrap_err();

        assert!(matches!(err, ProvisionError::MissingPrincipalId));
        assert_eq!(executor.calls.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_stops_and_names_step() {
        let mut executor = RecordingExecutor {
            fail_at: Some(3),
            ..Default::default()
        };
        let err = ensure_user(&mut executor, grant(true, "pid-user")).await.unwrap_err();

        assert!(err.to_string().starts_with("Failed to create schema"));
        assert_eq!(executor.calls.len(), 4);
    }
}
