//! Server parameters for extensions

use crate::ensure::{database_namespace, ensure_owned, is_controlled_by, sync_existing};
use crate::error::Result;
use crate::extensions::resolve_extension_settings;
use crate::naming::{extensions_configuration_name, preload_configuration_name, server_name};
use dispg_api::{
    Database, FlexibleServersConfiguration, FlexibleServersConfigurationSpec,
    KnownResourceReference,
};
use dispg_store::{ActionType, ObjectStore};
use kube::ResourceExt;
use tracing::debug;

pub const EXTENSIONS_PARAMETER: &str = "azure.extensions";
pub const PRELOAD_PARAMETER: &str = "shared_preload_libraries";

const USER_OVERRIDE: &str = "user-override";

pub fn desired_configuration_spec(
    db: &Database,
    parameter: &str,
    value: String,
) -> FlexibleServersConfigurationSpec {
    FlexibleServersConfigurationSpec {
        azure_name: parameter.to_string(),
        owner: Some(KnownResourceReference::by_name(server_name(&db.name_any()))),
        source: Some(USER_OVERRIDE.to_string()),
        value: Some(value),
    }
}

/// Write or clear `azure.extensions` and `shared_preload_libraries`.
///
/// Without `enableExtensions` only parameters this Database controls are
/// cleared; parameters managed by anyone else are left alone.
pub async fn ensure_configurations<S: ObjectStore>(store: &S, db: &Database) -> Result<ActionType> {
    let db_name = db.name_any();
    let parameters = [
        (extensions_configuration_name(&db_name), EXTENSIONS_PARAMETER),
        (preload_configuration_name(&db_name), PRELOAD_PARAMETER),
    ];

    let Some(requested) = &db.spec.enable_extensions else {
        let mut action = ActionType::NoOp;
        for (name, parameter) in &parameters {
            action = action.and(clear_configuration(store, db, name, parameter).await?);
        }
        return Ok(action);
    };

    let settings = resolve_extension_settings(requested)?;
    let values = [settings.extensions, settings.preload_libraries];

    let mut action = ActionType::NoOp;
    for ((name, parameter), value) in parameters.iter().zip(values) {
        let spec = desired_configuration_spec(db, parameter, value);
        action = action.and(ensure_owned::<FlexibleServersConfiguration, _>(store, db, name, spec).await?);
    }
    Ok(action)
}

async fn clear_configuration<S: ObjectStore>(
    store: &S,
    db: &Database,
    name: &str,
    parameter: &str,
) -> Result<ActionType> {
    let namespace = database_namespace(db)?;
    let Some(existing) = store
        .get::<FlexibleServersConfiguration>(&namespace, name)
        .await?
    else {
        return Ok(ActionType::NoOp);
    };

    if !is_controlled_by(&existing, db) {
        debug!(%namespace, name, "Configuration not controlled by this Database, leaving it");
        return Ok(ActionType::NoOp);
    }

    let spec = desired_configuration_spec(db, parameter, String::new());
    sync_existing(store, db, existing, spec).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{NAMESPACE, database};
    use dispg_store::InMemoryStore;

    async fn value(store: &InMemoryStore, name: &str) -> Option<String> {
        let config = store
            .get::<FlexibleServersConfiguration>(NAMESPACE, name)
            .await
            .unwrap()?;
        config.spec.value
    }

    #[tokio::test]
    async fn test_extensions_written() {
        let store = InMemoryStore::new();
        let mut db = database("orders");
        db.spec.enable_extensions = Some(vec!["pgaudit".to_string(), "hstore".to_string()]);

        let action = ensure_configurations(&store, &db).await.unwrap();
        assert_eq!(action, ActionType::Create);
        assert_eq!(value(&store, "orders-extensions").await.as_deref(), Some("hstore,pgaudit"));
        assert_eq!(
            value(&store, "orders-shared-preload-libraries").await.as_deref(),
            Some("pgaudit")
        );

        let config: FlexibleServersConfiguration =
            store.get(NAMESPACE, "orders-extensions").await.unwrap().unwrap();
        assert_eq!(config.spec.azure_name, "azure.extensions");
        assert_eq!(config.spec.source.as_deref(), Some("user-override"));

        assert_eq!(ensure_configurations(&store, &db).await.unwrap(), ActionType::NoOp);
    }

    #[tokio::test]
    async fn test_removed_extensions_are_cleared() {
        let store = InMemoryStore::new();
        let mut db = database("orders");
        db.spec.enable_extensions = Some(vec!["pg_cron".to_string()]);
        ensure_configurations(&store, &db).await.unwrap();

        db.spec.enable_extensions = None;
        let action = ensure_configurations(&store, &db).await.unwrap();
        assert_eq!(action, ActionType::Update);
        assert_eq!(value(&store, "orders-extensions").await.as_deref(), Some(""));
        assert_eq!(
            value(&store, "orders-shared-preload-libraries").await.as_deref(),
            Some("")
        );
    }

    #[tokio::test]
    async fn test_nothing_to_clear_is_noop() {
        let store = InMemoryStore::new();
        let action = ensure_configurations(&store, &database("orders")).await.unwrap();
        assert_eq!(action, ActionType::NoOp);
        assert_eq!(store.count::<FlexibleServersConfiguration>().await, 0);
    }

    #[tokio::test]
    async fn test_foreign_configuration_left_alone() {
        let store = InMemoryStore::new();
        let mut foreign = FlexibleServersConfiguration::new(
            "orders-extensions",
            FlexibleServersConfigurationSpec {
                azure_name: "azure.extensions".to_string(),
                value: Some("postgis".to_string()),
                ..Default::default()
            },
        );
        foreign.metadata.namespace = Some(NAMESPACE.to_string());
        store.create(&foreign).await.unwrap();

        let action = ensure_configurations(&store, &database("orders")).await.unwrap();
        assert_eq!(action, ActionType::NoOp);
        assert_eq!(value(&store, "orders-extensions").await.as_deref(), Some("postgis"));
    }

    #[tokio::test]
    async fn test_unsupported_extension_writes_nothing() {
        let store = InMemoryStore::new();
        let mut db = database("orders");
        db.spec.enable_extensions = Some(vec!["postgis".to_string()]);

        let err = ensure_configurations(&store, &db).await.unwrap_err();
        assert!(err.is_terminal());
        assert_eq!(store.count::<FlexibleServersConfiguration>().await, 0);
    }
}
