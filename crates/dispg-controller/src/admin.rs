//! Entra administrator grant on the server

use crate::ensure::ensure_owned;
use crate::error::Result;
use crate::identity::ResolvedAdminIdentity;
use crate::naming::{administrator_name, server_name};
use dispg_api::{
    Database, FlexibleServersAdministrator, FlexibleServersAdministratorSpec,
    KnownResourceReference,
};
use dispg_config::OperatorConfig;
use dispg_store::{ActionType, ObjectStore};
use kube::ResourceExt;

const SERVICE_PRINCIPAL: &str = "ServicePrincipal";

pub fn desired_administrator_spec(
    db: &Database,
    config: &OperatorConfig,
    admin: &ResolvedAdminIdentity,
) -> Result<FlexibleServersAdministratorSpec> {
    Ok(FlexibleServersAdministratorSpec {
        azure_name: admin.identity.principal_id.clone(),
        owner: Some(KnownResourceReference::by_name(server_name(&db.name_any()))),
        principal_name: Some(admin.identity.name.clone()),
        principal_type: Some(SERVICE_PRINCIPAL.to_string()),
        tenant_id: Some(config.require_tenant_id()?.to_string()),
    })
}

pub async fn ensure_administrator<S: ObjectStore>(
    store: &S,
    db: &Database,
    config: &OperatorConfig,
    admin: &ResolvedAdminIdentity,
) -> Result<ActionType> {
    let spec = desired_administrator_spec(db, config, admin)?;
    let name = administrator_name(&db.name_any());
    ensure_owned::<FlexibleServersAdministrator, _>(store, db, &name, spec).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ResolvedIdentity;
    use crate::testing::{NAMESPACE, database, test_config};
    use dispg_store::InMemoryStore;

    fn admin(principal_id: &str) -> ResolvedAdminIdentity {
        ResolvedAdminIdentity {
            identity: ResolvedIdentity {
                name: "mi-admin".to_string(),
                principal_id: principal_id.to_string(),
            },
            service_account_name: "orders-admin".to_string(),
        }
    }

    #[tokio::test]
    async fn test_grant_is_keyed_by_principal() {
        let store = InMemoryStore::new();
        let db = database("orders");

        let action = ensure_administrator(&store, &db, &test_config(), &admin("pid-a"))
            .await
            .unwrap();
        assert_eq!(action, ActionType::Create);

        let grant: FlexibleServersAdministrator =
            store.get(NAMESPACE, "orders-admin").await.unwrap().unwrap();
        assert_eq!(grant.spec.azure_name, "pid-a");
        assert_eq!(grant.spec.principal_name.as_deref(), Some("mi-admin"));
        assert_eq!(grant.spec.principal_type.as_deref(), Some("ServicePrincipal"));
        assert_eq!(grant.spec.tenant_id.as_deref(), Some("my-tenant-id"));
        assert_eq!(grant.spec.owner.and_then(|o| o.name).as_deref(), Some("orders"));
    }

    #[tokio::test]
    async fn test_principal_change_updates_grant() {
        let store = InMemoryStore::new();
        let db = database("orders");
        let config = test_config();

        ensure_administrator(&store, &db, &config, &admin("pid-a"))
            .await
            .unwrap();
        let action = ensure_administrator(&store, &db, &config, &admin("pid-b"))
            .await
            .unwrap();
        assert_eq!(action, ActionType::Update);
    }

    #[tokio::test]
    async fn test_missing_tenant_is_config_error() {
        let store = InMemoryStore::new();
        let mut config = test_config();
        config.tenant_id = " ".to_string();

        let err = ensure_administrator(&store, &database("orders"), &config, &admin("pid-a"))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::ReconcileError::Config(_)));
    }
}
