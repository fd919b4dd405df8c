//! Fixtures shared by the controller tests

use dispg_api::{
    AdminIdentitySpec, ApplicationIdentity, ApplicationIdentityRef, ApplicationIdentitySpec,
    ApplicationIdentityStatus, Condition, Database, DatabaseAuth, DatabaseSpec, IdentitySource,
    UserIdentitySpec,
};
use dispg_config::OperatorConfig;
use dispg_network::{SubnetCatalog, SubnetInfo};
use dispg_store::{InMemoryStore, ObjectStore};

pub const NAMESPACE: &str = "team-a";

pub fn literal(name: &str, principal_id: &str) -> IdentitySource {
    IdentitySource {
        identity_ref: None,
        name: Some(name.to_string()),
        principal_id: Some(principal_id.to_string()),
    }
}

pub fn reference(name: &str) -> IdentitySource {
    IdentitySource {
        identity_ref: Some(ApplicationIdentityRef {
            name: name.to_string(),
        }),
        ..Default::default()
    }
}

/// A dev Database whose admin references `<name>-admin` and whose user is a
/// literal identity
pub fn database(name: &str) -> Database {
    let mut db = Database::new(
        name,
        DatabaseSpec {
            version: 17,
            server_type: "dev".to_string(),
            auth: DatabaseAuth {
                admin: AdminIdentitySpec {
                    identity: reference(&format!("{name}-admin")),
                    service_account_name: None,
                },
                user: UserIdentitySpec {
                    identity: literal(&format!("{name}-app"), "pid-user"),
                },
            },
            enable_extensions: None,
            storage: None,
            backup_retention_days: None,
        },
    );
    db.metadata.namespace = Some(NAMESPACE.to_string());
    db.metadata.uid = Some(format!("uid-{name}"));
    db
}

pub fn ready_identity(managed_identity_name: &str, principal_id: &str) -> ApplicationIdentityStatus {
    ApplicationIdentityStatus {
        principal_id: Some(principal_id.to_string()),
        client_id: Some(format!("client-{managed_identity_name}")),
        managed_identity_name: Some(managed_identity_name.to_string()),
        conditions: vec![Condition {
            r#type: "Ready".to_string(),
            status: "True".to_string(),
            reason: None,
            message: None,
            last_transition_time: None,
        }],
    }
}

/// Store an `ApplicationIdentity` with the given status in [`NAMESPACE`]
pub async fn put_identity(store: &InMemoryStore, name: &str, status: ApplicationIdentityStatus) {
    let mut identity = ApplicationIdentity::new(name, ApplicationIdentitySpec::default());
    identity.metadata.namespace = Some(NAMESPACE.to_string());

    let mut created = store.create(&identity).await.unwrap();
    created.status = Some(status);
    store.update_status(&created).await.unwrap();
}

pub async fn store_with_identity(name: &str, status: ApplicationIdentityStatus) -> InMemoryStore {
    let store = InMemoryStore::new();
    put_identity(&store, name, status).await;
    store
}

pub fn test_config() -> OperatorConfig {
    OperatorConfig {
        write_namespace: "dispg-system".to_string(),
        resource_group: "rg-dis-dev-network".to_string(),
        aks_resource_group: "aks-vnet-rg".to_string(),
        db_vnet_name: "vnet-dis-dev-001".to_string(),
        aks_vnet_name: "aks-vnet-dis-dev-001".to_string(),
        subscription_id: "my-subscription-id".to_string(),
        tenant_id: "my-tenant-id".to_string(),
        location: String::new(),
        user_provision_image: "controller:latest".to_string(),
        use_az_fakes: false,
    }
    .validate()
    .unwrap()
}

/// Sixteen contiguous /28 blocks, s1 = 10.100.1.0/28 .. s16 = 10.100.1.240/28
pub fn test_catalog() -> SubnetCatalog {
    let infos = (0..16)
        .map(|i| SubnetInfo::new(format!("s{}", i + 1), format!("10.100.1.{}/28", i * 16)))
        .collect();
    SubnetCatalog::new(infos).unwrap()
}
