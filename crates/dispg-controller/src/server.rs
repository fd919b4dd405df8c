//! The PostgreSQL Flexible Server

use crate::ensure::ensure_owned;
use crate::error::Result;
use crate::naming::{azure_tags, private_zone_name, server_name};
use crate::profile::{profile_for, resolve_backup_retention_days};
use crate::storage_tier::resolve_storage_tier;
use dispg_api::{
    AuthConfig, Backup, Database, FlexibleServer, FlexibleServerSpec, KnownResourceReference,
    ResourceReference, ServerNetwork, Sku, Storage,
};
use dispg_config::OperatorConfig;
use dispg_network::{SubnetCatalog, SubnetError, SubnetInfo};
use dispg_store::{ActionType, ObjectStore};
use kube::ResourceExt;

pub const DEFAULT_STORAGE_SIZE_GB: i32 = 32;

const ENABLED: &str = "Enabled";
const DISABLED: &str = "Disabled";

/// Requested storage size, ignoring non-positive values
fn storage_size_gb(db: &Database) -> i32 {
    db.spec
        .storage
        .as_ref()
        .and_then(|s| s.size_gb)
        .filter(|size| *size > 0)
        .unwrap_or(DEFAULT_STORAGE_SIZE_GB)
}

/// Build the server placed in `subnet`
pub fn desired_server_spec(
    db: &Database,
    config: &OperatorConfig,
    subnet: &SubnetInfo,
) -> Result<FlexibleServerSpec> {
    let db_name = db.name_any();
    let profile = profile_for(&db.spec.server_type);
    let size_gb = storage_size_gb(db);
    let requested_tier = db.spec.storage.as_ref().and_then(|s| s.tier.as_deref());

    Ok(FlexibleServerSpec {
        azure_name: server_name(&db_name),
        location: Some(config.location.clone()),
        owner: Some(KnownResourceReference::by_arm_id(config.resource_group_arm_id())),
        version: Some(db.spec.version.to_string()),
        network: Some(ServerNetwork {
            delegated_subnet_resource_reference: Some(ResourceReference::by_arm_id(
                config.subnet_arm_id(&subnet.name)?,
            )),
            private_dns_zone_arm_resource_reference: Some(ResourceReference::by_kind(
                "network.azure.com",
                "PrivateDnsZone",
                private_zone_name(&db_name),
            )),
            public_network_access: Some(DISABLED.to_string()),
        }),
        storage: Some(Storage {
            auto_grow: Some(ENABLED.to_string()),
            storage_size_gb: Some(size_gb),
            tier: Some(resolve_storage_tier(size_gb, requested_tier)),
        }),
        sku: Some(Sku {
            name: Some(profile.sku_name.to_string()),
            tier: Some(profile.sku_tier.to_string()),
        }),
        backup: Some(Backup {
            backup_retention_days: Some(resolve_backup_retention_days(
                &db.spec.server_type,
                db.spec.backup_retention_days,
            )),
        }),
        auth_config: Some(AuthConfig {
            active_directory_auth: Some(ENABLED.to_string()),
            password_auth: Some(DISABLED.to_string()),
            tenant_id: Some(config.require_tenant_id()?.to_string()),
        }),
        tags: azure_tags(db),
    })
}

/// Ensure the server in the subnet persisted in the Database status
pub async fn ensure_server<S: ObjectStore>(
    store: &S,
    db: &Database,
    config: &OperatorConfig,
    catalog: &SubnetCatalog,
    cidr: &str,
) -> Result<ActionType> {
    let subnet = catalog
        .find_by_cidr(cidr)
        .ok_or_else(|| SubnetError::UnknownCidr(cidr.to_string()))?;

    let spec = desired_server_spec(db, config, subnet)?;
    let name = server_name(&db.name_any());
    ensure_owned::<FlexibleServer, _>(store, db, &name, spec).await
}
