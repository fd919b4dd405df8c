//! Private DNS zone and its VNet links

use crate::ensure::ensure_owned;
use crate::error::Result;
use crate::naming::{aks_vnet_link_name, azure_tags, db_vnet_link_name, private_zone_name};
use dispg_api::{
    Database, KnownResourceReference, PrivateDnsZone, PrivateDnsZoneSpec,
    PrivateDnsZonesVirtualNetworkLink, PrivateDnsZonesVirtualNetworkLinkSpec, ResourceReference,
    SubResource,
};
use dispg_config::OperatorConfig;
use dispg_store::{ActionType, ObjectStore};
use kube::ResourceExt;

/// Private DNS zones and their links are global resources
const GLOBAL_LOCATION: &str = "global";

pub fn desired_zone_spec(db: &Database, config: &OperatorConfig) -> PrivateDnsZoneSpec {
    PrivateDnsZoneSpec {
        azure_name: private_zone_name(&db.name_any()),
        location: Some(GLOBAL_LOCATION.to_string()),
        owner: Some(KnownResourceReference::by_arm_id(config.resource_group_arm_id())),
        tags: azure_tags(db),
    }
}

pub fn desired_link_spec(
    db: &Database,
    link_name: &str,
    vnet_arm_id: String,
) -> PrivateDnsZonesVirtualNetworkLinkSpec {
    PrivateDnsZonesVirtualNetworkLinkSpec {
        azure_name: link_name.to_string(),
        location: Some(GLOBAL_LOCATION.to_string()),
        owner: Some(KnownResourceReference::by_name(private_zone_name(&db.name_any()))),
        registration_enabled: Some(false),
        virtual_network: Some(SubResource {
            reference: Some(ResourceReference::by_arm_id(vnet_arm_id)),
        }),
        tags: azure_tags(db),
    }
}

pub async fn ensure_private_dns_zone<S: ObjectStore>(
    store: &S,
    db: &Database,
    config: &OperatorConfig,
) -> Result<ActionType> {
    let name = private_zone_name(&db.name_any());
    ensure_owned::<PrivateDnsZone, _>(store, db, &name, desired_zone_spec(db, config)).await
}

/// Link the zone to both the database VNet and the consumer (AKS) VNet
pub async fn ensure_vnet_links<S: ObjectStore>(
    store: &S,
    db: &Database,
    config: &OperatorConfig,
) -> Result<ActionType> {
    let db_name = db.name_any();

    let db_link = db_vnet_link_name(&db_name);
    let db_action = ensure_owned::<PrivateDnsZonesVirtualNetworkLink, _>(
        store,
        db,
        &db_link,
        desired_link_spec(db, &db_link, config.db_vnet_arm_id()?),
    )
    .await?;

    let aks_link = aks_vnet_link_name(&db_name);
    let aks_action = ensure_owned::<PrivateDnsZonesVirtualNetworkLink, _>(
        store,
        db,
        &aks_link,
        desired_link_spec(db, &aks_link, config.aks_vnet_arm_id()?),
    )
    .await?;

    Ok(db_action.and(aks_action))
}
