//! dispg resource types
//!
//! - [`Database`]: the declarative intent reconciled by the operator
//! - [`ApplicationIdentity`]: identity resources owned by the identity operator,
//!   read here only for their status
//! - [`network`] / [`postgres`]: partial schemas of the Azure Service Operator
//!   resources the reconciler creates on behalf of a `Database`

pub mod condition;
pub mod database;
pub mod identity;
pub mod network;
pub mod postgres;
pub mod reference;

pub use condition::{CONDITION_FALSE, CONDITION_TRUE, Condition, find_condition, set_condition};
pub use database::{
    AdminIdentitySpec, ApplicationIdentityRef, Database, DatabaseAuth, DatabaseSpec,
    DatabaseStatus, DatabaseStorageSpec, IdentitySource, UserIdentitySpec,
};
pub use identity::{ApplicationIdentity, ApplicationIdentitySpec, ApplicationIdentityStatus};
pub use network::{
    PrivateDnsZone, PrivateDnsZoneSpec, PrivateDnsZonesVirtualNetworkLink,
    PrivateDnsZonesVirtualNetworkLinkSpec, SubResource,
};
pub use postgres::{
    AuthConfig, Backup, FlexibleServer, FlexibleServerSpec, FlexibleServersAdministrator,
    FlexibleServersAdministratorSpec, FlexibleServersConfiguration,
    FlexibleServersConfigurationSpec, ServerNetwork, Sku, Storage,
};
pub use reference::{KnownResourceReference, ResourceReference};

/// Label carried by every resource created for a `Database`
pub const DATABASE_NAME_LABEL: &str = "dis.altinn.cloud/database-name";

/// Cloud-side tag carried by every Azure resource created for a `Database`
pub const DATABASE_TAG: &str = "dis-database";
