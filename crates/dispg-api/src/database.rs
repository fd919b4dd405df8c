//! `Database` custom resource

use crate::condition::Condition;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Database is the schema for the databases API
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[kube(
    group = "storage.dis.altinn.cloud",
    version = "v1alpha1",
    kind = "Database",
    plural = "databases",
    namespaced,
    status = "DatabaseStatus",
    printcolumn = r#"{"name":"Version", "type":"integer", "jsonPath":".spec.version"}"#,
    printcolumn = r#"{"name":"Type", "type":"string", "jsonPath":".spec.serverType"}"#,
    printcolumn = r#"{"name":"Subnet", "type":"string", "jsonPath":".status.subnetCIDR"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseSpec {
    /// Major PostgreSQL version, e.g. 17
    #[schemars(range(min = 9))]
    pub version: i32,

    /// Size/profile of the server, e.g. "dev" or "prod"
    pub server_type: String,

    /// Identities that get access to this database
    pub auth: DatabaseAuth,

    /// Curated list of extensions to enable.
    ///
    /// Extensions needing `shared_preload_libraries` are configured
    /// automatically. Absent means the operator clears its own settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_extensions: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<DatabaseStorageSpec>,

    /// Overrides the profile's default backup retention
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_retention_days: Option<i32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct DatabaseStorageSpec {
    /// Initial storage size in GB; defaulted when omitted
    #[serde(rename = "sizeGB", default, skip_serializing_if = "Option::is_none")]
    pub size_gb: Option<i32>,

    /// Storage performance tier, e.g. "P10"; defaulted when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct DatabaseAuth {
    /// Identity used for admin access
    pub admin: AdminIdentitySpec,

    /// Identity used for normal user access
    pub user: UserIdentitySpec,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminIdentitySpec {
    pub identity: IdentitySource,

    /// ServiceAccount used for workload identity by the provisioning job.
    /// Defaults to `identity.identityRef.name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct UserIdentitySpec {
    pub identity: IdentitySource,
}

/// Either literal `name` + `principalId`, or a reference to an
/// `ApplicationIdentity` in the same namespace. Never both.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_ref: Option<ApplicationIdentityRef>,

    /// Entra principal name (managed identity name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Entra principal object ID (GUID)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,
}

impl IdentitySource {
    /// Name of the referenced identity, if this source is a reference
    pub fn ref_name(&self) -> Option<&str> {
        self.identity_ref.as_ref().map(|r| r.name.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct ApplicationIdentityRef {
    /// ApplicationIdentity name in the same namespace
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct DatabaseStatus {
    /// The /28 block allocated for this database's subnet
    #[serde(rename = "subnetCIDR", default, skip_serializing_if = "Option::is_none")]
    pub subnet_cidr: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl Database {
    /// The allocated subnet CIDR, if any. Empty strings count as unallocated.
    pub fn subnet_cidr(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.subnet_cidr.as_deref())
            .filter(|cidr| !cidr.is_empty())
    }

    /// Whether either identity source references the named `ApplicationIdentity`
    pub fn references_identity(&self, identity_name: &str) -> bool {
        let auth = &self.spec.auth;
        auth.admin.identity.ref_name() == Some(identity_name)
            || auth.user.identity.ref_name() == Some(identity_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
apiVersion: storage.dis.altinn.cloud/v1alpha1
kind: Database
metadata:
  name: orders
  namespace: team-a
spec:
  version: 17
  serverType: dev
  storage:
    sizeGB: 64
    tier: p15
  enableExtensions: [pg_cron, hstore]
  auth:
    admin:
      identity:
        identityRef:
          name: orders-admin
    user:
      identity:
        name: orders-app
        principalId: 00000000-0000-0000-0000-000000000001
status:
  subnetCIDR: 10.100.1.0/28
"#;

    #[test]
    fn test_database_manifest_parses() {
        let db: Database = serde_yaml::from_str(MANIFEST).unwrap();

        assert_eq!(db.spec.version, 17);
        assert_eq!(db.spec.storage.as_ref().and_then(|s| s.size_gb), Some(64));
        assert_eq!(db.spec.auth.admin.identity.ref_name(), Some("orders-admin"));
        assert_eq!(db.spec.auth.user.identity.name.as_deref(), Some("orders-app"));
        assert_eq!(db.subnet_cidr(), Some("10.100.1.0/28"));
    }

    #[test]
    fn test_status_uses_upper_case_cidr_key() {
        let status = DatabaseStatus {
            subnet_cidr: Some("10.100.1.16/28".to_string()),
            conditions: Vec::new(),
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json, serde_json::json!({"subnetCIDR": "10.100.1.16/28"}));
    }

    #[test]
    fn test_empty_cidr_counts_as_unallocated() {
        let mut db: Database = serde_yaml::from_str(MANIFEST).unwrap();
        db.status = Some(DatabaseStatus {
            subnet_cidr: Some(String::new()),
            conditions: Vec::new(),
        });
        assert_eq!(db.subnet_cidr(), None);
    }

    #[test]
    fn test_references_identity() {
        let db: Database = serde_yaml::from_str(MANIFEST).unwrap();
        assert!(db.references_identity("orders-admin"));
        assert!(!db.references_identity("orders-app"));
    }
}
