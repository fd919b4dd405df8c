//! Deterministic names of everything created for a `Database`

use dispg_api::{DATABASE_NAME_LABEL, DATABASE_TAG, Database};
use kube::ResourceExt;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Maximum length of a Kubernetes object name that is also used as a label value
pub const MAX_NAME_LEN: usize = 63;

const PRIVATE_ZONE_SUFFIX: &str = "private.postgres.database.azure.com";

pub const USER_PROVISION_LABEL: &str = "dis.altinn.cloud/user-provision";

/// First 8 hex characters of the SHA-256 of `payload`
pub fn short_hash(payload: &str) -> String {
    let digest = Sha256::digest(payload.as_bytes());
    let hex = format!("{digest:x}");
    hex[..8].to_string()
}

/// `base-suffix`, truncating `base` so the result fits in `max_len`.
///
/// The truncated base never ends in `-` and is never empty.
pub fn bounded_name(base: &str, suffix: &str, max_len: usize) -> String {
    let max_base = max_len.saturating_sub(1 + suffix.len()).max(1);

    let mut base = base;
    if base.len() > max_base {
        let mut cut = max_base;
        while !base.is_char_boundary(cut) {
            cut -= 1;
        }
        base = base[..cut].trim_end_matches('-');
    }
    if base.is_empty() {
        base = "db";
    }

    format!("{base}-{suffix}")
}

pub fn private_zone_name(db_name: &str) -> String {
    format!("{db_name}.{PRIVATE_ZONE_SUFFIX}")
}

pub fn db_vnet_link_name(db_name: &str) -> String {
    format!("{db_name}-vnetlink")
}

pub fn aks_vnet_link_name(db_name: &str) -> String {
    format!("{db_name}-aks-vnetlink")
}

pub fn administrator_name(db_name: &str) -> String {
    format!("{db_name}-admin")
}

pub fn server_name(db_name: &str) -> String {
    db_name.to_string()
}

pub fn extensions_configuration_name(db_name: &str) -> String {
    format!("{db_name}-extensions")
}

pub fn preload_configuration_name(db_name: &str) -> String {
    format!("{db_name}-shared-preload-libraries")
}

/// Labels put on every object created for `db`
pub fn database_labels(db: &Database) -> BTreeMap<String, String> {
    BTreeMap::from([(DATABASE_NAME_LABEL.to_string(), db.name_any())])
}

/// Azure tags put on every cloud resource created for `db`
pub fn azure_tags(db: &Database) -> BTreeMap<String, String> {
    BTreeMap::from([(DATABASE_TAG.to_string(), db.name_any())])
}

/// Labels selecting the provisioning jobs of `db`
pub fn user_provision_labels(db: &Database) -> BTreeMap<String, String> {
    let mut labels = database_labels(db);
    labels.insert(USER_PROVISION_LABEL.to_string(), "true".to_string());
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_hash_is_stable() {
        let a = short_hash("adminSA=sa;admin=a;user=u;userPID=p;db=orders");
        let b = short_hash("adminSA=sa;admin=a;user=u;userPID=p;db=orders");
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, short_hash("adminSA=sa;admin=a;user=u;userPID=q;db=orders"));
    }

    #[test]
    fn test_short_hash_known_value() {
        // sha256("abc") = ba7816bf...
        assert_eq!(short_hash("abc"), "ba7816bf");
    }

    #[test]
    fn test_bounded_name_short_base_untouched() {
        assert_eq!(
            bounded_name("orders-user-provision", "0123abcd", MAX_NAME_LEN),
            "orders-user-provision-0123abcd"
        );
    }

    #[test]
    fn test_bounded_name_truncates_long_base() {
        let base = format!("{}-user-provision", "a".repeat(80));
        let name = bounded_name(&base, "0123abcd", MAX_NAME_LEN);

        assert_eq!(name.len(), MAX_NAME_LEN);
        assert!(name.ends_with("-0123abcd"));
    }

    #[test]
    fn test_bounded_name_trims_trailing_dashes() {
        // base cut at 54 chars lands on the dash run
        let base = format!("{}-----tail", "b".repeat(50));
        let name = bounded_name(&base, "0123abcd", MAX_NAME_LEN);
        assert_eq!(name, format!("{}-0123abcd", "b".repeat(50)));
    }

    #[test]
    fn test_bounded_name_never_empty() {
        assert_eq!(bounded_name("----", "0123abcd", 10), "db-0123abcd");
        assert_eq!(bounded_name("", "x", MAX_NAME_LEN), "db-x");
    }

    #[test]
    fn test_resource_names() {
        assert_eq!(
            private_zone_name("orders"),
            "orders.private.postgres.database.azure.com"
        );
        assert_eq!(db_vnet_link_name("orders"), "orders-vnetlink");
        assert_eq!(aks_vnet_link_name("orders"), "orders-aks-vnetlink");
        assert_eq!(administrator_name("orders"), "orders-admin");
        assert_eq!(server_name("orders"), "orders");
        assert_eq!(extensions_configuration_name("orders"), "orders-extensions");
        assert_eq!(
            preload_configuration_name("orders"),
            "orders-shared-preload-libraries"
        );
    }
}
