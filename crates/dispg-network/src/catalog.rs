//! In-memory subnet catalog

use crate::error::{Result, SubnetError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single subnet of the database VNet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetInfo {
    /// Cloud-side subnet name
    pub name: String,

    /// Address block, e.g. "10.100.0.0/28"
    pub cidr: String,
}

impl SubnetInfo {
    pub fn new(name: impl Into<String>, cidr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cidr: cidr.into(),
        }
    }
}

/// Ordered, immutable list of candidate subnets
///
/// Order is the allocation preference order and is kept exactly as supplied
/// (typically the order the cloud API lists them in), not sorted by address.
#[derive(Debug, Clone, Default)]
pub struct SubnetCatalog {
    subnets: Vec<SubnetInfo>,
}

impl SubnetCatalog {
    /// Build a catalog, rejecting empty and duplicate CIDRs.
    pub fn new(infos: Vec<SubnetInfo>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(infos.len());

        for info in &infos {
            if info.cidr.is_empty() {
                return Err(SubnetError::EmptyCidr(info.name.clone()));
            }
            if !seen.insert(info.cidr.as_str()) {
                return Err(SubnetError::DuplicateCidr(info.cidr.clone()));
            }
        }

        tracing::debug!("Built subnet catalog with {} entries", infos.len());
        Ok(Self { subnets: infos })
    }

    /// Return the first subnet, in catalog order, whose CIDR is not in `used`.
    ///
    /// Empty strings in `used` are ignored.
    pub fn first_free_subnet(&self, used: &[String]) -> Result<SubnetInfo> {
        if self.subnets.is_empty() {
            return Err(SubnetError::CatalogEmpty);
        }

        let used: HashSet<&str> = used
            .iter()
            .map(String::as_str)
            .filter(|cidr| !cidr.is_empty())
            .collect();

        self.subnets
            .iter()
            .find(|s| !used.contains(s.cidr.as_str()))
            .cloned()
            .ok_or(SubnetError::NoFreeSubnets)
    }

    /// Look up a subnet by its CIDR
    pub fn find_by_cidr(&self, cidr: &str) -> Option<&SubnetInfo> {
        self.subnets.iter().find(|s| s.cidr == cidr)
    }

    /// All subnets, in catalog order
    pub fn all(&self) -> &[SubnetInfo] {
        &self.subnets
    }

    pub fn len(&self) -> usize {
        self.subnets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subnets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CIDR0: &str = "10.100.0.0/28";
    const CIDR16: &str = "10.100.0.16/28";
    const CIDR32: &str = "10.100.0.32/28";

    fn catalog() -> SubnetCatalog {
        SubnetCatalog::new(vec![
            SubnetInfo::new("s1", CIDR0),
            SubnetInfo::new("s2", CIDR16),
            SubnetInfo::new("s3", CIDR32),
        ])
        .unwrap()
    }

    #[test]
    fn test_new_keeps_supplied_order() {
        let catalog = SubnetCatalog::new(vec![
            SubnetInfo::new("s2", CIDR16),
            SubnetInfo::new("s1", CIDR0),
            SubnetInfo::new("s3", CIDR32),
        ])
        .unwrap();

        let names: Vec<&str> = catalog.all().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["s2", "s1", "s3"]);
    }

    #[test]
    fn test_new_rejects_empty_cidr() {
        let err = SubnetCatalog::new(vec![SubnetInfo::new("bad", "")]).unwrap_err();
        assert_eq!(err, SubnetError::EmptyCidr("bad".to_string()));
    }

    #[test]
    fn test_new_rejects_duplicate_cidr() {
        let err = SubnetCatalog::new(vec![
            SubnetInfo::new("s1", CIDR0),
            SubnetInfo::new("s2", CIDR0),
        ])
        .unwrap_err();
        assert_eq!(err, SubnetError::DuplicateCidr(CIDR0.to_string()));
    }

    #[test]
    fn test_first_free_with_nothing_used() {
        let free = catalog().first_free_subnet(&[]).unwrap();
        assert_eq!(free, SubnetInfo::new("s1", CIDR0));
    }

    #[test]
    fn test_first_free_skips_used_and_ignores_empty() {
        let used = vec![String::new(), CIDR0.to_string()];
        let free = catalog().first_free_subnet(&used).unwrap();
        assert_eq!(free.cidr, CIDR16);
    }

    #[test]
    fn test_first_free_follows_catalog_order_not_address_order() {
        let catalog = SubnetCatalog::new(vec![
            SubnetInfo::new("late", CIDR32),
            SubnetInfo::new("early", CIDR0),
        ])
        .unwrap();

        assert_eq!(catalog.first_free_subnet(&[]).unwrap().name, "late");
    }

    #[test]
    fn test_first_free_picks_hole_in_the_middle() {
        let used = vec![CIDR0.to_string(), CIDR32.to_string()];
        assert_eq!(catalog().first_free_subnet(&used).unwrap().cidr, CIDR16);
    }

    #[test]
    fn test_first_free_all_used() {
        let used = vec![CIDR32.to_string(), CIDR0.to_string(), CIDR16.to_string()];
        assert_eq!(
            catalog().first_free_subnet(&used).unwrap_err(),
            SubnetError::NoFreeSubnets
        );
    }

    #[test]
    fn test_first_free_empty_catalog() {
        let catalog = SubnetCatalog::new(Vec::new()).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(
            catalog.first_free_subnet(&[]).unwrap_err(),
            SubnetError::CatalogEmpty
        );
    }

    #[test]
    fn test_used_cidrs_outside_catalog_are_ignored() {
        let used = vec!["192.168.0.0/28".to_string()];
        assert_eq!(catalog().first_free_subnet(&used).unwrap().cidr, CIDR0);
    }

    #[test]
    fn test_find_by_cidr() {
        let catalog = catalog();
        assert_eq!(catalog.find_by_cidr(CIDR16).map(|s| s.name.as_str()), Some("s2"));
        assert!(catalog.find_by_cidr("10.0.0.0/8").is_none());
    }

    #[test]
    fn test_subnet_info_deserializes_from_catalog_file_shape() {
        let info: SubnetInfo =
            serde_json::from_str(r#"{"name":"snet-db-01","cidr":"10.100.1.0/28"}"#).unwrap();
        assert_eq!(info, SubnetInfo::new("snet-db-01", "10.100.1.0/28"));
    }
}
