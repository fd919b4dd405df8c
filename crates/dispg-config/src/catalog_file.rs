//! Subnet catalog file
//!
//! A YAML (or JSON) list of `{name, cidr}` entries, in allocation order:
//!
//! ```yaml
//! - name: snet-db-01
//!   cidr: 10.100.1.0/28
//! - name: snet-db-02
//!   cidr: 10.100.1.16/28
//! ```

use crate::error::{ConfigError, Result};
use dispg_network::{SubnetCatalog, SubnetInfo};
use std::path::Path;
use tracing::info;

/// Parse catalog file contents
pub fn parse_subnet_catalog(contents: &str, path: &str) -> Result<SubnetCatalog> {
    let infos: Vec<SubnetInfo> =
        serde_yaml::from_str(contents).map_err(|source| ConfigError::CatalogFormat {
            path: path.to_string(),
            source,
        })?;
    Ok(SubnetCatalog::new(infos)?)
}

/// Load the subnet catalog from a file
pub fn load_subnet_catalog(path: &Path) -> Result<SubnetCatalog> {
    let shown = path.display().to_string();
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::CatalogFile {
        path: shown.clone(),
        source,
    })?;

    let catalog = parse_subnet_catalog(&contents, &shown)?;
    info!(path = %shown, subnets = catalog.len(), "loaded subnet catalog");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_yaml_catalog_keeps_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "- name: s2\n  cidr: 10.100.1.16/28\n- name: s1\n  cidr: 10.100.1.0/28"
        )
        .unwrap();

        let catalog = load_subnet_catalog(file.path()).unwrap();
        let names: Vec<&str> = catalog.all().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["s2", "s1"]);
    }

    #[test]
    fn test_parse_json_catalog() {
        let catalog =
            parse_subnet_catalog(r#"[{"name": "s1", "cidr": "10.100.1.0/28"}]"#, "inline").unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_duplicate_cidr_is_rejected() {
        let err = parse_subnet_catalog(
            "- {name: a, cidr: 10.100.1.0/28}\n- {name: b, cidr: 10.100.1.0/28}",
            "inline",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Subnet(_)));
    }

    #[test]
    fn test_malformed_file_is_rejected() {
        let err = parse_subnet_catalog("name: not-a-list", "inline").unwrap_err();
        assert!(matches!(err, ConfigError::CatalogFormat { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = load_subnet_catalog(Path::new("/nonexistent/catalog.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::CatalogFile { .. }));
    }
}
