//! Curated PostgreSQL extensions

use crate::error::{ReconcileError, Result};
use std::collections::BTreeSet;

const ALLOWED_EXTENSIONS: [&str; 5] = ["hstore", "pg_cron", "pg_stat_statements", "pgaudit", "uuid-ossp"];

/// Extensions that only work when loaded through `shared_preload_libraries`
const PRELOAD_EXTENSIONS: [&str; 3] = ["pg_cron", "pg_stat_statements", "pgaudit"];

/// Values for the `azure.extensions` and `shared_preload_libraries` parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSettings {
    pub extensions: String,
    pub preload_libraries: String,
}

/// Validate the requested extensions and derive both parameter values.
///
/// Values are deduplicated, sorted and comma-joined.
pub fn resolve_extension_settings(requested: &[String]) -> Result<ExtensionSettings> {
    let mut enabled = BTreeSet::new();
    let mut preload = BTreeSet::new();

    for raw in requested {
        let name = raw.trim();
        if name.is_empty() {
            return Err(ReconcileError::validation("extension value must not be empty"));
        }
        if !ALLOWED_EXTENSIONS.contains(&name) {
            return Err(ReconcileError::validation(format!("unsupported extension {name:?}")));
        }

        enabled.insert(name);
        if PRELOAD_EXTENSIONS.contains(&name) {
            preload.insert(name);
        }
    }

    Ok(ExtensionSettings {
        extensions: enabled.into_iter().collect::<Vec<_>>().join(","),
        preload_libraries: preload.into_iter().collect::<Vec<_>>().join(","),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_sorted_deduplicated_values() {
        let settings =
            resolve_extension_settings(&names(&["pgaudit", "hstore", "pg_cron", "hstore"])).unwrap();

        assert_eq!(settings.extensions, "hstore,pg_cron,pgaudit");
        assert_eq!(settings.preload_libraries, "pg_cron,pgaudit");
    }

    #[test]
    fn test_no_preload_needed() {
        let settings = resolve_extension_settings(&names(&["uuid-ossp"])).unwrap();
        assert_eq!(settings.extensions, "uuid-ossp");
        assert_eq!(settings.preload_libraries, "");
    }

    #[test]
    fn test_empty_list_clears_values() {
        let settings = resolve_extension_settings(&[]).unwrap();
        assert_eq!(settings.extensions, "");
    }

    #[test]
    fn test_unknown_or_wrong_case_rejected() {
        for bad in ["postgis", "PG_CRON"] {
            let err = resolve_extension_settings(&names(&[bad])).unwrap_err();
            assert!(err.is_terminal());
            assert!(err.to_string().contains("unsupported extension"));
        }
    }

    #[test]
    fn test_empty_entry_rejected() {
        let err = resolve_extension_settings(&names(&["  "])).unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }
}
