//! Server profiles by `serverType`

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub sku_name: &'static str,
    pub sku_tier: &'static str,
    pub backup_retention_days: i32,
}

const DEV_PROFILE: Profile = Profile {
    sku_name: "Standard_B1ms",
    sku_tier: "Burstable",
    backup_retention_days: 14,
};

const PROD_PROFILE: Profile = Profile {
    sku_name: "Standard_D4s_v3",
    sku_tier: "GeneralPurpose",
    backup_retention_days: 30,
};

pub fn profile_for(server_type: &str) -> Profile {
    match server_type {
        "prod" | "production" => PROD_PROFILE,
        _ => DEV_PROFILE,
    }
}

/// Explicit retention if given, else the profile default
pub fn resolve_backup_retention_days(server_type: &str, requested: Option<i32>) -> i32 {
    requested.unwrap_or_else(|| profile_for(server_type).backup_retention_days)
}
