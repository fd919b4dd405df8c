use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{field} must be set (flag --{flag})")]
    Missing {
        field: &'static str,
        flag: &'static str,
    },

    #[error("Failed to read subnet catalog file {path}: {source}")]
    CatalogFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid subnet catalog file {path}: {source}")]
    CatalogFormat {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid subnet catalog: {0}")]
    Subnet(#[from] dispg_network::SubnetError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
