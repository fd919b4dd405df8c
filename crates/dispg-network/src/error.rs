//! Subnet catalog error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubnetError {
    #[error("subnet {0:?} has empty CIDR")]
    EmptyCidr(String),

    #[error("duplicate subnet CIDR {0:?}")]
    DuplicateCidr(String),

    #[error("subnet catalog is empty")]
    CatalogEmpty,

    #[error("no free subnets available")]
    NoFreeSubnets,

    #[error("subnet CIDR {0:?} is not in the catalog")]
    UnknownCidr(String),
}

pub type Result<T> = std::result::Result<T, SubnetError>;
