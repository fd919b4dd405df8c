//! Configuration for the dispg operator

pub mod catalog_file;
pub mod error;
pub mod operator;

pub use catalog_file::{load_subnet_catalog, parse_subnet_catalog};
pub use error::*;
pub use operator::{DEFAULT_LOCATION, OperatorConfig};
