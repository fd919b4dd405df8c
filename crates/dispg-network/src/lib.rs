//! Subnet catalog for dispg
//!
//! The database VNet is carved into a fixed set of small subnets ahead of
//! time. This crate holds that set in memory and answers "which block is
//! still free" for the reconciler.
//!
//! The catalog is loaded once at startup and never mutated afterwards, so a
//! single `Arc<SubnetCatalog>` can be shared by every reconciliation.
//! Which database owns which block is not tracked here: callers pass the
//! used CIDRs (read from `Database.status.subnetCIDR`) on every query.
//!
//! # Example
//!
//! ```
//! use dispg_network::{SubnetCatalog, SubnetInfo};
//!
//! let catalog = SubnetCatalog::new(vec![
//!     SubnetInfo::new("s1", "10.100.1.0/28"),
//!     SubnetInfo::new("s2", "10.100.1.16/28"),
//! ])?;
//!
//! let free = catalog.first_free_subnet(&["10.100.1.0/28".to_string()])?;
//! assert_eq!(free.cidr, "10.100.1.16/28");
//! # Ok::<(), dispg_network::SubnetError>(())
//! ```

pub mod catalog;
pub mod error;

pub use catalog::{SubnetCatalog, SubnetInfo};
pub use error::{Result, SubnetError};
