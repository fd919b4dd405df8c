//! User provisioning task for dispg
//!
//! Runs inside the job launched by the operator for each Database: connects
//! to the server as the admin identity and makes sure the application user
//! exists, can connect, and owns a schema named after the database.

pub mod error;
pub mod executor;
pub mod provision;
pub mod settings;
pub mod sql;

pub use error::{ProvisionError, Result};
pub use executor::{PgExecutor, SqlExecutor};
pub use provision::{UserGrant, ensure_user, run};
pub use settings::ProvisionSettings;
