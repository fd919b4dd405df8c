//! Database reconciliation
//!
//! Each tick derives the state of a Database from the store, performs the
//! first step that still has work to do, and returns. The next tick (a watch
//! event, or the requeue returned here) continues from there:
//!
//! 1. subnet allocation
//! 2. private DNS zone
//! 3. VNet links
//! 4. Entra administrator grant
//! 5. Flexible Server
//! 6. extension parameters
//! 7. user provisioning job

use crate::admin::ensure_administrator;
use crate::configuration::ensure_configurations;
use crate::dns::{ensure_private_dns_zone, ensure_vnet_links};
use crate::ensure::database_namespace;
use crate::error::{ReconcileError, Result};
use crate::identity::{Resolution, resolve_admin_identity, resolve_user_identity};
use crate::server::ensure_server;
use crate::user_job::ensure_user_provisioning_job;
use dispg_api::{CONDITION_FALSE, Condition, Database, set_condition};
use dispg_config::OperatorConfig;
use dispg_network::{SubnetCatalog, SubnetError};
use dispg_store::{ActionType, ObjectStore};
use kube::{Resource, ResourceExt};
use kube::runtime::controller::Action;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

pub const REQUEUE_AFTER_WRITE: Duration = Duration::from_secs(5);
pub const REQUEUE_NO_FREE_SUBNETS: Duration = Duration::from_secs(300);
pub const REQUEUE_NOT_READY: Duration = Duration::from_secs(30);
pub const REQUEUE_CONVERGED: Duration = Duration::from_secs(600);
pub const REQUEUE_TERMINAL_ERROR: Duration = Duration::from_secs(300);
pub const REQUEUE_TRANSIENT_ERROR: Duration = Duration::from_secs(15);

const READY_CONDITION: &str = "Ready";
const NO_FREE_SUBNETS_REASON: &str = "NoFreeSubnets";
const NO_FREE_SUBNETS_MESSAGE: &str = "No free subnet CIDRs available in the configured catalog";

/// The ordered steps of a reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Subnet,
    DnsZone,
    VnetLinks,
    Administrator,
    Server,
    Configuration,
    UserProvisioning,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Step::Subnet => "subnet",
            Step::DnsZone => "dns-zone",
            Step::VnetLinks => "vnet-links",
            Step::Administrator => "administrator",
            Step::Server => "server",
            Step::Configuration => "configuration",
            Step::UserProvisioning => "user-provisioning",
        };
        write!(f, "{name}")
    }
}

/// What one tick achieved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// The Database is gone or being deleted
    Deleted,
    /// A subnet is now recorded in the Database status
    SubnetAllocated(String),
    /// Every catalog subnet is taken
    NoFreeSubnets,
    /// A step wrote to the store
    Step { step: Step, action: ActionType },
    /// A step is waiting for something outside this operator
    NotReady { step: Step, reason: String },
    /// Every step was a no-op
    Converged,
}

impl Progress {
    /// When the controller should look at the Database again
    pub fn requeue(&self) -> Action {
        match self {
            Progress::Deleted => Action::await_change(),
            Progress::SubnetAllocated(_) | Progress::Step { .. } => {
                Action::requeue(REQUEUE_AFTER_WRITE)
            }
            Progress::NoFreeSubnets => Action::requeue(REQUEUE_NO_FREE_SUBNETS),
            Progress::NotReady { .. } => Action::requeue(REQUEUE_NOT_READY),
            Progress::Converged => Action::requeue(REQUEUE_CONVERGED),
        }
    }
}

fn wrote(step: Step, action: ActionType) -> Option<Progress> {
    action.is_write().then_some(Progress::Step { step, action })
}

/// Reconciles `Database` objects against an [`ObjectStore`]
pub struct DatabaseReconciler<S> {
    store: S,
    catalog: Arc<SubnetCatalog>,
    config: Arc<OperatorConfig>,
    /// Serialises "list used subnets, then record ours" across all Databases
    allocation: Mutex<()>,
}

impl<S: ObjectStore> DatabaseReconciler<S> {
    pub fn new(store: S, catalog: Arc<SubnetCatalog>, config: Arc<OperatorConfig>) -> Self {
        Self {
            store,
            catalog,
            config,
            allocation: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one tick for `db`
    pub async fn reconcile_database(&self, db: &Database) -> Result<Progress> {
        if db.meta().deletion_timestamp.is_some() {
            debug!("Database is being deleted");
            return Ok(Progress::Deleted);
        }

        let Some(cidr) = db.subnet_cidr() else {
            return self.allocate_subnet(db).await;
        };

        let store = &self.store;
        let config = self.config.as_ref();

        if let Some(progress) = wrote(
            Step::DnsZone,
            ensure_private_dns_zone(store, db, config).await?,
        ) {
            return Ok(progress);
        }

        if let Some(progress) = wrote(Step::VnetLinks, ensure_vnet_links(store, db, config).await?) {
            return Ok(progress);
        }

        let admin = match resolve_admin_identity(store, db).await? {
            Resolution::Ready(admin) => admin,
            Resolution::NotReady(reason) => {
                warn!(%reason, "Admin identity not ready");
                return Ok(Progress::NotReady {
                    step: Step::Administrator,
                    reason,
                });
            }
        };

        if let Some(progress) = wrote(
            Step::Administrator,
            ensure_administrator(store, db, config, &admin).await?,
        ) {
            return Ok(progress);
        }

        if let Some(progress) = wrote(
            Step::Server,
            ensure_server(store, db, config, &self.catalog, cidr).await?,
        ) {
            return Ok(progress);
        }

        if let Some(progress) = wrote(Step::Configuration, ensure_configurations(store, db).await?) {
            return Ok(progress);
        }

        let user = match resolve_user_identity(store, db).await? {
            Resolution::Ready(user) => user,
            Resolution::NotReady(reason) => {
                warn!(%reason, "User identity not ready");
                return Ok(Progress::NotReady {
                    step: Step::UserProvisioning,
                    reason,
                });
            }
        };

        if let Some(progress) = wrote(
            Step::UserProvisioning,
            ensure_user_provisioning_job(store, db, config, &admin, &user).await?,
        ) {
            return Ok(progress);
        }

        debug!("Database converged");
        Ok(Progress::Converged)
    }

    /// Pick the first catalog subnet no other Database holds and record it.
    ///
    /// The allocation lock spans reading every Database and writing our own
    /// status, so two Databases never compute the same used set.
    async fn allocate_subnet(&self, db: &Database) -> Result<Progress> {
        let _guard = self.allocation.lock().await;

        let namespace = database_namespace(db)?;
        let name = db.name_any();

        // The cached copy may predate an allocation made by an earlier tick
        let Some(mut latest) = self.store.get::<Database>(&namespace, &name).await? else {
            debug!("Database no longer exists");
            return Ok(Progress::Deleted);
        };
        if let Some(cidr) = latest.subnet_cidr() {
            debug!(%cidr, "Subnet already allocated");
            return Ok(Progress::SubnetAllocated(cidr.to_string()));
        }

        let used: Vec<String> = self
            .store
            .list::<Database>(None, &BTreeMap::new())
            .await?
            .iter()
            .filter(|other| {
                !(other.namespace().as_deref() == Some(namespace.as_str()) && other.name_any() == name)
            })
            .filter_map(|other| other.subnet_cidr().map(str::to_string))
            .collect();

        let status = latest.status.get_or_insert_with(Default::default);
        match self.catalog.first_free_subnet(&used) {
            Ok(subnet) => {
                status.subnet_cidr = Some(subnet.cidr.clone());
                status.conditions.retain(|c| {
                    !(c.r#type == READY_CONDITION
                        && c.reason.as_deref() == Some(NO_FREE_SUBNETS_REASON))
                });
                self.store.update_status(&latest).await?;

                info!(cidr = %subnet.cidr, subnet = %subnet.name, "Allocated subnet");
                Ok(Progress::SubnetAllocated(subnet.cidr))
            }
            Err(SubnetError::NoFreeSubnets) => {
                let before = status.conditions.clone();
                set_condition(
                    &mut status.conditions,
                    Condition {
                        r#type: READY_CONDITION.to_string(),
                        status: CONDITION_FALSE.to_string(),
                        reason: Some(NO_FREE_SUBNETS_REASON.to_string()),
                        message: Some(NO_FREE_SUBNETS_MESSAGE.to_string()),
                        last_transition_time: None,
                    },
                );
                if status.conditions != before {
                    self.store.update_status(&latest).await?;
                }

                warn!(used = used.len(), "No free subnets in the catalog");
                Ok(Progress::NoFreeSubnets)
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Controller entry point
#[instrument(skip_all, fields(namespace = %db.namespace().unwrap_or_default(), name = %db.name_any()))]
pub async fn reconcile<S: ObjectStore>(
    db: Arc<Database>,
    ctx: Arc<DatabaseReconciler<S>>,
) -> Result<Action> {
    let progress = ctx.reconcile_database(&db).await?;
    match &progress {
        Progress::Step { step, action } => info!(%step, %action, "Reconcile step completed"),
        Progress::NotReady { step, reason } => debug!(%step, %reason, "Waiting"),
        other => debug!(progress = ?other, "Reconcile finished"),
    }
    Ok(progress.requeue())
}

/// Requeue policy for failed ticks
///
/// Invalid specs are retried slowly since only an edit can fix them; every
/// other error is retried soon.
pub fn error_policy<S: ObjectStore>(
    db: Arc<Database>,
    err: &ReconcileError,
    _ctx: Arc<DatabaseReconciler<S>>,
) -> Action {
    let namespace = db.namespace().unwrap_or_default();
    let name = db.name_any();

    if err.is_terminal() {
        warn!(%namespace, %name, error = %err, "Database spec is invalid, waiting for it to change");
        Action::requeue(REQUEUE_TERMINAL_ERROR)
    } else {
        error!(%namespace, %name, error = %err, "Reconciliation failed");
        Action::requeue(REQUEUE_TRANSIENT_ERROR)
    }
}
