//! Controller wiring for `dispgd run`

use crate::cli::RunArgs;
use anyhow::Context;
use dispg_api::{
    ApplicationIdentity, Database, FlexibleServer, FlexibleServersAdministrator,
    FlexibleServersConfiguration, PrivateDnsZone, PrivateDnsZonesVirtualNetworkLink,
};
use dispg_azure::{SubnetsClient, WorkloadIdentityCredential};
use dispg_config::{OperatorConfig, load_subnet_catalog};
use dispg_controller::naming::USER_PROVISION_LABEL;
use dispg_controller::{DatabaseReconciler, databases_referencing_identity, error_policy, reconcile};
use dispg_network::SubnetCatalog;
use dispg_store::KubeStore;
use futures_util::StreamExt;
use k8s_openapi::api::batch::v1::Job;
use kube::runtime::controller::{self, Controller};
use kube::runtime::watcher;
use kube::{Api, Client};
use std::sync::Arc;
use tracing::{info, warn};

/// Load the subnet catalog from `--subnet-catalog-file`, or list the
/// database VNet through ARM when no file is given
async fn load_catalog(args: &RunArgs, config: &OperatorConfig) -> anyhow::Result<SubnetCatalog> {
    if let Some(path) = &args.subnet_catalog_file {
        info!(path = %path.display(), "Loading subnet catalog from file");
        return Ok(load_subnet_catalog(path)?);
    }

    if config.use_az_fakes {
        warn!("Fakes are enabled but no catalog file was given, listing subnets through ARM");
    }
    let credential = WorkloadIdentityCredential::from_env()
        .context("Azure credentials are required to list database subnets")?;
    let client = SubnetsClient::new(Arc::new(credential));
    let catalog = client
        .fetch_subnet_catalog(
            &config.subscription_id,
            &config.resource_group,
            &config.db_vnet_name,
        )
        .await
        .with_context(|| format!("Failed to list subnets of VNet {}", config.db_vnet_name))?;
    Ok(catalog)
}

/// Run the Database controller until SIGTERM or ctrl-c
pub async fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = args.operator_config()?;
    let catalog = load_catalog(&args, &config).await?;
    if catalog.is_empty() {
        warn!("Subnet catalog is empty, no database can be placed");
    }
    info!(
        write_namespace = %config.write_namespace,
        resource_group = %config.resource_group,
        location = %config.location,
        subnets = catalog.len(),
        "Starting dispg operator"
    );

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;
    let ctx = Arc::new(DatabaseReconciler::new(
        KubeStore::new(client.clone()),
        Arc::new(catalog),
        Arc::new(config),
    ));

    let jobs = watcher::Config::default().labels(&format!("{USER_PROVISION_LABEL}=true"));
    let controller = Controller::new(Api::<Database>::all(client.clone()), watcher::Config::default());
    let databases = controller.store();

    controller
        .owns(Api::<PrivateDnsZone>::all(client.clone()), watcher::Config::default())
        .owns(
            Api::<PrivateDnsZonesVirtualNetworkLink>::all(client.clone()),
            watcher::Config::default(),
        )
        .owns(
            Api::<FlexibleServersAdministrator>::all(client.clone()),
            watcher::Config::default(),
        )
        .owns(Api::<FlexibleServer>::all(client.clone()), watcher::Config::default())
        .owns(
            Api::<FlexibleServersConfiguration>::all(client.clone()),
            watcher::Config::default(),
        )
        .owns(Api::<Job>::all(client.clone()), jobs)
        .watches(
            Api::<ApplicationIdentity>::all(client),
            watcher::Config::default(),
            move |identity| {
                let state = databases.state();
                databases_referencing_identity(state.iter().map(|db| db.as_ref()), &identity)
            },
        )
        // Subnet allocation must not race across Databases
        .with_config(controller::Config::default().concurrency(1))
        .shutdown_on_signal()
        .run(reconcile::<KubeStore>, error_policy::<KubeStore>, ctx)
        .for_each(|result| async move {
            match result {
                Ok((object, _)) => info!(database = %object, "Reconciled"),
                Err(err) => warn!(error = %err, "Controller event failed"),
            }
        })
        .await;

    info!("dispg operator stopped");
    Ok(())
}
