use clap::{Args, Parser, Subcommand};
use dispg_config::OperatorConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dispgd")]
#[command(about = "Provisions Azure PostgreSQL Flexible Servers from Database resources", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Log as JSON lines
    #[arg(long, env = "DISPG_LOG_JSON", global = true)]
    pub log_json: bool,

    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run the operator (default)
    Run,
    /// Provision the application user (run inside the job the operator launches)
    ProvisionUser,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Namespace the operator writes to
    #[arg(long, env = "DISPG_WRITE_NAMESPACE", default_value = "")]
    pub write_namespace: String,

    /// Resource group of the database VNet and servers
    #[arg(long, env = "DISPG_RESOURCE_GROUP", default_value = "")]
    pub resource_group: String,

    /// Resource group of the AKS VNet (defaults to --resource-group)
    #[arg(long, env = "DISPG_AKS_RESOURCE_GROUP", default_value = "")]
    pub aks_resource_group: String,

    #[arg(long, env = "DISPG_DB_VNET_NAME", default_value = "")]
    pub db_vnet_name: String,

    #[arg(long, env = "DISPG_AKS_VNET_NAME", default_value = "")]
    pub aks_vnet_name: String,

    #[arg(long, env = "DISPG_SUBSCRIPTION_ID", default_value = "")]
    pub subscription_id: String,

    #[arg(long, env = "DISPG_TENANT_ID", default_value = "")]
    pub tenant_id: String,

    /// Azure region of the servers (defaults to norwayeast)
    #[arg(long, env = "DISPG_LOCATION", default_value = "")]
    pub location: String,

    /// Image of the user provisioning job
    #[arg(long, env = "DISPG_USER_PROVISION_IMAGE", default_value = "")]
    pub user_provision_image: String,

    /// Target in-cluster fakes instead of Azure
    #[arg(long, env = "DISPG_USE_AZ_FAKES")]
    pub use_az_fakes: bool,

    /// YAML or JSON list of `{name, cidr}`; the database VNet is listed when omitted
    #[arg(long, env = "DISPG_SUBNET_CATALOG_FILE")]
    pub subnet_catalog_file: Option<PathBuf>,
}

impl RunArgs {
    pub fn operator_config(&self) -> dispg_config::Result<OperatorConfig> {
        OperatorConfig {
            write_namespace: self.write_namespace.clone(),
            resource_group: self.resource_group.clone(),
            aks_resource_group: self.aks_resource_group.clone(),
            db_vnet_name: self.db_vnet_name.clone(),
            aks_vnet_name: self.aks_vnet_name.clone(),
            subscription_id: self.subscription_id.clone(),
            tenant_id: self.tenant_id.clone(),
            location: self.location.clone(),
            user_provision_image: self.user_provision_image.clone(),
            use_az_fakes: self.use_az_fakes,
        }
        .validate()
    }
}
