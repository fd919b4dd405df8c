//! One-shot job that provisions the application user in PostgreSQL
//!
//! The job name carries a hash of every input the job depends on. When an
//! input changes, the job under the old name is superseded: deleted and
//! replaced by one under the new name.

use crate::ensure::database_namespace;
use crate::error::{ReconcileError, Result};
use crate::identity::{ResolvedAdminIdentity, ResolvedIdentity};
use crate::naming::{MAX_NAME_LEN, bounded_name, short_hash, user_provision_labels};
use dispg_api::Database;
use dispg_config::OperatorConfig;
use dispg_store::{ActionType, ObjectStore, StoreError};
use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{Container, EnvVar, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::{Resource, ResourceExt};
use tracing::{debug, info};

const WORKLOAD_IDENTITY_LABEL: &str = "azure.workload.identity/use";
const CONTAINER_NAME: &str = "provision-user";
const TTL_SECONDS_AFTER_FINISHED: i32 = 300;

const FAKE_POSTGRES_IMAGE: &str = "postgres:16";
const FAKE_POSTGRES_WAIT: &str =
    "until pg_isready -h postgres.default.svc -p 5432; do sleep 2; done";

/// Deterministic job name for this combination of identities
pub fn job_name(db: &Database, admin: &ResolvedAdminIdentity, user: &ResolvedIdentity) -> String {
    let db_name = db.name_any();
    let payload = format!(
        "adminSA={};admin={};user={};userPID={};db={}",
        admin.service_account_name, admin.identity.name, user.name, user.principal_id, db_name
    );
    bounded_name(&format!("{db_name}-user-provision"), &short_hash(&payload), MAX_NAME_LEN)
}

fn env(name: &str, value: impl Into<String>) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: Some(value.into()),
        ..Default::default()
    }
}

fn validate_inputs(admin: &ResolvedAdminIdentity, user: &ResolvedIdentity) -> Result<()> {
    if admin.service_account_name.trim().is_empty() {
        return Err(ReconcileError::validation(
            "admin service account name is empty",
        ));
    }
    if user.name.trim().is_empty() {
        return Err(ReconcileError::validation("user identity name is empty"));
    }
    if user.principal_id.trim().is_empty() {
        return Err(ReconcileError::validation("user principal ID is empty"));
    }
    Ok(())
}

/// Build the provisioning job named `name`
pub fn build_job(
    db: &Database,
    config: &OperatorConfig,
    admin: &ResolvedAdminIdentity,
    user: &ResolvedIdentity,
    name: &str,
) -> Result<Job> {
    let image = config.require_user_provision_image()?;
    let namespace = database_namespace(db)?;
    let owner = db.controller_owner_ref(&()).ok_or_else(|| {
        StoreError::MissingMetadata(format!("Database {namespace}/{} has no uid", db.name_any()))
    })?;
    let db_name = db.name_any();

    let mut env_vars = vec![
        env("DISPG_USER_APP_IDENTITY", user.name.as_str()),
        env("DISPG_USER_APP_PRINCIPAL_ID", user.principal_id.as_str()),
        env("DISPG_ADMIN_APP_IDENTITY", admin.identity.name.as_str()),
        env("DISPG_DATABASE_NAME", db_name.as_str()),
        env("DISPG_DB_SCHEMA", db_name.as_str()),
    ];

    let mut init_containers = None;
    if config.use_az_fakes {
        env_vars.push(env("DISPG_DISABLE_AAD", "1"));
        init_containers = Some(vec![Container {
            name: "wait-for-postgres".to_string(),
            image: Some(FAKE_POSTGRES_IMAGE.to_string()),
            command: Some(vec![
                "sh".to_string(),
                "-c".to_string(),
                FAKE_POSTGRES_WAIT.to_string(),
            ]),
            ..Default::default()
        }]);
    }

    let labels = user_provision_labels(db);
    let mut pod_labels = labels.clone();
    pod_labels.insert(WORKLOAD_IDENTITY_LABEL.to_string(), "true".to_string());

    Ok(Job {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace),
            labels: Some(labels),
            owner_references: Some(vec![owner]),
            ..Default::default()
        },
        spec: Some(JobSpec {
            ttl_seconds_after_finished: Some(TTL_SECONDS_AFTER_FINISHED),
            parallelism: Some(1),
            completions: Some(1),
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(pod_labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    service_account_name: Some(admin.service_account_name.clone()),
                    restart_policy: Some("OnFailure".to_string()),
                    init_containers,
                    containers: vec![Container {
                        name: CONTAINER_NAME.to_string(),
                        image: Some(image.to_string()),
                        args: Some(vec!["provision-user".to_string()]),
                        env: Some(env_vars),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// Delete superseded provisioning jobs and launch the current one.
///
/// Reports `Create` when the current job was launched, otherwise `Delete`
/// when only stale jobs were removed.
pub async fn ensure_user_provisioning_job<S: ObjectStore>(
    store: &S,
    db: &Database,
    config: &OperatorConfig,
    admin: &ResolvedAdminIdentity,
    user: &ResolvedIdentity,
) -> Result<ActionType> {
    validate_inputs(admin, user)?;

    let namespace = database_namespace(db)?;
    let name = job_name(db, admin, user);

    let jobs = store
        .list::<Job>(Some(&namespace), &user_provision_labels(db))
        .await?;

    let mut current_exists = false;
    let mut deleted = false;
    for job in jobs {
        let existing = job.name_any();
        if existing == name {
            current_exists = true;
            continue;
        }

        match store.delete::<Job>(&namespace, &existing).await {
            Ok(()) => {
                info!(%namespace, job = %existing, "Deleted superseded user provisioning job");
                deleted = true;
            }
            Err(err) if err.is_not_found() => {
                debug!(%namespace, job = %existing, "Superseded job already gone");
            }
            Err(err) => return Err(err.into()),
        }
    }

    if current_exists {
        debug!(%namespace, job = %name, "User provisioning job already exists");
        return Ok(if deleted { ActionType::Delete } else { ActionType::NoOp });
    }

    let job = build_job(db, config, admin, user, &name)?;
    match store.create(&job).await {
        Ok(_) => {
            info!(%namespace, job = %name, "Created user provisioning job");
            Ok(ActionType::Create)
        }
        Err(err) if err.is_already_exists() => {
            debug!(%namespace, job = %name, "User provisioning job already exists");
            Ok(if deleted { ActionType::Delete } else { ActionType::NoOp })
        }
        Err(err) => Err(err.into()),
    }
}
