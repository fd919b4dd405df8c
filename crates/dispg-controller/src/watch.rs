//! Mapping `ApplicationIdentity` changes to the Databases that use them

use dispg_api::{ApplicationIdentity, Database};
use kube::ResourceExt;
use kube::runtime::reflector::ObjectRef;

/// Databases in the identity's namespace whose admin or user source
/// references it by name
pub fn databases_referencing_identity<'a>(
    databases: impl IntoIterator<Item = &'a Database>,
    identity: &ApplicationIdentity,
) -> Vec<ObjectRef<Database>> {
    let namespace = identity.namespace();
    let name = identity.name_any();

    databases
        .into_iter()
        .filter(|db| db.namespace() == namespace && db.references_identity(&name))
        .map(ObjectRef::from_obj)
        .collect()
}
