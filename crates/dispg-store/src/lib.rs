//! Control-plane object store for dispg
//!
//! - [`ObjectStore`]: get/list/create/patch/delete over typed resources
//! - [`KubeStore`]: the API server implementation
//! - [`InMemoryStore`]: an in-process implementation for tests
//!   (`test-utils` feature)
//! - [`sync_spec_and_labels`]: the drift check shared by every ensure step

pub mod action;
pub mod error;
pub mod kube_store;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod store;
pub mod sync;

pub use action::ActionType;
pub use error::{Result, StoreError};
pub use kube_store::KubeStore;
#[cfg(any(test, feature = "test-utils"))]
pub use memory::{InMemoryStore, StoreOp};
pub use store::{ObjectStore, StoredObject, describe, object_key, spec_and_labels_patch};
pub use sync::sync_spec_and_labels;
