// acisync-core: Declarative reconciliation of APIC managed objects.
//
// Sits between acisync-api (raw transport) and the CLI. Callers describe
// what should exist as `Declared<K>`; a `Reconciler<K>` makes it so and
// reports back what the controller holds.

pub mod config;
pub mod convert;
pub mod error;
pub mod fetch;
pub mod kinds;
pub mod model;
pub mod reconciler;
pub mod relation;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ControllerConfig, TlsVerification};
pub use error::{CoreError, Operation};
pub use reconciler::Reconciler;
pub use relation::{RelationSync, ReplaceOutcome};

pub use kinds::{
    AttachableEntityProfile, AttachableEntityProfileAttributes, FirmwareGroup,
    FirmwareGroupAttributes, ImportedContract, ImportedContractAttributes,
};
pub use model::{
    Cardinality, Declared, Dn, DnError, FlatAttributes, FlatState, ManagedObject, ObjectStatus,
    ParentScope, RelationSpec, RelationValue, ResourceKind,
};
