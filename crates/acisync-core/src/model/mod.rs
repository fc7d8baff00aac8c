// Domain model: identities, kind descriptions, wire objects, declared state.

pub mod declared;
pub mod dn;
pub mod kind;
pub mod object;

pub use declared::{Declared, FlatAttributes, FlatState, RelationValue};
pub use dn::{Dn, DnError};
pub use kind::{Cardinality, Field, ParentScope, RelationRn, RelationSpec, ResourceKind};
pub use object::{ManagedObject, ObjectStatus};
