// ── Remote fetch ──
//
// Point lookup by DN. The transport answers an unknown DN with an empty
// container; this is where that becomes a `NotFound`.

use acisync_api::Transport;
use tracing::trace;

use crate::error::{CoreError, Operation};
use crate::model::dn::Dn;
use crate::model::kind::ResourceKind;
use crate::model::object::ManagedObject;

/// Fetch the object at `dn`, failing with `NotFound` when it does not exist.
pub async fn fetch_by_dn<K: ResourceKind>(
    transport: &dyn Transport,
    dn: &Dn,
    operation: Operation,
) -> Result<ManagedObject<K>, CoreError> {
    let not_found = || CoreError::NotFound {
        operation,
        class: K::CLASS,
        dn: dn.to_string(),
    };

    let container = match transport.get(dn.as_str()).await {
        Ok(container) => container,
        Err(e) if e.is_not_found() => return Err(not_found()),
        Err(e) => return Err(CoreError::transport(operation, dn.as_str(), e)),
    };

    let obj = ManagedObject::<K>::from_container(&container);
    trace!(dn = %dn, found = obj.exists(), "fetched {}", K::CLASS);
    if obj.exists() {
        Ok(obj)
    } else {
        Err(not_found())
    }
}
