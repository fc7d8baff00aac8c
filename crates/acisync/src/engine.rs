//! Drives the core reconciler for one tracked resource at a time.
//!
//! Every entry point returns the `FlatState` the caller should track
//! afterwards together with the outcome, so a state file can be written
//! even when an operation fails halfway. A tracked state with no `id`
//! means the address should be forgotten.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use acisync_api::Transport;
use acisync_core::{CoreError, Declared, Dn, FlatState, Operation, Reconciler, ResourceKind};

/// What `apply` did to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "changed")]
pub enum Action {
    /// No prior state; the object was created.
    Created,
    /// Tracked, but gone from the controller; created again.
    Recreated,
    /// Name or parent changed; the old object was deleted and a new one created.
    Replaced,
    /// Updated in place.
    Updated(Vec<&'static str>),
    Unchanged,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::Recreated => f.write_str("recreated"),
            Self::Replaced => f.write_str("replaced"),
            Self::Updated(keys) => write!(f, "updated ({})", keys.join(", ")),
            Self::Unchanged => f.write_str("unchanged"),
        }
    }
}

/// State to track plus the outcome of the operation that produced it.
#[derive(Debug)]
pub struct Applied<T> {
    pub state: FlatState,
    pub result: Result<T, CoreError>,
}

impl<T> Applied<T> {
    fn ok(state: FlatState, value: T) -> Self {
        Self {
            state,
            result: Ok(value),
        }
    }

    fn failed(state: FlatState, err: CoreError) -> Self {
        Self {
            state,
            result: Err(err),
        }
    }
}

/// How the desired declaration relates to a live prior object.
#[derive(Debug, PartialEq, Eq)]
enum Plan {
    Keep,
    Update(Vec<&'static str>),
    Replace,
}

fn plan<K: ResourceKind>(prior: &Declared<K>, desired: &Declared<K>) -> Result<Plan, CoreError> {
    let target = desired.target_dn(Operation::Update)?;
    if prior.id.as_ref() != Some(&target) {
        return Ok(Plan::Replace);
    }
    let drift = desired.drift(prior);
    Ok(if drift.is_empty() {
        Plan::Keep
    } else {
        Plan::Update(drift)
    })
}

/// Bring the object behind `prior` (if any) in line with `desired`.
pub async fn apply_resource<K: ResourceKind>(
    transport: Arc<dyn Transport>,
    prior: Option<FlatState>,
    desired: FlatState,
) -> Applied<Action> {
    let reconciler = Reconciler::<K>::new(transport);
    let untouched = prior.clone().unwrap_or_default();

    let mut desired = match Declared::<K>::from_flat(desired) {
        Ok(declared) => declared,
        Err(e) => return Applied::failed(untouched, e),
    };
    desired.id = None;

    let Some(prior) = prior else {
        return create(&reconciler, desired, Action::Created).await;
    };
    let mut prior = match Declared::<K>::from_flat(prior) {
        Ok(declared) => declared,
        Err(e) => return Applied::failed(untouched, e),
    };

    if let Err(e) = reconciler.read(&mut prior).await {
        return Applied::failed(untouched, e);
    }
    if prior.id.is_none() {
        info!(kind = K::KIND, name = %desired.name, "tracked object is gone; recreating");
        return create(&reconciler, desired, Action::Recreated).await;
    }

    match plan(&prior, &desired) {
        Err(e) => Applied::failed(prior.to_flat(), e),
        Ok(Plan::Keep) => Applied::ok(prior.to_flat(), Action::Unchanged),
        Ok(Plan::Replace) => {
            debug!(kind = K::KIND, from = ?prior.id, "identity changed; replacing");
            if let Err(e) = reconciler.delete(&mut prior).await {
                return Applied::failed(prior.to_flat(), e);
            }
            create(&reconciler, desired, Action::Replaced).await
        }
        Ok(Plan::Update(changed)) => {
            let mut state = desired;
            match reconciler.update(&prior, &mut state).await {
                Ok(()) => Applied::ok(state.to_flat(), Action::Updated(changed)),
                Err(e) if e.is_partial() => Applied::failed(state.to_flat(), e),
                Err(e) => Applied::failed(prior.to_flat(), e),
            }
        }
    }
}

async fn create<K: ResourceKind>(
    reconciler: &Reconciler<K>,
    mut desired: Declared<K>,
    action: Action,
) -> Applied<Action> {
    match reconciler.create(&mut desired).await {
        Ok(()) => Applied::ok(desired.to_flat(), action),
        Err(e) => Applied::failed(desired.to_flat(), e),
    }
}

/// Re-read a tracked object. `Ok(false)` means it is gone.
pub async fn refresh_resource<K: ResourceKind>(
    transport: Arc<dyn Transport>,
    tracked: FlatState,
) -> Applied<bool> {
    let untouched = tracked.clone();
    let mut state = match Declared::<K>::from_flat(tracked) {
        Ok(declared) => declared,
        Err(e) => return Applied::failed(untouched, e),
    };
    match Reconciler::<K>::new(transport).read(&mut state).await {
        Ok(()) => {
            let present = state.id.is_some();
            Applied::ok(state.to_flat(), present)
        }
        Err(e) => Applied::failed(untouched, e),
    }
}

/// Delete a tracked object from the controller.
pub async fn destroy_resource<K: ResourceKind>(
    transport: Arc<dyn Transport>,
    tracked: FlatState,
) -> Applied<()> {
    let untouched = tracked.clone();
    let mut state = match Declared::<K>::from_flat(tracked) {
        Ok(declared) => declared,
        Err(e) => return Applied::failed(untouched, e),
    };
    match Reconciler::<K>::new(transport).delete(&mut state).await {
        Ok(()) => Applied::ok(state.to_flat(), ()),
        Err(e) => Applied::failed(untouched, e),
    }
}

/// Adopt an existing object by DN.
pub async fn import_resource<K: ResourceKind>(
    transport: Arc<dyn Transport>,
    dn: &str,
) -> Result<FlatState, CoreError> {
    let state = Reconciler::<K>::new(transport).import(dn).await?;
    Ok(state.to_flat())
}

/// Fetch an object by name without tracking it.
pub async fn lookup_resource<K: ResourceKind>(
    transport: Arc<dyn Transport>,
    name: &str,
    parent: Option<&str>,
) -> Result<FlatState, CoreError> {
    let parent = parent
        .map(Dn::new)
        .transpose()
        .map_err(|e| CoreError::Validation {
            field: K::PARENT.key().unwrap_or("parent").into(),
            reason: e.to_string(),
        })?;
    let state = Reconciler::<K>::new(transport).lookup(name, parent).await?;
    Ok(state.to_flat())
}
