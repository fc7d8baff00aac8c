// ── Lifecycle reconciler ──
//
// Drives one kind's declared state against the controller: create, read,
// update, delete, import and lookup. Every mutating path finishes with a
// read so the caller's state reflects what the controller actually holds.
// The transport is shared; the reconciler itself is stateless.

use std::collections::BTreeSet;
use std::marker::PhantomData;
use std::sync::Arc;

use acisync_api::Transport;
use tracing::{debug, warn};

use crate::error::{CoreError, Operation};
use crate::fetch::fetch_by_dn;
use crate::model::declared::Declared;
use crate::model::dn::Dn;
use crate::model::kind::ResourceKind;
use crate::model::object::ObjectStatus;
use crate::relation::{RelationSync, ReplaceOutcome};

/// How a refresh treats a missing object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Missing {
    /// Clear the identity and succeed.
    Forget,
    /// Propagate `NotFound`.
    Fail,
}

/// Reconciles declared state of kind `K`.
pub struct Reconciler<K: ResourceKind> {
    transport: Arc<dyn Transport>,
    kind: PhantomData<K>,
}

impl<K: ResourceKind> Clone for Reconciler<K> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            kind: PhantomData,
        }
    }
}

impl<K: ResourceKind> Reconciler<K> {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            kind: PhantomData,
        }
    }

    /// Save the declared object, attach declared relations, then refresh.
    ///
    /// The identity is committed to `state` as soon as the save succeeds,
    /// so a relation failure leaves a state that still tracks the object.
    /// After such a failure `state.relations` holds only what was attached.
    pub async fn create(&self, state: &mut Declared<K>) -> Result<(), CoreError> {
        let op = Operation::Create;
        let obj = state.to_object(op, ObjectStatus::CreatedModified)?;
        let dn = Dn::new(obj.dn.clone()).map_err(CoreError::identity(op))?;
        debug!(kind = K::KIND, dn = %dn, "beginning create");

        self.transport
            .save(dn.as_str(), &obj.to_payload())
            .await
            .map_err(|e| CoreError::transport(op, dn.as_str(), e))?;
        state.id = Some(dn.clone());

        let sync = RelationSync::new(&*self.transport, &dn);
        let none = BTreeSet::new();
        for (idx, spec) in K::RELATIONS.iter().enumerate() {
            let Some(targets) = state.relations.get(spec.key).cloned() else {
                continue;
            };
            let (attached, source) = match sync.replace(spec, &none, &targets).await {
                ReplaceOutcome::Applied => continue,
                ReplaceOutcome::Rejected(source) => (BTreeSet::new(), source),
                ReplaceOutcome::Partial { attached, source, .. } => (attached, source),
            };
            warn!(
                dn = %dn,
                relation = spec.key,
                attached = ?attached,
                "relation attach stopped partway"
            );
            for later in K::RELATIONS.iter().skip(idx + 1) {
                state.relations.remove(later.key);
            }
            if attached.is_empty() {
                state.relations.remove(spec.key);
            } else {
                state.relations.insert(spec.key, attached);
            }
            return Err(CoreError::PartialRelationFailure {
                operation: op,
                dn: dn.to_string(),
                relation: spec.key,
                detached: Vec::new(),
                source,
            });
        }

        self.refresh(state, op, Missing::Fail).await?;
        debug!(kind = K::KIND, dn = %dn, "finished create");
        Ok(())
    }

    /// Refresh `state` from the controller. A vanished object clears the
    /// identity rather than failing; no identity means nothing to read.
    pub async fn read(&self, state: &mut Declared<K>) -> Result<(), CoreError> {
        if state.id.is_none() {
            debug!(kind = K::KIND, name = %state.name, "read skipped: no identity");
            return Ok(());
        }
        self.refresh(state, Operation::Read, Missing::Forget).await
    }

    /// Push `state` over the object `prior` describes, replace any relation
    /// whose targets changed, then refresh.
    ///
    /// Name and parent form the identity and cannot change here.
    pub async fn update(&self, prior: &Declared<K>, state: &mut Declared<K>) -> Result<(), CoreError> {
        let op = Operation::Update;
        let id = prior
            .id
            .clone()
            .or_else(|| state.id.clone())
            .ok_or_else(|| CoreError::validation("id", "update requires a known object"))?;

        let obj = state.to_object(op, ObjectStatus::Modified)?;
        if obj.dn != id.as_str() {
            let field = match K::PARENT.key() {
                Some(key) if state.parent.as_ref() != id.parent().ok().as_ref() => key,
                _ => crate::convert::NAME,
            };
            return Err(CoreError::Immutable {
                operation: op,
                dn: id.to_string(),
                field,
            });
        }
        debug!(kind = K::KIND, dn = %id, "beginning update");

        self.transport
            .save(id.as_str(), &obj.to_payload())
            .await
            .map_err(|e| CoreError::transport(op, id.as_str(), e))?;
        state.id = Some(id.clone());

        let sync = RelationSync::new(&*self.transport, &id);
        let empty = BTreeSet::new();
        for spec in K::RELATIONS {
            let old = prior.relations.get(spec.key).unwrap_or(&empty);
            let new = state.relations.get(spec.key).unwrap_or(&empty);
            if old == new {
                continue;
            }
            match sync.replace(spec, old, new).await {
                ReplaceOutcome::Applied => {}
                ReplaceOutcome::Rejected(source) => {
                    return Err(CoreError::transport(op, id.as_str(), source));
                }
                ReplaceOutcome::Partial {
                    attached,
                    detached,
                    source,
                } => {
                    warn!(
                        dn = %id,
                        relation = spec.key,
                        detached = ?detached,
                        "relation replace stopped partway"
                    );
                    if attached.is_empty() {
                        state.relations.remove(spec.key);
                    } else {
                        state.relations.insert(spec.key, attached);
                    }
                    return Err(CoreError::PartialRelationFailure {
                        operation: op,
                        dn: id.to_string(),
                        relation: spec.key,
                        detached,
                        source,
                    });
                }
            }
        }

        self.refresh(state, op, Missing::Fail).await?;
        debug!(kind = K::KIND, dn = %id, "finished update");
        Ok(())
    }

    /// Remove the object. Relation children go with it. Without an identity
    /// this is a no-op.
    pub async fn delete(&self, state: &mut Declared<K>) -> Result<(), CoreError> {
        let op = Operation::Delete;
        let Some(id) = state.id.clone() else {
            debug!(kind = K::KIND, name = %state.name, "delete skipped: no identity");
            return Ok(());
        };

        self.transport
            .delete_by_dn(id.as_str(), K::CLASS)
            .await
            .map_err(|e| CoreError::transport(op, id.as_str(), e))?;
        state.id = None;
        debug!(kind = K::KIND, dn = %id, "deleted");
        Ok(())
    }

    /// Adopt an existing object by DN, including its relations.
    pub async fn import(&self, dn: &str) -> Result<Declared<K>, CoreError> {
        let op = Operation::Import;
        let dn = Dn::new(dn).map_err(CoreError::identity(op))?;
        debug!(kind = K::KIND, dn = %dn, "importing");

        let obj = fetch_by_dn::<K>(&*self.transport, &dn, op).await?;
        let mut state = Declared::new(obj.name.clone());
        state.apply_remote(&obj, op)?;

        let sync = RelationSync::new(&*self.transport, &dn);
        for spec in K::RELATIONS {
            let targets = sync
                .read(spec)
                .await
                .map_err(|e| CoreError::transport(op, dn.as_str(), e))?;
            state.set_relation(spec.key, targets)?;
        }
        Ok(state)
    }

    /// Read-only lookup by name (and parent, for kinds that declare one).
    /// A missing object is an error.
    pub async fn lookup(&self, name: &str, parent: Option<Dn>) -> Result<Declared<K>, CoreError> {
        let op = Operation::Lookup;
        let mut state = Declared::<K>::new(name);
        state.parent = parent;
        state.id = Some(state.target_dn(op)?);
        self.refresh(&mut state, op, Missing::Fail).await?;
        Ok(state)
    }

    // ── Internals ────────────────────────────────────────────────────

    async fn refresh(&self, state: &mut Declared<K>, op: Operation, missing: Missing) -> Result<(), CoreError> {
        let Some(id) = state.id.clone() else {
            return Ok(());
        };

        let obj = match fetch_by_dn::<K>(&*self.transport, &id, op).await {
            Ok(obj) => obj,
            Err(e) if e.is_not_found() && missing == Missing::Forget => {
                debug!(kind = K::KIND, dn = %id, "object gone; clearing identity");
                state.id = None;
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        state.apply_remote(&obj, op)?;

        let sync = RelationSync::new(&*self.transport, &id);
        for spec in K::RELATIONS {
            match sync.read(spec).await {
                Ok(targets) => state.set_relation(spec.key, targets)?,
                Err(e) => warn!(
                    dn = %id,
                    relation = spec.key,
                    error = %e,
                    "relation read failed; keeping last known targets"
                ),
            }
        }
        Ok(())
    }
}
