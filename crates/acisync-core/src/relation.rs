// ── Relation synchronization ──
//
// Relations are child objects of the primary whose target attribute (`tDn`)
// points elsewhere. Single-valued relations live at a fixed rn and are
// replaced by delete-then-create; multi-valued ones get one child per target
// and are reconciled by set difference. Nothing here is atomic: a replace can
// stop halfway, and `ReplaceOutcome` says how far it got.

use std::collections::BTreeSet;

use acisync_api::{Attributes, Transport, mo_payload};
use serde_json::Value;
use tracing::debug;

use crate::model::dn::Dn;
use crate::model::kind::{Cardinality, RelationSpec};
use crate::model::object::ObjectStatus;

/// Result of replacing a relation's targets.
#[derive(Debug)]
#[must_use]
pub enum ReplaceOutcome {
    /// Remote targets now equal the requested set.
    Applied,
    /// The first call failed; nothing changed remotely.
    Rejected(acisync_api::Error),
    /// Some calls succeeded before one failed.
    Partial {
        /// Targets known to be attached after the failure.
        attached: BTreeSet<String>,
        /// Old targets that were removed.
        detached: Vec<String>,
        source: acisync_api::Error,
    },
}

/// Relation operations for one primary object.
pub struct RelationSync<'a> {
    transport: &'a dyn Transport,
    primary: &'a Dn,
}

impl<'a> RelationSync<'a> {
    pub fn new(transport: &'a dyn Transport, primary: &'a Dn) -> Self {
        Self { transport, primary }
    }

    /// Current targets of `spec` under the primary.
    pub async fn read(&self, spec: &RelationSpec) -> Result<BTreeSet<String>, acisync_api::Error> {
        let container = self
            .transport
            .list_class(self.primary.as_str(), spec.class)
            .await?;

        Ok(container
            .attributes_of(spec.class)
            .filter(|attrs| self.is_direct_child(attrs))
            .filter_map(|attrs| attrs.get(spec.target_attr).and_then(Value::as_str))
            .filter(|target| !target.is_empty())
            .map(str::to_owned)
            .collect())
    }

    /// Attach `target`.
    pub async fn create(&self, spec: &RelationSpec, target: &str) -> Result<(), acisync_api::Error> {
        let dn = spec.child_dn(self.primary, target);
        let mut attrs = Attributes::new();
        attrs.insert("dn".into(), Value::String(dn.to_string()));
        attrs.insert(spec.target_attr.into(), Value::String(target.to_owned()));
        attrs.insert(
            "status".into(),
            Value::String(ObjectStatus::CreatedModified.to_string()),
        );

        debug!(primary = %self.primary, relation = spec.key, target, "attaching relation");
        self.transport
            .save(dn.as_str(), &mo_payload(spec.class, attrs))
            .await
    }

    /// Detach `target`. For single-valued relations the target only labels
    /// the log line; the fixed rn is removed either way.
    pub async fn delete(&self, spec: &RelationSpec, target: &str) -> Result<(), acisync_api::Error> {
        let dn = spec.child_dn(self.primary, target);
        debug!(primary = %self.primary, relation = spec.key, target, "detaching relation");
        self.transport.delete_by_dn(dn.as_str(), spec.class).await
    }

    /// Move the relation from `old` to `new` targets.
    pub async fn replace(
        &self,
        spec: &RelationSpec,
        old: &BTreeSet<String>,
        new: &BTreeSet<String>,
    ) -> ReplaceOutcome {
        if old == new {
            return ReplaceOutcome::Applied;
        }

        let (to_remove, to_add): (Vec<&String>, Vec<&String>) = match spec.cardinality() {
            Cardinality::Single => (old.iter().collect(), new.iter().collect()),
            Cardinality::Multiple => (old.difference(new).collect(), new.difference(old).collect()),
        };

        let mut attached = old.clone();
        let mut detached = Vec::new();
        let mut changed = false;

        for target in to_remove {
            if let Err(source) = self.delete(spec, target).await {
                return stopped(changed, attached, detached, source);
            }
            attached.remove(target);
            detached.push(target.clone());
            changed = true;
        }

        for target in to_add {
            if let Err(source) = self.create(spec, target).await {
                return stopped(changed, attached, detached, source);
            }
            attached.insert(target.clone());
            changed = true;
        }

        ReplaceOutcome::Applied
    }

    fn is_direct_child(&self, attrs: &Attributes) -> bool {
        let Some(dn) = attrs.get("dn").and_then(Value::as_str) else {
            return true;
        };
        Dn::new(dn)
            .and_then(|dn| dn.parent())
            .is_ok_and(|parent| &parent == self.primary)
    }
}

fn stopped(
    changed: bool,
    attached: BTreeSet<String>,
    detached: Vec<String>,
    source: acisync_api::Error,
) -> ReplaceOutcome {
    if changed {
        ReplaceOutcome::Partial {
            attached,
            detached,
            source,
        }
    } else {
        ReplaceOutcome::Rejected(source)
    }
}
