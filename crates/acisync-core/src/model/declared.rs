// ── Declared state ──
//
// `Declared<K>` is what the caller wants to exist (and, after a read, the
// last-known remote view). `FlatState` is its untyped persisted form: the
// shape state files and manifests use.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::convert::{self, DESCRIPTION, NAME};
use crate::error::{CoreError, Operation};
use crate::model::dn::Dn;
use crate::model::kind::{Cardinality, ParentScope, ResourceKind};
use crate::model::object::{ManagedObject, ObjectStatus};

/// Declared attribute values keyed by declared name.
pub type FlatAttributes = BTreeMap<String, String>;

/// Persisted relation value: a single target or a set of targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationValue {
    One(String),
    Many(BTreeSet<String>),
}

impl RelationValue {
    fn into_targets(self) -> BTreeSet<String> {
        match self {
            Self::One(target) if target.is_empty() => BTreeSet::new(),
            Self::One(target) => BTreeSet::from([target]),
            Self::Many(targets) => targets.into_iter().filter(|t| !t.is_empty()).collect(),
        }
    }
}

/// Untyped declared state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Dn>,
    #[serde(default)]
    pub attributes: FlatAttributes,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relations: BTreeMap<String, RelationValue>,
}

/// Typed declared state of one object of kind `K`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declared<K: ResourceKind> {
    /// Assigned once the object is known to exist remotely.
    pub id: Option<Dn>,
    pub name: String,
    /// Only consulted for kinds with a declared parent.
    pub parent: Option<Dn>,
    pub description: Option<String>,
    pub attributes: K::Attributes,
    /// Relation targets keyed by relation name. Empty sets are never stored.
    pub relations: BTreeMap<&'static str, BTreeSet<String>>,
}

impl<K: ResourceKind> Declared<K> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            parent: None,
            description: None,
            attributes: K::Attributes::default(),
            relations: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: Dn) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: K::Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Declare the targets of relation `key`. An empty set clears it.
    pub fn set_relation<I, S>(&mut self, key: &str, targets: I) -> Result<(), CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = K::relation(key).ok_or_else(|| {
            CoreError::validation(key, format!("not a relation of {}", K::KIND))
        })?;
        let targets: BTreeSet<String> = targets
            .into_iter()
            .map(Into::into)
            .filter(|t: &String| !t.is_empty())
            .collect();

        if spec.cardinality() == Cardinality::Single && targets.len() > 1 {
            return Err(CoreError::validation(key, "takes a single target"));
        }
        if targets.is_empty() {
            self.relations.remove(spec.key);
        } else {
            self.relations.insert(spec.key, targets);
        }
        Ok(())
    }

    pub fn relation(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.relations.get(key)
    }

    /// DN of the container this object lives under.
    pub fn parent_dn(&self, operation: Operation) -> Result<Dn, CoreError> {
        match K::PARENT {
            ParentScope::Fixed(root) => Dn::new(root).map_err(CoreError::identity(operation)),
            ParentScope::Declared { key } => self
                .parent
                .clone()
                .ok_or_else(|| CoreError::validation(key, "required")),
        }
    }

    /// DN this declaration resolves to.
    pub fn target_dn(&self, operation: Operation) -> Result<Dn, CoreError> {
        let parent = self.parent_dn(operation)?;
        Dn::child(&parent, K::RN_PREFIX, &self.name).map_err(CoreError::identity(operation))
    }

    /// Wire object for a save with the given status.
    pub fn to_object(
        &self,
        operation: Operation,
        status: ObjectStatus,
    ) -> Result<ManagedObject<K>, CoreError> {
        let parent = self.parent_dn(operation)?;
        let mut flat = FlatAttributes::new();
        flat.insert(NAME.into(), self.name.clone());
        convert::attributes_to_flat::<K>(&self.attributes, &mut flat);
        convert::encode::<K>(&flat, &parent, self.description.as_deref(), status)
            .map_err(CoreError::identity(operation))
    }

    /// Overwrite identity and attributes with what the controller reports.
    /// Relations are left alone.
    pub fn apply_remote(&mut self, obj: &ManagedObject<K>, operation: Operation) -> Result<(), CoreError> {
        let id = Dn::new(obj.dn.clone()).map_err(CoreError::identity(operation))?;
        self.parent = Some(id.parent().map_err(CoreError::identity(operation))?);
        self.id = Some(id);

        let flat = convert::decode(obj);
        self.name.clone_from(&obj.name);
        self.description = flat.get(DESCRIPTION).cloned();
        for field in K::FIELDS {
            (field.set)(&mut self.attributes, flat.get(field.key).cloned());
        }
        Ok(())
    }

    /// Names of the attributes and relations whose declared value differs
    /// from `prior`. Unset optional attributes never drift.
    pub fn drift(&self, prior: &Self) -> Vec<&'static str> {
        let mut changed = Vec::new();

        if self.name != prior.name {
            changed.push(NAME);
        }
        if let ParentScope::Declared { key } = K::PARENT {
            if self.parent.is_some() && self.parent != prior.parent {
                changed.push(key);
            }
        }
        if differs(self.description.as_deref(), prior.description.as_deref()) {
            changed.push(DESCRIPTION);
        }
        for field in K::FIELDS {
            if differs((field.get)(&self.attributes), (field.get)(&prior.attributes)) {
                changed.push(field.key);
            }
        }
        for spec in K::RELATIONS {
            if self.relations.get(spec.key) != prior.relations.get(spec.key) {
                changed.push(spec.key);
            }
        }
        changed
    }

    /// Untyped form for persistence.
    pub fn to_flat(&self) -> FlatState {
        let mut attributes = FlatAttributes::new();
        attributes.insert(NAME.into(), self.name.clone());
        if let Some(ref descr) = self.description {
            attributes.insert(DESCRIPTION.into(), descr.clone());
        }
        if let (Some(key), Some(parent)) = (K::PARENT.key(), &self.parent) {
            attributes.insert(key.into(), parent.to_string());
        }
        convert::attributes_to_flat::<K>(&self.attributes, &mut attributes);

        let relations = K::RELATIONS
            .iter()
            .filter_map(|spec| {
                let targets = self.relations.get(spec.key)?;
                let value = match (spec.cardinality(), targets.first()) {
                    (Cardinality::Single, Some(target)) => RelationValue::One(target.clone()),
                    _ => RelationValue::Many(targets.clone()),
                };
                Some((spec.key.to_owned(), value))
            })
            .collect();

        FlatState {
            id: self.id.clone(),
            attributes,
            relations,
        }
    }

    /// Typed form of a persisted or declared state. Unknown attribute or
    /// relation names are rejected.
    pub fn from_flat(flat: FlatState) -> Result<Self, CoreError> {
        let parent_key = K::PARENT.key();
        for key in flat.attributes.keys() {
            let known = key == NAME
                || key == DESCRIPTION
                || parent_key == Some(key.as_str())
                || K::field(key).is_some();
            if !known {
                return Err(CoreError::validation(
                    key.clone(),
                    format!("not an attribute of {}", K::KIND),
                ));
            }
        }

        let name = flat.attributes.get(NAME).cloned().unwrap_or_default();
        if name.is_empty() {
            return Err(CoreError::validation(NAME, "required"));
        }

        let parent = match parent_key.and_then(|key| flat.attributes.get(key)) {
            Some(raw) if !raw.is_empty() => Some(Dn::new(raw.clone()).map_err(|e| {
                CoreError::validation(parent_key.unwrap_or_default(), e.to_string())
            })?),
            _ => None,
        };

        let mut declared = Self::new(name);
        declared.id = flat.id;
        declared.parent = parent;
        declared.description = flat
            .attributes
            .get(DESCRIPTION)
            .filter(|d| !d.is_empty())
            .cloned();
        declared.attributes = convert::attributes_from_flat::<K>(&flat.attributes);
        for (key, value) in flat.relations {
            declared.set_relation(&key, value.into_targets())?;
        }
        Ok(declared)
    }
}

fn differs(desired: Option<&str>, prior: Option<&str>) -> bool {
    match desired {
        Some(want) if !want.is_empty() => prior.unwrap_or_default() != want,
        _ => false,
    }
}
