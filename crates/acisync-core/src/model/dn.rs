// ── Distinguished names ──
//
// Identity of every managed object is `<parent dn>/<rn>`, where the rn is a
// kind prefix plus the object's name. Rns may embed a whole DN in square
// brackets (`rsdomP-[uni/phys-dom1]`), so splitting must respect nesting.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to build or decompose a distinguished name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DnError {
    #[error("empty distinguished name")]
    Empty,

    #[error("empty name for '{prefix}' object under '{parent}'")]
    EmptyName { parent: String, prefix: String },

    #[error("distinguished name '{dn}' has no parent segment")]
    NoParent { dn: String },

    #[error("distinguished name '{dn}' has unbalanced brackets")]
    Unbalanced { dn: String },

    #[error("name '{name}' is not a single rn: '/' outside brackets or unbalanced brackets")]
    InvalidName { name: String },
}

/// Hierarchical APIC distinguished name, e.g. `uni/tn-common/cif-web`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Dn(String);

impl Dn {
    /// Wrap a raw DN string. Only emptiness is rejected here; structure is
    /// checked when the DN is decomposed.
    pub fn new(raw: impl Into<String>) -> Result<Self, DnError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(DnError::Empty);
        }
        Ok(Self(raw))
    }

    /// `parent + "/" + prefix + name`. The name must be non-empty and must
    /// not split into more than one rn, so `parent()` always gets `parent`
    /// back.
    pub fn child(parent: &Dn, prefix: &str, name: &str) -> Result<Self, DnError> {
        if name.is_empty() {
            return Err(DnError::EmptyName {
                parent: parent.0.clone(),
                prefix: prefix.to_owned(),
            });
        }
        if !is_single_rn(name) {
            return Err(DnError::InvalidName {
                name: name.to_owned(),
            });
        }
        Ok(Self(format!("{}/{prefix}{name}", parent.0)))
    }

    /// Append an already-formed rn (relation children).
    pub fn join(&self, rn: &str) -> Self {
        Self(format!("{}/{rn}", self.0))
    }

    /// Strip the last rn. Fails when the DN has no separator outside brackets.
    pub fn parent(&self) -> Result<Dn, DnError> {
        let (head, _) = self.split_last()?;
        Ok(Self(head.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn split_last(&self) -> Result<(&str, &str), DnError> {
        let mut depth: usize = 0;
        let mut split = None;
        for (idx, ch) in self.0.char_indices() {
            match ch {
                '[' => depth += 1,
                ']' => {
                    depth = depth.checked_sub(1).ok_or_else(|| DnError::Unbalanced {
                        dn: self.0.clone(),
                    })?;
                }
                '/' if depth == 0 => split = Some(idx),
                _ => {}
            }
        }
        if depth != 0 {
            return Err(DnError::Unbalanced { dn: self.0.clone() });
        }
        match split {
            Some(idx) if idx > 0 => Ok((&self.0[..idx], &self.0[idx + 1..])),
            _ => Err(DnError::NoParent { dn: self.0.clone() }),
        }
    }
}

/// True when `segment` has balanced brackets and no `/` outside them.
fn is_single_rn(segment: &str) -> bool {
    let mut depth: usize = 0;
    for ch in segment.chars() {
        match ch {
            '[' => depth += 1,
            ']' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            '/' if depth == 0 => return false,
            _ => {}
        }
    }
    depth == 0
}

impl fmt::Display for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Dn {
    type Error = DnError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&str> for Dn {
    type Error = DnError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Dn> for String {
    fn from(dn: Dn) -> Self {
        dn.0
    }
}

impl AsRef<str> for Dn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dn(s: &str) -> Dn {
        Dn::new(s).unwrap()
    }

    #[test]
    fn child_concatenates_prefix_and_name() {
        let built = Dn::child(&dn("uni/fabric"), "fwgrp-", "fw1").unwrap();
        assert_eq!(built.as_str(), "uni/fabric/fwgrp-fw1");
    }

    #[test]
    fn child_rejects_empty_name() {
        let err = Dn::child(&dn("uni/tn-t1"), "cif-", "").unwrap_err();
        assert!(matches!(err, DnError::EmptyName { .. }));
    }

    #[test]
    fn child_rejects_names_that_split_the_rn() {
        for name in ["a/b", "web[", "web]x", "[uni/phys"] {
            let err = Dn::child(&dn("uni/tn-t1"), "cif-", name).unwrap_err();
            assert_eq!(err, DnError::InvalidName { name: name.into() }, "{name}");
        }
    }

    #[test]
    fn join_appends_bracketed_rn() {
        let primary = dn("uni/infra/attentp-aaep1");
        let rel = primary.join("rsdomP-[uni/phys-dom1]");
        assert_eq!(rel.as_str(), "uni/infra/attentp-aaep1/rsdomP-[uni/phys-dom1]");
        assert_eq!(rel.parent().unwrap(), primary);
    }

    #[test]
    fn parent_recovers_what_child_was_built_from() {
        for (parent, prefix, name) in [
            ("uni", "tn-", "common"),
            ("uni/fabric", "fwgrp-", "fw1"),
            ("uni/tn-t1", "cif-", "web.v2"),
            ("uni/infra/attentp-aaep1", "rsdomP-", "[uni/phys-dom1]"),
        ] {
            let built = Dn::child(&dn(parent), prefix, name).unwrap();
            assert_eq!(built.parent().unwrap().as_str(), parent);
        }
    }

    #[test]
    fn parent_ignores_slashes_inside_brackets() {
        let rel = dn("uni/infra/attentp-aaep1/rsdomP-[uni/l3dom-ext/x]");
        assert_eq!(rel.parent().unwrap().as_str(), "uni/infra/attentp-aaep1");
    }

    #[test]
    fn parent_of_root_is_an_error() {
        assert_eq!(
            dn("uni").parent().unwrap_err(),
            DnError::NoParent { dn: "uni".into() }
        );
    }

    #[test]
    fn leading_slash_has_no_parent() {
        assert!(matches!(
            dn("/fwgrp-x").parent(),
            Err(DnError::NoParent { .. })
        ));
    }

    #[test]
    fn unbalanced_brackets_rejected() {
        assert!(matches!(
            dn("uni/infra/rsdomP-[uni/phys").parent(),
            Err(DnError::Unbalanced { .. })
        ));
        assert!(matches!(
            dn("uni]/x").parent(),
            Err(DnError::Unbalanced { .. })
        ));
    }

    #[test]
    fn empty_dn_rejected() {
        assert_eq!(Dn::new("").unwrap_err(), DnError::Empty);
        assert!(serde_json::from_str::<Dn>("\"\"").is_err());
    }

    #[test]
    fn serde_is_a_plain_string() {
        let d = dn("uni/tn-t1");
        assert_eq!(serde_json::to_string(&d).unwrap(), "\"uni/tn-t1\"");
        let back: Dn = serde_json::from_str("\"uni/tn-t1\"").unwrap();
        assert_eq!(back, d);
    }
}
