// ── Core error types ──
//
// Every failure surfaced by the reconciler carries the lifecycle operation
// and, where one exists, the DN it was working on. Transport errors are
// wrapped rather than translated so callers can still ask `is_transient()`.

use thiserror::Error;

use crate::model::dn::DnError;

/// Lifecycle operation an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Import,
    Lookup,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Lookup ───────────────────────────────────────────────────────
    #[error("{operation}: {class} object '{dn}' not found")]
    NotFound {
        operation: Operation,
        class: &'static str,
        dn: String,
    },

    // ── Transport (wrapped, not flattened) ───────────────────────────
    #[error("{operation} of '{dn}' failed: {source}")]
    Transport {
        operation: Operation,
        dn: String,
        #[source]
        source: acisync_api::Error,
    },

    // ── Identity ─────────────────────────────────────────────────────
    #[error("{operation}: {source}")]
    Identity {
        operation: Operation,
        #[source]
        source: DnError,
    },

    /// The primary object was committed but a relation is incomplete.
    #[error("{operation} of '{dn}': relation {relation} {}: {source}", partial_phrase(.detached))]
    PartialRelationFailure {
        operation: Operation,
        dn: String,
        relation: &'static str,
        /// Targets that were removed before the failure.
        detached: Vec<String>,
        #[source]
        source: acisync_api::Error,
    },

    #[error("{operation} of '{dn}': {field} cannot change in place; destroy and recreate")]
    Immutable {
        operation: Operation,
        dn: String,
        field: &'static str,
    },

    // ── Declared input ───────────────────────────────────────────────
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

fn partial_phrase(detached: &[String]) -> &'static str {
    if detached.is_empty() {
        "was only partly attached"
    } else {
        "was detached but not re-attached"
    }
}

impl CoreError {
    pub(crate) fn transport(operation: Operation, dn: impl Into<String>, source: acisync_api::Error) -> Self {
        Self::Transport {
            operation,
            dn: dn.into(),
            source,
        }
    }

    pub(crate) fn identity(operation: Operation) -> impl FnOnce(DnError) -> Self {
        move |source| Self::Identity { operation, source }
    }

    pub(crate) fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True when the object does not exist on the controller.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Transport { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// True when the primary object is committed but relations are not.
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::PartialRelationFailure { .. })
    }

    /// Lifecycle operation the error came from, when it has one.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::NotFound { operation, .. }
            | Self::Transport { operation, .. }
            | Self::Identity { operation, .. }
            | Self::PartialRelationFailure { operation, .. }
            | Self::Immutable { operation, .. } => Some(*operation),
            Self::Validation { .. } | Self::Config { .. } => None,
        }
    }

    /// True for failures worth retrying as-is.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { source, .. } | Self::PartialRelationFailure { source, .. } => {
                source.is_transient()
            }
            _ => false,
        }
    }
}
