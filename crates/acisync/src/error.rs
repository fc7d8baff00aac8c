//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable exit code per failure class.

use miette::Diagnostic;
use thiserror::Error;

use acisync_config::ConfigError;
use acisync_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const PARTIAL: i32 = 9;
    pub const CONFIG: i32 = 10;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to controller")]
    #[diagnostic(
        code(acisync::connection_failed),
        help(
            "Check that the APIC is reachable and the controller URL is right.\n\
             Try: acisync lookup firmware_group <name> --insecure"
        )
    )]
    ConnectionFailed {
        #[source]
        source: CoreError,
    },

    #[error("TLS certificate verification failed: {reason}")]
    #[diagnostic(
        code(acisync::tls_error),
        help(
            "The controller is using a self-signed certificate.\n\
             Use --insecure (-k) to accept it, or configure ca_cert in your profile."
        )
    )]
    TlsError { reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(acisync::timeout),
        help("Increase timeout with --timeout or check controller responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed (HTTP {status})")]
    #[diagnostic(
        code(acisync::auth_failed),
        help(
            "The session token was rejected or has expired.\n\
             Refresh it with: acisync config set-token --profile {profile}"
        )
    )]
    AuthFailed { status: u16, profile: String },

    #[error("No session token configured for profile '{profile}'")]
    #[diagnostic(
        code(acisync::no_credentials),
        help(
            "Store one with: acisync config set-token\n\
             Or set the ACISYNC_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{class} object '{dn}' not found")]
    #[diagnostic(
        code(acisync::not_found),
        help("Check the name and parent DN, or look the object up in the APIC GUI.")
    )]
    NotFound { class: String, dn: String },

    #[error("No tracked resource at address '{address}'")]
    #[diagnostic(
        code(acisync::address_not_found),
        help("Run: acisync show to list tracked addresses")
    )]
    AddressNotFound { address: String },

    #[error("Address '{address}' is already tracked as {dn}")]
    #[diagnostic(
        code(acisync::conflict),
        help("Pass --address to track the object under a different name.")
    )]
    Conflict { address: String, dn: String },

    #[error("{0}")]
    #[diagnostic(
        code(acisync::partial),
        help(
            "The object itself was saved and is tracked in the state file.\n\
             Re-run apply to retry the relation change."
        )
    )]
    Partial(#[source] CoreError),

    #[error("{0}")]
    #[diagnostic(
        code(acisync::immutable),
        help("Change the resource address in the manifest to replace the object.")
    )]
    Immutable(#[source] CoreError),

    // ── API ──────────────────────────────────────────────────────────
    #[error("APIC error ({code}): {message}")]
    #[diagnostic(code(acisync::api_error))]
    ApiError {
        code: String,
        message: String,
        #[source]
        source: CoreError,
    },

    #[error("{failed} of {total} resources failed")]
    #[diagnostic(
        code(acisync::apply_failed),
        help("Errors for each resource were printed above. Completed resources are saved in state.")
    )]
    ApplyFailed {
        failed: usize,
        total: usize,
        /// Exit code of the first failure.
        code: i32,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(acisync::validation))]
    Validation { field: String, reason: String },

    #[error("Invalid manifest {path}")]
    #[diagnostic(
        code(acisync::manifest),
        help("Each resource needs `kind` and `attributes.name`; addresses must be unique.")
    )]
    Manifest {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(acisync::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: acisync config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(acisync::no_config),
        help(
            "Create one with: acisync config init\n\
             Expected at: {path}\n\
             Or pass --controller and --token."
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(acisync::config))]
    Config(ConfigError),

    // ── State ────────────────────────────────────────────────────────
    #[error("State file {path} is unreadable: {reason}")]
    #[diagnostic(
        code(acisync::state),
        help("Restore the file from backup or remove it and re-import the objects.")
    )]
    State { path: String, reason: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(acisync::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(acisync::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::AddressNotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } | Self::Immutable(_) => exit_code::CONFLICT,
            Self::Partial(_) => exit_code::PARTIAL,
            Self::ApplyFailed { code, .. } => *code,
            Self::Validation { .. }
            | Self::Manifest { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::ProfileNotFound { .. } | Self::NoConfig { .. } | Self::Config(_) => {
                exit_code::CONFIG
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { class, dn, .. } => Self::NotFound {
                class: class.into(),
                dn,
            },
            CoreError::PartialRelationFailure { .. } => Self::Partial(err),
            CoreError::Immutable { .. } => Self::Immutable(err),
            CoreError::Validation { field, reason } => Self::Validation { field, reason },
            CoreError::Identity { ref source, .. } => Self::Validation {
                field: "dn".into(),
                reason: source.to_string(),
            },
            CoreError::Config { message } => Self::Validation {
                field: "controller".into(),
                reason: message,
            },
            CoreError::Transport { .. } => from_transport(err),
        }
    }
}

fn from_transport(err: CoreError) -> CliError {
    use acisync_api::Error as Api;

    let CoreError::Transport { source, .. } = &err else {
        return CliError::Validation {
            field: "transport".into(),
            reason: err.to_string(),
        };
    };

    let direct = match source {
        Api::Timeout { timeout_secs } => Some(CliError::Timeout {
            seconds: *timeout_secs,
        }),
        Api::Tls(reason) => Some(CliError::TlsError {
            reason: reason.clone(),
        }),
        Api::Transport(e) if e.is_timeout() => Some(CliError::Timeout { seconds: 0 }),
        Api::Api { status, .. } if matches!(*status, 401 | 403) => Some(CliError::AuthFailed {
            status: *status,
            profile: "current".into(),
        }),
        _ => None,
    };
    if let Some(mapped) = direct {
        return mapped;
    }

    let connect = matches!(source, Api::Transport(e) if e.is_connect());
    let (code, message) = match source {
        Api::Api { message, code, .. } => (
            code.clone().unwrap_or_else(|| "unknown".into()),
            message.clone(),
        ),
        other => ("transport".into(), other.to_string()),
    };

    if connect {
        CliError::ConnectionFailed { source: err }
    } else {
        CliError::ApiError {
            code,
            message,
            source: err,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        if let ConfigError::NoCredentials { profile } = err {
            Self::NoCredentials { profile }
        } else {
            Self::Config(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use acisync_core::Operation;

    use super::*;

    fn api(status: u16, code: &str) -> CoreError {
        CoreError::Transport {
            operation: Operation::Update,
            dn: "uni/fabric/fwgrp-fw1".into(),
            source: acisync_api::Error::Api {
                message: "boom".into(),
                code: Some(code.into()),
                status,
            },
        }
    }

    #[test]
    fn auth_rejections_map_to_auth_exit_code() {
        let err = CliError::from(api(403, "403"));
        assert!(matches!(err, CliError::AuthFailed { status: 403, .. }));
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn apic_faults_keep_their_code() {
        let err = CliError::from(api(400, "103"));
        match err {
            CliError::ApiError { ref code, .. } => assert_eq!(code, "103"),
            ref other => panic!("unexpected {other:?}"),
        }
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn partial_failure_has_its_own_exit_code() {
        let err = CliError::from(CoreError::PartialRelationFailure {
            operation: Operation::Update,
            dn: "uni/tn-t1/cif-web".into(),
            relation: "relation_vz_rs_if",
            detached: vec!["uni/tn-common/brc-old".into()],
            source: acisync_api::Error::Tls("x".into()),
        });
        assert_eq!(err.exit_code(), exit_code::PARTIAL);
    }

    #[test]
    fn not_found_maps_to_not_found() {
        let err = CliError::from(CoreError::NotFound {
            operation: Operation::Lookup,
            class: "firmwareFwGrp",
            dn: "uni/fabric/fwgrp-x".into(),
        });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
    }

    #[test]
    fn missing_token_is_an_auth_error() {
        let err = CliError::from(ConfigError::NoCredentials {
            profile: "lab".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }
}
