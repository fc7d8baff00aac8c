// ── Runtime connection configuration ──
//
// Describes how to reach one APIC. Carries the session token and transport
// tuning but never touches disk: the CLI builds a `ControllerConfig` from its
// profile file and hands it in.

use std::sync::Arc;
use std::time::Duration;

use acisync_api::{ApicClient, TlsMode, Transport, TransportConfig};
use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification. APICs ship with self-signed certificates.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for connecting to a single controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Controller URL (e.g., `https://apic1.example.net`).
    pub url: Url,
    /// Pre-issued session token, sent as the `APIC-cookie` cookie.
    pub token: Option<SecretString>,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ControllerConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            token: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn transport_config(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
            token: self.token.clone(),
        }
    }

    /// Build the HTTP transport for this controller.
    pub fn transport(&self) -> Result<Arc<dyn Transport>, CoreError> {
        let client = ApicClient::new(self.url.clone(), &self.transport_config()).map_err(|e| {
            CoreError::Config {
                message: format!("cannot build client for {}: {e}", self.url),
            }
        })?;
        Ok(Arc::new(client))
    }
}
