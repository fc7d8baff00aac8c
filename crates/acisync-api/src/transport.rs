// Transport contract and shared HTTP client configuration.
//
// `Transport` is the narrow surface the reconciler talks to: point lookups,
// saves, deletes, and child-class listings. `TransportConfig` builds the
// `reqwest::Client` behind the HTTP implementation.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::container::Container;
use crate::error::Error;

/// Managed-object transport.
///
/// Implementations must not retry, and must return an empty [`Container`]
/// (not an error) for a lookup of an unknown DN.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Point lookup of the object at `dn`.
    async fn get(&self, dn: &str) -> Result<Container, Error>;

    /// Post a `{ "<class>": { "attributes": .. } }` body to `dn`.
    async fn save(&self, dn: &str, payload: &Value) -> Result<(), Error>;

    /// Remove the object at `dn`. Deleting an absent object succeeds.
    async fn delete_by_dn(&self, dn: &str, class: &str) -> Result<(), Error>;

    /// List objects of `class` beneath `parent_dn`.
    async fn list_class(&self, parent_dn: &str, class: &str) -> Result<Container, Error>;
}

/// TLS verification mode (api-level mirror of core's TlsVerification).
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (for self-signed controllers).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    /// Pre-issued session token, sent as the `APIC-cookie` cookie.
    pub token: Option<SecretString>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::DangerAcceptInvalid,
            timeout: Duration::from_secs(30),
            token: None,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("acisync/", env!("CARGO_PKG_VERSION")))
            .default_headers(self.default_headers()?);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    fn default_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        if let Some(ref token) = self.token {
            let mut value =
                HeaderValue::from_str(&format!("APIC-cookie={}", token.expose_secret()))
                    .map_err(|e| Error::Tls(format!("invalid session token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
        }
        Ok(headers)
    }

    /// Attach a session token to this config.
    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn token_becomes_sensitive_cookie() {
        let config = TransportConfig::default().with_token(SecretString::from("abc123"));
        let headers = config.default_headers().unwrap();
        let cookie = headers.get(COOKIE).unwrap();
        assert!(cookie.is_sensitive());
        assert_eq!(cookie.to_str().unwrap(), "APIC-cookie=abc123");
    }

    #[test]
    fn no_token_no_headers() {
        let headers = TransportConfig::default().default_headers().unwrap();
        assert!(headers.is_empty());
    }

    #[test]
    fn rejects_token_with_control_characters() {
        let config = TransportConfig::default().with_token(SecretString::from("bad\ntoken"));
        assert!(matches!(config.default_headers(), Err(Error::Tls(_))));
    }
}
