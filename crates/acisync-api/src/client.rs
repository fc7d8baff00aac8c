// APIC HTTP client
//
// Wraps `reqwest::Client` with managed-object URL construction and
// `imdata` envelope parsing. Implements `Transport`, which is all the
// reconciler ever sees of it.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, trace};
use url::Url;

use crate::container::{Container, mo_payload};
use crate::error::Error;
use crate::transport::{Transport, TransportConfig};

/// Raw HTTP client for the APIC managed-object API.
pub struct ApicClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApicClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the controller root, e.g. `https://apic1.example.net`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    // ── URL builders ─────────────────────────────────────────────────

    fn root(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// `{base}/api/node/mo/{dn}.json`
    pub(crate) fn mo_url(&self, dn: &str) -> Result<Url, Error> {
        Ok(Url::parse(&format!("{}/api/node/mo/{dn}.json", self.root()))?)
    }

    /// `{base}/api/node/class/{parent_dn}/{class}.json`
    pub(crate) fn class_url(&self, parent_dn: &str, class: &str) -> Result<Url, Error> {
        Ok(Url::parse(&format!(
            "{}/api/node/class/{parent_dn}/{class}.json",
            self.root()
        ))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get_container(&self, url: Url) -> Result<Container, Error> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        Self::parse_container(resp).await
    }

    async fn post_container(&self, url: Url, body: &Value) -> Result<Container, Error> {
        debug!("POST {}", url);
        trace!(body = %body, "request body");
        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        Self::parse_container(resp).await
    }

    /// Parse the `{ totalCount, imdata }` envelope, surfacing APIC faults
    /// as `Error::Api` regardless of the HTTP status they arrived with.
    async fn parse_container(resp: reqwest::Response) -> Result<Container, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        let parsed: Result<Container, _> = serde_json::from_str(&body);

        match parsed {
            Ok(container) => {
                if let Some(fault) = container.fault() {
                    return Err(Error::Api {
                        message: fault.text,
                        code: fault.code,
                        status: status.as_u16(),
                    });
                }
                if !status.is_success() {
                    return Err(Error::Api {
                        message: format!("HTTP {status}"),
                        code: None,
                        status: status.as_u16(),
                    });
                }
                Ok(container)
            }
            Err(_) if !status.is_success() => Err(Error::Api {
                message: body.chars().take(200).collect(),
                code: None,
                status: status.as_u16(),
            }),
            Err(e) => Err(Error::Deserialization {
                message: e.to_string(),
                body,
            }),
        }
    }
}

#[async_trait]
impl Transport for ApicClient {
    async fn get(&self, dn: &str) -> Result<Container, Error> {
        let url = self.mo_url(dn)?;
        self.get_container(url).await
    }

    async fn save(&self, dn: &str, payload: &Value) -> Result<(), Error> {
        let url = self.mo_url(dn)?;
        self.post_container(url, payload).await.map(|_| ())
    }

    async fn delete_by_dn(&self, dn: &str, class: &str) -> Result<(), Error> {
        let mut attrs = Map::new();
        attrs.insert("dn".into(), Value::String(dn.to_owned()));
        attrs.insert("status".into(), Value::String("deleted".into()));
        let url = self.mo_url(dn)?;
        debug!(dn, class, "deleting managed object");
        self.post_container(url, &mo_payload(class, attrs))
            .await
            .map(|_| ())
    }

    async fn list_class(&self, parent_dn: &str, class: &str) -> Result<Container, Error> {
        let url = self.class_url(parent_dn, class)?;
        self.get_container(url).await
    }
}
