// acisync-api: Async Rust transport for the APIC managed-object REST API

pub mod client;
pub mod container;
pub mod error;
pub mod transport;

pub use client::ApicClient;
pub use container::{ApiFault, Attributes, Container, mo_payload};
pub use error::Error;
pub use transport::{TlsMode, Transport, TransportConfig};
