// APIC response containers
//
// Every managed-object endpoint answers with the same envelope:
// `{ "totalCount": "<n>", "imdata": [ { "<class>": { "attributes": {..} } } ] }`.
// Unknown DNs come back as a well-formed container with no entries, so the
// caller (not this module) decides what "absent" means.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute map of a single managed object.
pub type Attributes = Map<String, Value>;

/// The `{ totalCount, imdata }` envelope returned by APIC.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Container {
    /// APIC reports the count as a string.
    #[serde(rename = "totalCount", default)]
    pub total_count: String,
    #[serde(default)]
    pub imdata: Vec<Value>,
}

/// Fault object carried in an error response's `imdata`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFault {
    pub code: Option<String>,
    pub text: String,
}

impl Container {
    /// A container with no objects, as APIC returns for unknown DNs.
    pub fn empty() -> Self {
        Self {
            total_count: "0".into(),
            imdata: Vec::new(),
        }
    }

    /// Build a container holding `objects`, each a `(class, attributes)` pair.
    pub fn from_objects<I>(objects: I) -> Self
    where
        I: IntoIterator<Item = (String, Attributes)>,
    {
        let imdata: Vec<Value> = objects
            .into_iter()
            .map(|(class, attrs)| mo_payload(&class, attrs))
            .collect();
        Self {
            total_count: imdata.len().to_string(),
            imdata,
        }
    }

    /// Number of objects, preferring the parsed `totalCount`.
    pub fn count(&self) -> usize {
        self.total_count.parse().unwrap_or(self.imdata.len())
    }

    pub fn is_empty(&self) -> bool {
        self.imdata.is_empty()
    }

    /// Attribute maps of every object of `class` in the container.
    pub fn attributes_of<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a Attributes> {
        self.imdata.iter().filter_map(move |entry| {
            entry
                .get(class)
                .and_then(|mo| mo.get("attributes"))
                .and_then(Value::as_object)
        })
    }

    /// Attribute map of the first object of `class`, if any.
    pub fn first<'a>(&'a self, class: &'a str) -> Option<&'a Attributes> {
        self.attributes_of(class).next()
    }

    /// The fault carried by an error response, if this container is one.
    pub fn fault(&self) -> Option<ApiFault> {
        let attrs = self.first("error")?;
        let text = attrs
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or("unknown APIC error")
            .to_owned();
        let code = attrs.get("code").and_then(Value::as_str).map(str::to_owned);
        Some(ApiFault { code, text })
    }
}

/// Wrap an attribute map in the `{ "<class>": { "attributes": {..} } }` shape
/// APIC expects for POST bodies and returns in `imdata`.
pub fn mo_payload(class: &str, attributes: Attributes) -> Value {
    let mut inner = Map::new();
    inner.insert("attributes".into(), Value::Object(attributes));
    let mut outer = Map::new();
    outer.insert(class.to_owned(), Value::Object(inner));
    Value::Object(outer)
}
