// In-memory APIC used by the reconciler tests.
//
// Stores objects by DN, fills server-side defaults on first save, removes
// whole subtrees on delete, and can be told to fail specific calls.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use acisync_api::{Attributes, Container, Error, Transport};
use async_trait::async_trait;
use serde_json::{Value, json};

/// Which transport call a failure rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Get,
    Save,
    Delete,
    List,
}

#[derive(Debug, Clone)]
struct Rule {
    call: Call,
    fragment: String,
}

#[derive(Debug, Default)]
struct Inner {
    objects: BTreeMap<String, (String, Attributes)>,
    rules: Vec<Rule>,
    log: Vec<String>,
    saved: Vec<(String, Value)>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeApic {
    inner: Arc<Mutex<Inner>>,
}

impl FakeApic {
    /// Controller with the fabric and infra roots plus tenants `t1` and `common`.
    pub fn new() -> Self {
        let fake = Self::default();
        for (dn, class) in [
            ("uni", "polUni"),
            ("uni/fabric", "fabricInst"),
            ("uni/infra", "infraInfra"),
            ("uni/tn-t1", "fvTenant"),
            ("uni/tn-common", "fvTenant"),
        ] {
            fake.insert(dn, class, Attributes::new());
        }
        fake
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::new(self.clone())
    }

    /// Place an object directly, bypassing defaults and failure rules.
    pub fn insert(&self, dn: &str, class: &str, mut attrs: Attributes) {
        attrs.insert("dn".into(), json!(dn));
        self.inner
            .lock()
            .unwrap()
            .objects
            .insert(dn.to_owned(), (class.to_owned(), attrs));
    }

    /// Mutate a stored object's attributes, as another actor would.
    pub fn tamper(&self, dn: &str, key: &str, value: &str) {
        let mut inner = self.inner.lock().unwrap();
        let (_, attrs) = inner.objects.get_mut(dn).unwrap();
        attrs.insert(key.into(), json!(value));
    }

    pub fn remove(&self, dn: &str) {
        remove_subtree(&mut self.inner.lock().unwrap().objects, dn);
    }

    pub fn exists(&self, dn: &str) -> bool {
        self.inner.lock().unwrap().objects.contains_key(dn)
    }

    pub fn attr(&self, dn: &str, key: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        let (_, attrs) = inner.objects.get(dn)?;
        attrs.get(key).and_then(Value::as_str).map(str::to_owned)
    }

    /// DNs of every stored object of `class` under `parent`.
    pub fn children(&self, parent: &str, class: &str) -> Vec<String> {
        let prefix = format!("{parent}/");
        self.inner
            .lock()
            .unwrap()
            .objects
            .iter()
            .filter(|(dn, (c, _))| c == class && dn.starts_with(&prefix))
            .map(|(dn, _)| dn.clone())
            .collect()
    }

    /// Fail every `call` whose DN contains `fragment`.
    pub fn fail_on(&self, call: Call, fragment: &str) {
        self.inner.lock().unwrap().rules.push(Rule {
            call,
            fragment: fragment.to_owned(),
        });
    }

    pub fn heal(&self) {
        self.inner.lock().unwrap().rules.clear();
    }

    /// Calls seen so far, as `"<VERB> <dn>"`.
    pub fn log(&self) -> Vec<String> {
        self.inner.lock().unwrap().log.clone()
    }

    /// Body of the most recent save to `dn`.
    pub fn last_save(&self, dn: &str) -> Option<Value> {
        let inner = self.inner.lock().unwrap();
        inner
            .saved
            .iter()
            .rev()
            .find(|(target, _)| target == dn)
            .map(|(_, body)| body.clone())
    }

    pub fn clear_log(&self) {
        self.inner.lock().unwrap().log.clear();
    }

    fn enter(&self, call: Call, verb: &str, dn: &str) -> Result<(), Error> {
        let mut inner = self.inner.lock().unwrap();
        inner.log.push(format!("{verb} {dn}"));
        if inner
            .rules
            .iter()
            .any(|r| r.call == call && dn.contains(&r.fragment))
        {
            return Err(Error::Api {
                message: format!("injected failure on {verb} {dn}"),
                code: Some("102".into()),
                status: 400,
            });
        }
        Ok(())
    }
}

fn remove_subtree(objects: &mut BTreeMap<String, (String, Attributes)>, dn: &str) {
    let prefix = format!("{dn}/");
    objects.retain(|key, _| key != dn && !key.starts_with(&prefix));
}

fn parent_of(dn: &str) -> Option<&str> {
    let mut depth = 0_i32;
    let mut split = None;
    for (idx, ch) in dn.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth -= 1,
            '/' if depth == 0 => split = Some(idx),
            _ => {}
        }
    }
    split.map(|idx| &dn[..idx])
}

/// Attributes APIC fills in on creation when the request omits them.
fn server_defaults(class: &str) -> Attributes {
    let mut attrs = Attributes::new();
    for key in ["annotation", "nameAlias", "descr"] {
        attrs.insert(key.into(), json!(""));
    }
    if class == "firmwareFwGrp" {
        attrs.insert("type".into(), json!("range"));
    }
    attrs.insert("uid".into(), json!("15374"));
    attrs
}

#[async_trait]
impl Transport for FakeApic {
    async fn get(&self, dn: &str) -> Result<Container, Error> {
        self.enter(Call::Get, "GET", dn)?;
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .objects
            .get(dn)
            .map_or_else(Container::empty, |(class, attrs)| {
                Container::from_objects([(class.clone(), attrs.clone())])
            }))
    }

    async fn save(&self, dn: &str, payload: &Value) -> Result<(), Error> {
        self.enter(Call::Save, "POST", dn)?;

        let (class, body) = payload.as_object().unwrap().iter().next().unwrap();
        let mut attrs = body["attributes"].as_object().unwrap().clone();
        assert_eq!(attrs["dn"], json!(dn), "payload dn must match target dn");

        let mut inner = self.inner.lock().unwrap();
        inner.saved.push((dn.to_owned(), payload.clone()));
        if attrs.get("status") == Some(&json!("deleted")) {
            remove_subtree(&mut inner.objects, dn);
            return Ok(());
        }
        attrs.remove("status");

        let parent = parent_of(dn).unwrap_or_default();
        if !inner.objects.contains_key(parent) {
            return Err(Error::Api {
                message: format!("Unable to find the parent {parent}"),
                code: Some("103".into()),
                status: 400,
            });
        }

        let entry = inner
            .objects
            .entry(dn.to_owned())
            .or_insert_with(|| (class.clone(), server_defaults(class)));
        entry.1.extend(attrs);
        Ok(())
    }

    async fn delete_by_dn(&self, dn: &str, _class: &str) -> Result<(), Error> {
        self.enter(Call::Delete, "DELETE", dn)?;
        remove_subtree(&mut self.inner.lock().unwrap().objects, dn);
        Ok(())
    }

    async fn list_class(&self, parent_dn: &str, class: &str) -> Result<Container, Error> {
        self.enter(Call::List, "LIST", &format!("{parent_dn}/{class}"))?;
        let prefix = format!("{parent_dn}/");
        let inner = self.inner.lock().unwrap();
        Ok(Container::from_objects(
            inner
                .objects
                .iter()
                .filter(|(dn, (c, _))| c == class && dn.starts_with(&prefix))
                .map(|(_, (c, attrs))| (c.clone(), attrs.clone())),
        ))
    }
}
