//! Extension dispatch: choosing the schema of an OCTET STRING's contents from
//! a sibling field that was decoded before it.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::registry::OidRegistry;
use crate::schema::NodeId;
use crate::value::{Fields, Identifier, Value};

/// Immutable table from discriminant to nested schema.
///
/// Keys are registry names for identifiers that have one, the dotted form for
/// unnamed identifiers, the symbol of named integers and the decimal form of
/// plain integers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dispatch {
    field: String,
    registry: Option<Arc<OidRegistry>>,
    routes: BTreeMap<String, NodeId>,
}

impl Dispatch {
    /// Dispatches on the sibling field `field`.
    pub fn on(field: impl Into<String>) -> Self {
        Dispatch {
            field: field.into(),
            ..Default::default()
        }
    }

    /// Normalizes numeric identifiers to their registered names before lookup.
    pub fn with_registry(mut self, registry: Arc<OidRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn route(mut self, key: impl Into<String>, node: NodeId) -> Self {
        self.routes.insert(key.into(), node);
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn routes(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.routes.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// The key of the discriminant in `scope`, if the field is there and has
    /// a usable form.
    pub fn discriminant(&self, scope: Option<&Fields>) -> Option<String> {
        match scope?.get(&self.field)? {
            Value::ObjectIdentifier(Identifier::Named(name)) => Some(name.clone()),
            Value::ObjectIdentifier(Identifier::Oid(oid)) => Some(
                self.registry
                    .as_ref()
                    .and_then(|r| r.name(oid))
                    .map_or_else(|| oid.to_string(), str::to_string),
            ),
            Value::Symbol(s) | Value::String(s) => Some(s.clone()),
            Value::Integer(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn resolve(&self, scope: Option<&Fields>) -> Option<NodeId> {
        let key = self.discriminant(scope)?;
        self.routes.get(&key).copied()
    }
}
