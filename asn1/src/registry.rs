//! Per-usage-site tables mapping object identifiers to symbolic names.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::OidError;
use crate::oid::ObjectIdentifier;
use crate::value::Identifier;

/// Two-way lookup between object identifiers and names. Built once, then
/// shared read-only (typically behind an `Arc`) by every schema node that
/// resolves identifiers against it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OidRegistry {
    by_oid: BTreeMap<ObjectIdentifier, String>,
    by_name: BTreeMap<String, ObjectIdentifier>,
}

impl OidRegistry {
    pub fn new() -> Self {
        OidRegistry::default()
    }

    /// Builds a registry from `(oid, name)` pairs. Identifiers may use dotted
    /// or space separated notation.
    pub fn from_entries(entries: &[(&str, &str)]) -> Result<Self, OidError> {
        let mut registry = OidRegistry::new();
        for (oid, name) in entries {
            registry.insert(ObjectIdentifier::from_str(oid)?, *name);
        }
        Ok(registry)
    }

    pub fn insert(&mut self, oid: ObjectIdentifier, name: impl Into<String>) {
        let name = name.into();
        self.by_name.insert(name.clone(), oid.clone());
        self.by_oid.insert(oid, name);
    }

    pub fn name(&self, oid: &ObjectIdentifier) -> Option<&str> {
        self.by_oid.get(oid).map(String::as_str)
    }

    pub fn oid(&self, name: &str) -> Option<&ObjectIdentifier> {
        self.by_name.get(name)
    }

    /// The registered name of `oid`, or `oid` itself when it is not registered.
    pub fn resolve(&self, oid: ObjectIdentifier) -> Identifier {
        match self.name(&oid) {
            Some(name) => Identifier::Named(name.to_string()),
            None => Identifier::Oid(oid),
        }
    }

    /// The numeric form of an identifier, looking names up in this registry.
    pub fn lookup(&self, id: &Identifier) -> Option<ObjectIdentifier> {
        match id {
            Identifier::Named(name) => self.oid(name).cloned(),
            Identifier::Oid(oid) => Some(oid.clone()),
        }
    }

    pub fn len(&self) -> usize {
        self.by_oid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_oid.is_empty()
    }
}
