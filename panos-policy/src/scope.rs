//! Object lookup scopes.
//!
//! A scope is a snapshot of every named object defined at one level of the
//! configuration. Scopes are consulted in order (global first, then the
//! device group) and the first hit wins. Inside a scope plain objects are
//! checked before groups.

use std::collections::BTreeMap;

use panos_xml::XmlNode;
use tracing::debug;

use crate::objects::{AddressGroup, AddressObject, ServiceGroup, ServiceObject, Tag};

/// A name resolved in the address namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressRef<'a> {
    Object(&'a AddressObject),
    Group(&'a AddressGroup),
}

/// A name resolved in the service namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceRef<'a> {
    Object(&'a ServiceObject),
    Group(&'a ServiceGroup),
}

/// Name lookups used by the rule matcher.
pub trait ObjectResolver {
    fn resolve_address(&self, name: &str) -> Option<AddressRef<'_>>;
    fn resolve_service(&self, name: &str) -> Option<ServiceRef<'_>>;
    fn resolve_tag(&self, name: &str) -> Option<&Tag>;
}

/// All objects defined at one configuration level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectScope {
    pub label: String,
    addresses: BTreeMap<String, AddressObject>,
    address_groups: BTreeMap<String, AddressGroup>,
    services: BTreeMap<String, ServiceObject>,
    service_groups: BTreeMap<String, ServiceGroup>,
    tags: BTreeMap<String, Tag>,
}

impl ObjectScope {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Load a scope from one or more configuration containers.
    ///
    /// Containers are read in order; when two define the same name the
    /// earlier definition is kept.
    pub fn load(label: impl Into<String>, containers: &[&XmlNode]) -> Self {
        let mut scope = Self::new(label);
        for container in containers {
            scope.absorb(container);
        }
        debug!(
            scope = %scope.label,
            addresses = scope.addresses.len(),
            address_groups = scope.address_groups.len(),
            services = scope.services.len(),
            service_groups = scope.service_groups.len(),
            tags = scope.tags.len(),
            "loaded object scope"
        );
        scope
    }

    fn absorb(&mut self, container: &XmlNode) {
        collect(container, "address", AddressObject::from_entry, &mut self.addresses, |o| &o.name);
        collect(
            container,
            "address-group",
            AddressGroup::from_entry,
            &mut self.address_groups,
            |g| &g.name,
        );
        collect(container, "service", ServiceObject::from_entry, &mut self.services, |o| &o.name);
        collect(
            container,
            "service-group",
            ServiceGroup::from_entry,
            &mut self.service_groups,
            |g| &g.name,
        );
        collect(container, "tag", Tag::from_entry, &mut self.tags, |t| &t.name);
    }

    pub fn add_address(&mut self, obj: AddressObject) {
        self.addresses.entry(obj.name.clone()).or_insert(obj);
    }

    pub fn add_address_group(&mut self, group: AddressGroup) {
        self.address_groups.entry(group.name.clone()).or_insert(group);
    }

    pub fn add_service(&mut self, obj: ServiceObject) {
        self.services.entry(obj.name.clone()).or_insert(obj);
    }

    pub fn add_service_group(&mut self, group: ServiceGroup) {
        self.service_groups.entry(group.name.clone()).or_insert(group);
    }

    pub fn add_tag(&mut self, tag: Tag) {
        self.tags.entry(tag.name.clone()).or_insert(tag);
    }

    pub fn object_count(&self) -> usize {
        self.addresses.len()
            + self.address_groups.len()
            + self.services.len()
            + self.service_groups.len()
            + self.tags.len()
    }
}

fn collect<T>(
    container: &XmlNode,
    tag: &str,
    build: fn(&XmlNode) -> Option<T>,
    into: &mut BTreeMap<String, T>,
    name_of: fn(&T) -> &String,
) {
    let Some(list) = container.get_child(tag) else {
        return;
    };
    for entry in list.entries() {
        match build(entry) {
            Some(item) => {
                let name = name_of(&item).clone();
                into.entry(name).or_insert(item);
            }
            None => debug!(
                kind = tag,
                name = entry.name().unwrap_or("<unnamed>"),
                "skipping object without a usable value"
            ),
        }
    }
}

impl ObjectResolver for ObjectScope {
    fn resolve_address(&self, name: &str) -> Option<AddressRef<'_>> {
        self.addresses
            .get(name)
            .map(AddressRef::Object)
            .or_else(|| self.address_groups.get(name).map(AddressRef::Group))
    }

    fn resolve_service(&self, name: &str) -> Option<ServiceRef<'_>> {
        self.services
            .get(name)
            .map(ServiceRef::Object)
            .or_else(|| self.service_groups.get(name).map(ServiceRef::Group))
    }

    fn resolve_tag(&self, name: &str) -> Option<&Tag> {
        self.tags.get(name)
    }
}

/// Ordered list of scopes, highest priority first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeChain {
    scopes: Vec<ObjectScope>,
}

impl ScopeChain {
    pub fn new(scopes: Vec<ObjectScope>) -> Self {
        Self { scopes }
    }

    pub fn scopes(&self) -> &[ObjectScope] {
        &self.scopes
    }

    pub fn labels(&self) -> Vec<&str> {
        self.scopes.iter().map(|s| s.label.as_str()).collect()
    }
}

impl ObjectResolver for ScopeChain {
    fn resolve_address(&self, name: &str) -> Option<AddressRef<'_>> {
        self.scopes.iter().find_map(|s| s.resolve_address(name))
    }

    fn resolve_service(&self, name: &str) -> Option<ServiceRef<'_>> {
        self.scopes.iter().find_map(|s| s.resolve_service(name))
    }

    fn resolve_tag(&self, name: &str) -> Option<&Tag> {
        self.scopes.iter().find_map(|s| s.resolve_tag(name))
    }
}
