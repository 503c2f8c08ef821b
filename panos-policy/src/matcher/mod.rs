//! Rule filter predicate.
//!
//! A rule is a hit when every supplied criterion matches; criteria left unset
//! are not part of the conjunction, so an empty [`Criteria`] matches every
//! rule. Per criterion:
//!
//! - **zone**: the rule's zone list holds `any` or the queried zone
//! - **address**: see [`address::addresses_contain`]
//! - **port**: see [`service::services_contain`]; each side needs a protocol
//! - **tag**: one of the rule's tags resolves to a tag of the queried name
//!
//! Evaluation is pure; the only failure is a malformed port number.

mod address;
mod service;

#[cfg(test)]
mod tests;

use std::net::IpAddr;

use serde::Serialize;
use tracing::trace;

use crate::error::PolicyError;
use crate::objects::{Protocol, Side};
use crate::rule::{SecurityRule, ANY};
use crate::scope::ObjectResolver;

pub use address::addresses_contain;
pub use service::services_contain;

/// A queried port together with the protocol it must be reached over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortQuery {
    /// Port as supplied; single-port elements compare against this text.
    pub port: String,
    pub number: u16,
    pub protocol: Protocol,
}

impl PortQuery {
    /// Validate `port` as a number; a malformed port fails the whole query.
    pub fn new(port: impl Into<String>, protocol: Protocol) -> Result<Self, PolicyError> {
        let raw = port.into();
        let port = raw.trim().to_string();
        let number = port
            .parse::<u16>()
            .map_err(|_| PolicyError::InvalidPort(raw))?;
        Ok(Self {
            port,
            number,
            protocol,
        })
    }
}

/// Optional match dimensions; `None` means "not part of the query".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Criteria {
    pub source_zone: Option<String>,
    pub destination_zone: Option<String>,
    pub source_ip: Option<IpAddr>,
    pub destination_ip: Option<IpAddr>,
    pub source_port: Option<PortQuery>,
    pub destination_port: Option<PortQuery>,
    pub tag: Option<String>,
}

impl Criteria {
    pub fn is_empty(&self) -> bool {
        self == &Criteria::default()
    }
}

/// Whether `rule` satisfies every supplied criterion.
pub fn rule_matches<R: ObjectResolver + ?Sized>(
    rule: &SecurityRule,
    criteria: &Criteria,
    resolver: &R,
) -> Result<bool, PolicyError> {
    let mut results = Vec::new();

    if let Some(zone) = &criteria.source_zone {
        results.push(("source_zone", zone_matches(&rule.from_zones, zone)));
    }
    if let Some(zone) = &criteria.destination_zone {
        results.push(("destination_zone", zone_matches(&rule.to_zones, zone)));
    }
    if let Some(ip) = criteria.source_ip {
        results.push(("source_ip", addresses_contain(&rule.source, ip, resolver)));
    }
    if let Some(ip) = criteria.destination_ip {
        results.push((
            "destination_ip",
            addresses_contain(&rule.destination, ip, resolver),
        ));
    }
    if let Some(query) = &criteria.source_port {
        results.push((
            "source_port",
            services_contain(&rule.service, Side::Source, query, resolver)?,
        ));
    }
    if let Some(query) = &criteria.destination_port {
        results.push((
            "destination_port",
            services_contain(&rule.service, Side::Destination, query, resolver)?,
        ));
    }
    if let Some(tag) = &criteria.tag {
        results.push(("tag", tag_matches(&rule.tags, tag, resolver)));
    }

    trace!(rule = %rule.name, ?results, "evaluated rule");
    Ok(results.iter().all(|(_, hit)| *hit))
}

/// `any` in the rule's zone list always matches.
pub fn zone_matches(zones: &[String], zone: &str) -> bool {
    zones.iter().any(|z| z == ANY || z == zone)
}

pub fn tag_matches<R: ObjectResolver + ?Sized>(tags: &[String], tag: &str, resolver: &R) -> bool {
    tags.iter()
        .filter_map(|name| resolver.resolve_tag(name))
        .any(|resolved| resolved.name == tag)
}
