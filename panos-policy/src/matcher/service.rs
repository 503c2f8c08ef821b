use std::collections::BTreeSet;

use crate::error::PolicyError;
use crate::objects::{ServiceGroup, ServiceObject, Side};
use crate::rule::{ANY, APPLICATION_DEFAULT};
use crate::scope::{ObjectResolver, ServiceRef};

use super::PortQuery;

/// Whether a rule's service list admits `query` on `side`.
///
/// `any` matches everything. `application-default` never matches: the ports
/// an application uses by default are not modelled. Unresolved service names
/// contribute no match.
pub fn services_contain<R: ObjectResolver + ?Sized>(
    services: &[String],
    side: Side,
    query: &PortQuery,
    resolver: &R,
) -> Result<bool, PolicyError> {
    if services.iter().any(|s| s == ANY) {
        return Ok(true);
    }
    if services.iter().any(|s| s == APPLICATION_DEFAULT) {
        return Ok(false);
    }

    let mut hit = false;
    for name in services {
        hit |= match resolver.resolve_service(name) {
            Some(ServiceRef::Object(obj)) => port_in_service(obj, side, query)?,
            Some(ServiceRef::Group(group)) => {
                group_contains(group, side, query, resolver, &mut BTreeSet::new())?
            }
            None => false,
        };
    }
    Ok(hit)
}

fn group_contains<'a, R: ObjectResolver + ?Sized>(
    group: &'a ServiceGroup,
    side: Side,
    query: &PortQuery,
    resolver: &'a R,
    visited: &mut BTreeSet<&'a str>,
) -> Result<bool, PolicyError> {
    if !visited.insert(group.name.as_str()) {
        return Ok(false);
    }
    let mut hit = false;
    for member in &group.members {
        hit |= match resolver.resolve_service(member) {
            Some(ServiceRef::Object(obj)) => port_in_service(obj, side, query)?,
            Some(ServiceRef::Group(inner)) => group_contains(inner, side, query, resolver, visited)?,
            None => false,
        };
    }
    Ok(hit)
}

/// Test one service object's port spec for `side`.
///
/// Range elements (`lower-upper`) match strictly between the bounds; single
/// elements match the queried port text exactly. The protocol must be equal
/// in both cases. Malformed range bounds are an error.
pub(crate) fn port_in_service(
    obj: &ServiceObject,
    side: Side,
    query: &PortQuery,
) -> Result<bool, PolicyError> {
    let Some(spec) = obj.port_spec(side) else {
        return Ok(false);
    };
    let same_protocol = obj.protocol == query.protocol;

    let mut hit = false;
    for element in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        if let Some((lower, upper)) = element.split_once('-') {
            let lower = parse_bound(lower, element)?;
            let upper = parse_bound(upper, element)?;
            let port = u32::from(query.number);
            hit |= same_protocol && lower < port && port < upper;
        } else {
            hit |= same_protocol && element == query.port;
        }
    }
    Ok(hit)
}

fn parse_bound(raw: &str, element: &str) -> Result<u32, PolicyError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| PolicyError::InvalidPort(element.to_string()))
}
