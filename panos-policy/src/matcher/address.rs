use std::collections::BTreeSet;
use std::net::IpAddr;

use ipnetwork::IpNetwork;
use tracing::debug;

use crate::objects::{AddressGroup, AddressObject};
use crate::rule::ANY;
use crate::scope::{AddressRef, ObjectResolver};

/// Whether any token of a rule's address list contains `ip`.
///
/// Tokens resolve through the scope chain. A token that names no object but
/// parses as a network is an anonymous netmask object; anything else is
/// skipped and contributes no match.
pub fn addresses_contain<R: ObjectResolver + ?Sized>(
    tokens: &[String],
    ip: IpAddr,
    resolver: &R,
) -> bool {
    if tokens.iter().any(|t| t == ANY) {
        return true;
    }

    let mut hit = false;
    for token in tokens {
        let matched = match resolver.resolve_address(token) {
            Some(AddressRef::Object(obj)) => obj.contains(ip),
            Some(AddressRef::Group(group)) => {
                group_contains(group, ip, resolver, &mut BTreeSet::new())
            }
            None => match token.parse::<IpNetwork>() {
                Ok(network) => AddressObject::anonymous(network).contains(ip),
                Err(_) => {
                    debug!(token = %token, "address token is neither an object nor a network");
                    continue;
                }
            },
        };
        hit |= matched;
    }
    hit
}

/// Member-wise containment for a static group, following nested groups.
///
/// `visited` holds group names already expanded on this path; a group that
/// refers back to itself contributes nothing the second time.
fn group_contains<'a, R: ObjectResolver + ?Sized>(
    group: &'a AddressGroup,
    ip: IpAddr,
    resolver: &'a R,
    visited: &mut BTreeSet<&'a str>,
) -> bool {
    if !visited.insert(group.name.as_str()) {
        return false;
    }
    group
        .static_members
        .iter()
        .any(|member| match resolver.resolve_address(member) {
            Some(AddressRef::Object(obj)) => obj.contains(ip),
            Some(AddressRef::Group(inner)) => group_contains(inner, ip, resolver, visited),
            None => false,
        })
}
