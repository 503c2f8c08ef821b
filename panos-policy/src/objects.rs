//! Address, service and tag objects read from a PAN-OS configuration.
//!
//! Each type is built from an `<entry name="...">` element of the matching
//! container (`address`, `address-group`, `service`, `service-group`, `tag`).
//! Values are kept as the device stores them; parsing into networks or port
//! numbers happens when a rule is matched.

use std::fmt::{self, Display, Formatter};
use std::net::IpAddr;
use std::str::FromStr;

use ipnetwork::IpNetwork;
use panos_xml::XmlNode;
use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

/// The value an address object carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "type", content = "value")]
pub enum AddressKind {
    /// `address/mask` or a bare address.
    IpNetmask(String),
    /// `lower-upper`.
    IpRange(String),
    Fqdn(String),
    IpWildcard(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressObject {
    pub name: String,
    pub kind: AddressKind,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

impl AddressObject {
    /// Build from an `<address><entry>` element; `None` if it has no usable value.
    pub fn from_entry(entry: &XmlNode) -> Option<Self> {
        let name = entry.name()?.to_string();
        let kind = if let Some(v) = entry.get_text(&["ip-netmask"]) {
            AddressKind::IpNetmask(v.to_string())
        } else if let Some(v) = entry.get_text(&["ip-range"]) {
            AddressKind::IpRange(v.to_string())
        } else if let Some(v) = entry.get_text(&["fqdn"]) {
            AddressKind::Fqdn(v.to_string())
        } else if let Some(v) = entry.get_text(&["ip-wildcard"]) {
            AddressKind::IpWildcard(v.to_string())
        } else {
            return None;
        };
        Some(Self {
            name,
            kind,
            description: entry.get_text(&["description"]).map(ToOwned::to_owned),
            tags: entry.members("tag"),
        })
    }

    /// An unnamed object standing in for a literal network in a rule.
    pub fn anonymous(network: IpNetwork) -> Self {
        Self {
            name: network.to_string(),
            kind: AddressKind::IpNetmask(network.to_string()),
            description: None,
            tags: Vec::new(),
        }
    }

    /// Whether `ip` falls inside this object.
    ///
    /// Netmask objects test network membership. Range bounds are exclusive:
    /// `10.0.0.10-10.0.0.20` does not contain `10.0.0.10`. FQDN and wildcard
    /// objects, and values that do not parse, never contain anything.
    pub fn contains(&self, ip: IpAddr) -> bool {
        match &self.kind {
            AddressKind::IpNetmask(value) => value
                .trim()
                .parse::<IpNetwork>()
                .is_ok_and(|net| net.contains(ip)),
            AddressKind::IpRange(value) => {
                let Some((lower, upper)) = parse_range(value) else {
                    return false;
                };
                same_family(lower, ip) && same_family(upper, ip) && lower < ip && ip < upper
            }
            AddressKind::Fqdn(_) | AddressKind::IpWildcard(_) => false,
        }
    }
}

fn parse_range(value: &str) -> Option<(IpAddr, IpAddr)> {
    let (lower, upper) = value.split_once('-')?;
    Some((lower.trim().parse().ok()?, upper.trim().parse().ok()?))
}

fn same_family(a: IpAddr, b: IpAddr) -> bool {
    a.is_ipv4() == b.is_ipv4()
}

/// Static or dynamic address group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressGroup {
    pub name: String,
    /// Member names for a static group; empty for a dynamic one.
    pub static_members: Vec<String>,
    /// Tag filter expression of a dynamic group.
    pub dynamic_filter: Option<String>,
}

impl AddressGroup {
    pub fn from_entry(entry: &XmlNode) -> Option<Self> {
        Some(Self {
            name: entry.name()?.to_string(),
            static_members: entry.members("static"),
            dynamic_filter: entry
                .get_text(&["dynamic", "filter"])
                .map(ToOwned::to_owned),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

impl Display for Protocol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            other => Err(PolicyError::invalid_rule(
                "protocol",
                format!("'{other}' is not tcp or udp"),
            )),
        }
    }
}

/// Which end of a session a port or address criterion refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Destination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceObject {
    pub name: String,
    pub protocol: Protocol,
    /// Comma separated ports and `lower-upper` ranges.
    pub destination_port: String,
    pub source_port: Option<String>,
    pub description: Option<String>,
}

impl ServiceObject {
    /// Build from a `<service><entry>` element.
    ///
    /// Exactly one of `protocol/tcp` or `protocol/udp` is expected; anything
    /// else (for example SCTP on newer releases) is skipped.
    pub fn from_entry(entry: &XmlNode) -> Option<Self> {
        let name = entry.name()?.to_string();
        let protocol_node = entry.get_child("protocol")?;
        let (protocol, body) = if let Some(tcp) = protocol_node.get_child("tcp") {
            (Protocol::Tcp, tcp)
        } else if let Some(udp) = protocol_node.get_child("udp") {
            (Protocol::Udp, udp)
        } else {
            return None;
        };
        Some(Self {
            name,
            protocol,
            destination_port: body.get_text(&["port"])?.to_string(),
            source_port: body.get_text(&["source-port"]).map(ToOwned::to_owned),
            description: entry.get_text(&["description"]).map(ToOwned::to_owned),
        })
    }

    pub fn port_spec(&self, side: Side) -> Option<&str> {
        match side {
            Side::Source => self.source_port.as_deref(),
            Side::Destination => Some(self.destination_port.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceGroup {
    pub name: String,
    pub members: Vec<String>,
}

impl ServiceGroup {
    pub fn from_entry(entry: &XmlNode) -> Option<Self> {
        Some(Self {
            name: entry.name()?.to_string(),
            members: entry.members("members"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub name: String,
    pub color: Option<String>,
    pub comments: Option<String>,
}

impl Tag {
    pub fn from_entry(entry: &XmlNode) -> Option<Self> {
        Some(Self {
            name: entry.name()?.to_string(),
            color: entry.get_text(&["color"]).map(ToOwned::to_owned),
            comments: entry.get_text(&["comments"]).map(ToOwned::to_owned),
        })
    }
}
