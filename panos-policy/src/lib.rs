//! Security policy management for PAN-OS firewalls and Panorama.
//!
//! Two operations are provided: adding a security rule to a rulebase, and
//! querying a rulebase for the rules that match a set of traffic criteria.
//! Both run against a [`device::Device`], either a standalone firewall or a
//! Panorama manager where rules live in the pre-rulebase of a device group
//! (or the shared pre-rulebase when no group is named).
//!
//! # Architecture
//!
//! ## Device access
//!
//! - [`device`]: device kinds, rulebase targets, connection parameters
//! - [`snapshot`]: backend reading and writing an exported running config
//!
//! ## Policy model
//!
//! - [`objects`]: address, service and tag objects and their groups
//! - [`scope`]: ordered object scopes used to resolve rule references
//! - [`rule`]: security rules and the typed [`rule::RuleSpec`] used to create them
//!
//! ## Operations
//!
//! - [`matcher`]: per-rule match predicate (zones, addresses, ports, tag)
//! - [`query`]: filter a rulebase by [`matcher::Criteria`]
//! - [`create`]: build and submit a new rule
//!
//! ## Reporting and configuration
//!
//! - [`report`]: colored terminal output and JSON report documents
//! - [`settings`]: optional TOML settings file
//! - [`error`]: error taxonomy
//!
//! # Examples
//!
//! ```ignore
//! use panos_policy::device::{connect, Connection};
//! use panos_policy::matcher::{Criteria, PortQuery};
//! use panos_policy::objects::Protocol;
//! use panos_policy::query::run_query;
//!
//! let device = connect(&Connection::new("panorama-running.xml"))?;
//! let criteria = Criteria {
//!     source_zone: Some("trust".to_string()),
//!     destination_port: Some(PortQuery::new("22", Protocol::Tcp)?),
//!     ..Criteria::default()
//! };
//! let outcome = run_query(&device, Some("DeviceGroupB"), &criteria)?;
//! println!("{}", outcome.message());
//! ```
//!
//! # Built on panos-xml
//!
//! Configuration documents are parsed into `panos_xml::XmlNode` trees. All
//! policy semantics live in this crate.

pub mod create;
pub mod device;
pub mod error;
pub mod matcher;
pub mod objects;
pub mod query;
pub mod report;
pub mod rule;
pub mod scope;
pub mod settings;
pub mod snapshot;
