//! Device targets and rulebase resolution.
//!
//! A [`Device`] is either a standalone firewall or a Panorama manager. The
//! caller picks a [`DeviceTarget`] with [`resolve_target`], which checks the
//! requested device group, and [`load_rulebase`] then snapshots every object
//! scope the target can see together with its ordered rules.

use std::fmt::{self, Debug, Display, Formatter};
use std::path::{Path, PathBuf};

use panos_xml::XmlNode;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::PolicyError;
use crate::rule::SecurityRule;
use crate::scope::{ObjectScope, ScopeChain};
use crate::snapshot::SnapshotDevice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Firewall,
    Panorama,
}

impl Display for DeviceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Firewall => f.write_str("firewall"),
            DeviceKind::Panorama => f.write_str("panorama"),
        }
    }
}

/// Where rules are read from and written to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum DeviceTarget {
    /// The firewall's own rulebase.
    Standalone,
    /// A Panorama pre-rulebase: the named device group's, or the shared one.
    Managed { device_group: Option<String> },
}

impl Display for DeviceTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DeviceTarget::Standalone => f.write_str("firewall rulebase"),
            DeviceTarget::Managed { device_group: None } => f.write_str("shared pre-rulebase"),
            DeviceTarget::Managed {
                device_group: Some(group),
            } => write!(f, "device group '{group}' pre-rulebase"),
        }
    }
}

/// Object scope levels a device exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeLevel {
    Global,
    DeviceGroup(String),
}

/// The external device holding the authoritative configuration.
pub trait Device {
    fn kind(&self) -> DeviceKind;

    /// Names of the device groups known to a manager; empty on a firewall.
    fn device_groups(&self) -> Vec<String>;

    /// Every address, service and tag object defined at `level`.
    fn load_scope(&self, level: &ScopeLevel) -> Result<ObjectScope, PolicyError>;

    /// The device's own `<entry>` elements for the security rules of
    /// `target`, in rulebase order.
    fn rule_entries(&self, target: &DeviceTarget) -> Result<Vec<XmlNode>, PolicyError>;

    /// Security rules of `target` in rulebase order.
    fn rules(&self, target: &DeviceTarget) -> Result<Vec<SecurityRule>, PolicyError> {
        self.rule_entries(target)?
            .iter()
            .map(SecurityRule::from_entry)
            .collect()
    }

    /// Append `rule` to the rulebase of `target` and submit it to the device.
    fn create_rule(&mut self, target: &DeviceTarget, rule: &SecurityRule)
        -> Result<(), PolicyError>;
}

/// Pick the rulebase target for `device`.
///
/// On a manager a supplied device group must exist under exactly that name.
pub fn resolve_target<D: Device + ?Sized>(
    device: &D,
    device_group: Option<&str>,
) -> Result<DeviceTarget, PolicyError> {
    match device.kind() {
        DeviceKind::Firewall => {
            if let Some(group) = device_group {
                warn!(device_group = group, "device group ignored for a standalone firewall");
            }
            Ok(DeviceTarget::Standalone)
        }
        DeviceKind::Panorama => {
            let Some(group) = device_group else {
                return Ok(DeviceTarget::Managed { device_group: None });
            };
            if !device.device_groups().iter().any(|g| g == group) {
                return Err(PolicyError::DeviceGroupNotFound(group.to_string()));
            }
            Ok(DeviceTarget::Managed {
                device_group: Some(group.to_string()),
            })
        }
    }
}

/// Rules of one target plus the scopes used to resolve their references.
#[derive(Debug, Clone)]
pub struct Rulebase {
    pub target: DeviceTarget,
    pub rules: Vec<SecurityRule>,
    /// Device elements the rules were read from; `entries[i]` backs `rules[i]`.
    pub entries: Vec<XmlNode>,
    pub scopes: ScopeChain,
}

/// Load every scope visible from `target`, then its rules.
pub fn load_rulebase<D: Device + ?Sized>(
    device: &D,
    target: &DeviceTarget,
) -> Result<Rulebase, PolicyError> {
    let mut levels = vec![ScopeLevel::Global];
    if let DeviceTarget::Managed {
        device_group: Some(group),
    } = target
    {
        levels.push(ScopeLevel::DeviceGroup(group.clone()));
    }

    let scopes = levels
        .iter()
        .map(|level| device.load_scope(level))
        .collect::<Result<Vec<_>, _>>()?;
    let scopes = ScopeChain::new(scopes);
    let entries = device.rule_entries(target)?;
    let rules = entries
        .iter()
        .map(SecurityRule::from_entry)
        .collect::<Result<Vec<_>, _>>()?;
    info!(
        rulebase = %target,
        rules = rules.len(),
        scopes = ?scopes.labels(),
        objects = scopes.scopes().iter().map(ObjectScope::object_count).sum::<usize>(),
        "loaded rulebase"
    );
    Ok(Rulebase {
        target: target.clone(),
        rules,
        entries,
        scopes,
    })
}

/// Credentials for the management interface.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Password { username: String, password: String },
    ApiKey(String),
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credentials::ApiKey(_) => f.debug_tuple("ApiKey").field(&"<redacted>").finish(),
        }
    }
}

const SNAPSHOT_SCHEME: &str = "file://";

/// How to reach a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// Configuration snapshot path, `file://` URL, or management address.
    pub address: String,
    pub credentials: Option<Credentials>,
}

impl Connection {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            credentials: None,
        }
    }

    /// Connection to the configuration snapshot at `path`, whatever its name.
    pub fn snapshot(path: &Path) -> Self {
        Self::new(format!("{SNAPSHOT_SCHEME}{}", path.display()))
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// The snapshot path selected by the address, if it names one.
    ///
    /// `file://` URLs and anything that looks like a path (contains a
    /// separator or ends in `.xml`) select a snapshot; bare host names and
    /// IP addresses select the management API.
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        let address = self.address.trim();
        if let Some(path) = address.strip_prefix(SNAPSHOT_SCHEME) {
            return Some(PathBuf::from(path));
        }
        if address.contains(std::path::MAIN_SEPARATOR)
            || address.contains('/')
            || address.to_ascii_lowercase().ends_with(".xml")
        {
            return Some(PathBuf::from(address));
        }
        None
    }
}

/// Open the device named by `connection`.
pub fn connect(connection: &Connection) -> Result<SnapshotDevice, PolicyError> {
    if connection.address.trim().is_empty() {
        return Err(PolicyError::MissingConnection);
    }
    let Some(path) = connection.snapshot_path() else {
        return Err(PolicyError::UnsupportedTransport(
            connection.address.clone(),
        ));
    };
    if connection.credentials.is_some() {
        debug!("credentials are not used when reading a configuration snapshot");
    }
    SnapshotDevice::open(&path)
}
