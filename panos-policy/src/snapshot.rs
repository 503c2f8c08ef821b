//! Configuration snapshot backend.
//!
//! Reads a device's exported running configuration and serves objects and
//! rules out of it. Creating a rule appends the entry to the in-memory tree
//! and writes the document to the output path, in place by default.
//!
//! Layout by device kind:
//!
//! - firewall: `devices/entry/vsys/entry[@name=vsys1]` holds objects and
//!   `rulebase/security/rules`; `shared` holds objects visible to all vsys
//! - Panorama: `shared` holds global objects and the shared
//!   `pre-rulebase`; `devices/entry/device-group/entry[@name]` holds each
//!   group's objects and `pre-rulebase`

use std::path::{Path, PathBuf};

use panos_xml::{parse_file, unwrap_response, write_file, XmlNode};
use tracing::{debug, info};

use crate::device::{Device, DeviceKind, DeviceTarget, ScopeLevel};
use crate::error::PolicyError;
use crate::rule::SecurityRule;
use crate::scope::ObjectScope;

const DEFAULT_VSYS: &str = "vsys1";
const SECURITY_RULES: [&str; 2] = ["security", "rules"];

#[derive(Debug, Clone)]
pub struct SnapshotDevice {
    root: XmlNode,
    kind: DeviceKind,
    output: Option<PathBuf>,
}

impl SnapshotDevice {
    /// Parse the configuration at `path`; rule submissions write back to it.
    pub fn open(path: &Path) -> Result<Self, PolicyError> {
        let root = unwrap_response(parse_file(path)?)?;
        let mut device = Self::from_root(root)?;
        device.output = Some(path.to_path_buf());
        info!(path = %path.display(), kind = %device.kind, "opened configuration snapshot");
        Ok(device)
    }

    /// Build from an already parsed configuration with no output path.
    pub fn from_root(root: XmlNode) -> Result<Self, PolicyError> {
        if root.tag != "config" {
            return Err(PolicyError::Snapshot(format!(
                "expected <config> root element, found <{}>",
                root.tag
            )));
        }
        let kind = detect_kind(&root)?;
        Ok(Self {
            root,
            kind,
            output: None,
        })
    }

    /// Send submissions to `path` instead of the source file.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    fn device_entry(&self) -> Option<&XmlNode> {
        device_entry(&self.root)
    }

    fn vsys(&self) -> Option<&XmlNode> {
        let vsys = self.device_entry()?.get_child("vsys")?;
        vsys.entry_named(DEFAULT_VSYS)
            .or_else(|| vsys.entries().next())
    }

    fn device_group(&self, name: &str) -> Option<&XmlNode> {
        self.device_entry()?
            .get_child("device-group")?
            .entry_named(name)
    }

    /// Node holding the `security/rules` path for `target`, and that path's prefix.
    fn rulebase_owner(&self, target: &DeviceTarget) -> Result<(&XmlNode, &'static str), PolicyError> {
        match target {
            DeviceTarget::Standalone => Ok((
                self.vsys()
                    .ok_or_else(|| PolicyError::Snapshot("firewall has no vsys".to_string()))?,
                "rulebase",
            )),
            DeviceTarget::Managed { device_group: None } => Ok((
                self.root
                    .get_child("shared")
                    .ok_or_else(|| PolicyError::Snapshot("missing shared section".to_string()))?,
                "pre-rulebase",
            )),
            DeviceTarget::Managed {
                device_group: Some(name),
            } => Ok((
                self.device_group(name)
                    .ok_or_else(|| PolicyError::DeviceGroupNotFound(name.clone()))?,
                "pre-rulebase",
            )),
        }
    }

    fn rules_container_mut(&mut self, target: &DeviceTarget) -> Result<&mut XmlNode, PolicyError> {
        let (owner, prefix) = match target {
            DeviceTarget::Standalone => {
                let entry = device_entry_mut(&mut self.root)
                    .ok_or_else(|| PolicyError::Snapshot("missing devices entry".to_string()))?;
                let vsys = entry
                    .children
                    .iter_mut()
                    .find(|c| c.tag == "vsys")
                    .ok_or_else(|| PolicyError::Snapshot("firewall has no vsys".to_string()))?;
                let idx = vsys
                    .children
                    .iter()
                    .position(|c| c.tag == "entry" && c.name() == Some(DEFAULT_VSYS))
                    .or_else(|| vsys.children.iter().position(|c| c.tag == "entry"))
                    .ok_or_else(|| PolicyError::Snapshot("firewall has no vsys".to_string()))?;
                (&mut vsys.children[idx], "rulebase")
            }
            DeviceTarget::Managed { device_group: None } => {
                (self.root.ensure_child_mut("shared"), "pre-rulebase")
            }
            DeviceTarget::Managed {
                device_group: Some(name),
            } => {
                let group = device_entry_mut(&mut self.root)
                    .and_then(|e| e.children.iter_mut().find(|c| c.tag == "device-group"))
                    .and_then(|g| g.entry_named_mut(name))
                    .ok_or_else(|| PolicyError::DeviceGroupNotFound(name.clone()))?;
                (group, "pre-rulebase")
            }
        };
        Ok(owner.ensure_path_mut(&[prefix, SECURITY_RULES[0], SECURITY_RULES[1]]))
    }
}

impl Device for SnapshotDevice {
    fn kind(&self) -> DeviceKind {
        self.kind
    }

    fn device_groups(&self) -> Vec<String> {
        self.device_entry()
            .and_then(|e| e.get_child("device-group"))
            .map(|groups| {
                groups
                    .entries()
                    .filter_map(XmlNode::name)
                    .map(ToOwned::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn load_scope(&self, level: &ScopeLevel) -> Result<ObjectScope, PolicyError> {
        let shared = self.root.get_child("shared");
        match (level, self.kind) {
            (ScopeLevel::Global, DeviceKind::Firewall) => {
                let mut containers = Vec::new();
                containers.extend(self.vsys());
                containers.extend(shared);
                Ok(ObjectScope::load("global", &containers))
            }
            (ScopeLevel::Global, DeviceKind::Panorama) => {
                Ok(ObjectScope::load("global", &shared.into_iter().collect::<Vec<_>>()))
            }
            (ScopeLevel::DeviceGroup(name), DeviceKind::Panorama) => {
                let group = self
                    .device_group(name)
                    .ok_or_else(|| PolicyError::DeviceGroupNotFound(name.clone()))?;
                Ok(ObjectScope::load(format!("device-group:{name}"), &[group]))
            }
            (ScopeLevel::DeviceGroup(name), DeviceKind::Firewall) => Err(
                PolicyError::Snapshot(format!("firewall has no device group '{name}'")),
            ),
        }
    }

    fn rule_entries(&self, target: &DeviceTarget) -> Result<Vec<XmlNode>, PolicyError> {
        let (owner, prefix) = self.rulebase_owner(target)?;
        let Some(rules) = owner.get_path(&[prefix, SECURITY_RULES[0], SECURITY_RULES[1]]) else {
            debug!(rulebase = %target, "rulebase has no security rules");
            return Ok(Vec::new());
        };
        Ok(rules.entries().cloned().collect())
    }

    fn create_rule(
        &mut self,
        target: &DeviceTarget,
        rule: &SecurityRule,
    ) -> Result<(), PolicyError> {
        let output = self
            .output
            .clone()
            .ok_or_else(|| PolicyError::Submit("snapshot has no output path".to_string()))?;
        self.rules_container_mut(target)?
            .children
            .push(rule.to_xml());
        write_file(&self.root, &output)?;
        info!(rule = %rule.name, rulebase = %target, path = %output.display(), "rule submitted");
        Ok(())
    }
}

fn device_entry(root: &XmlNode) -> Option<&XmlNode> {
    root.get_child("devices")?.entries().next()
}

fn device_entry_mut(root: &mut XmlNode) -> Option<&mut XmlNode> {
    root.children
        .iter_mut()
        .find(|c| c.tag == "devices")?
        .children
        .iter_mut()
        .find(|c| c.tag == "entry")
}

fn detect_kind(root: &XmlNode) -> Result<DeviceKind, PolicyError> {
    let entry = device_entry(root);
    if entry.is_some_and(|e| e.get_child("vsys").is_some()) {
        return Ok(DeviceKind::Firewall);
    }
    if entry.is_some_and(|e| e.get_child("device-group").is_some())
        || root.get_path(&["shared", "pre-rulebase"]).is_some()
        || root.get_child("panorama").is_some()
    {
        return Ok(DeviceKind::Panorama);
    }
    Err(PolicyError::Snapshot(
        "cannot tell firewall from Panorama: no vsys or device-group found".to_string(),
    ))
}
