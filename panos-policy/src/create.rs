//! Rule creation pipeline: resolve the target, build the rule, submit it.

use tracing::{info, warn};

use crate::device::{resolve_target, Device, DeviceTarget};
use crate::error::PolicyError;
use crate::rule::RuleSpec;

/// Result of adding one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub target: DeviceTarget,
    pub rule_name: String,
    pub changed: bool,
    pub message: String,
}

/// Build the rule described by `spec` and append it to the target rulebase.
///
/// A rule with the same name already in the rulebase is reported in the log
/// only; the new rule is submitted regardless and the device decides.
pub fn add_rule<D: Device + ?Sized>(
    device: &mut D,
    device_group: Option<&str>,
    spec: RuleSpec,
) -> Result<AddOutcome, PolicyError> {
    let target = resolve_target(device, device_group)?;
    if matches!(target, DeviceTarget::Managed { device_group: None }) {
        warn!("no device group given; the rule goes to the shared pre-rulebase");
    }
    let rule = spec.build()?;

    let existing = device.rule_entries(&target)?;
    if existing.iter().any(|e| e.name() == Some(rule.name.as_str())) {
        warn!(rule = %rule.name, rulebase = %target, "a rule with this name already exists");
    }

    device.create_rule(&target, &rule)?;
    info!(rule = %rule.name, rulebase = %target, "rule added");
    Ok(AddOutcome {
        message: format!("Rule '{}' successfully added", rule.name),
        rule_name: rule.name,
        changed: true,
        target,
    })
}
