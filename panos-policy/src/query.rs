//! Rule query pipeline: resolve the target, snapshot its objects and rules,
//! then collect every rule the criteria match.

use panos_xml::{to_json, XmlNode};
use serde_json::Value;
use tracing::info;

use crate::device::{load_rulebase, resolve_target, Device, DeviceTarget, Rulebase};
use crate::error::PolicyError;
use crate::matcher::{rule_matches, Criteria};
use crate::rule::SecurityRule;

/// A matching rule together with the device element it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleHit {
    pub rule: SecurityRule,
    pub entry: XmlNode,
}

/// Result of one query run.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub target: DeviceTarget,
    /// Rules evaluated.
    pub total: usize,
    /// Matching rules in rulebase order.
    pub hits: Vec<RuleHit>,
}

impl QueryOutcome {
    pub fn message(&self) -> String {
        format!("{} of {} rules matched", self.hits.len(), self.total)
    }

    /// The device's own elements for the matching rules, as a
    /// `<security><rules>` element.
    pub fn hits_xml(&self) -> XmlNode {
        let mut rules = XmlNode::new("rules");
        rules.children = self.hits.iter().map(|hit| hit.entry.clone()).collect();
        let mut security = XmlNode::new("security");
        security.children.push(rules);
        security
    }

    /// [`QueryOutcome::hits_xml`] rendered as JSON.
    pub fn hits_json(&self) -> Value {
        to_json(&self.hits_xml())
    }
}

/// Every rule of `rulebase` that matches `criteria`, in order.
///
/// Each rule is evaluated independently; a match on one rule never cuts the
/// scan short.
pub fn filter_rules(rulebase: &Rulebase, criteria: &Criteria) -> Result<Vec<RuleHit>, PolicyError> {
    let mut hits = Vec::new();
    for (rule, entry) in rulebase.rules.iter().zip(&rulebase.entries) {
        if rule_matches(rule, criteria, &rulebase.scopes)? {
            hits.push(RuleHit {
                rule: rule.clone(),
                entry: entry.clone(),
            });
        }
    }
    Ok(hits)
}

/// Run a query against `device`.
pub fn run_query<D: Device + ?Sized>(
    device: &D,
    device_group: Option<&str>,
    criteria: &Criteria,
) -> Result<QueryOutcome, PolicyError> {
    let target = resolve_target(device, device_group)?;
    let rulebase = load_rulebase(device, &target)?;
    let hits = filter_rules(&rulebase, criteria)?;
    let outcome = QueryOutcome {
        total: rulebase.rules.len(),
        hits,
        target,
    };
    info!(
        matched = outcome.hits.len(),
        total = outcome.total,
        "query complete"
    );
    Ok(outcome)
}
