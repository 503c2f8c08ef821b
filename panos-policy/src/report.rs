use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

use crate::create::AddOutcome;
use crate::device::DeviceTarget;
use crate::query::QueryOutcome;
use crate::rule::{Action, SecurityRule};

/// JSON document printed for a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryReport {
    pub msg: String,
    pub target: DeviceTarget,
    pub matched: usize,
    pub total: usize,
    pub rules: Value,
}

impl QueryReport {
    pub fn new(outcome: &QueryOutcome) -> Self {
        Self {
            msg: outcome.message(),
            target: outcome.target.clone(),
            matched: outcome.hits.len(),
            total: outcome.total,
            rules: outcome.hits_json(),
        }
    }
}

/// JSON document printed after adding a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddReport {
    pub changed: bool,
    pub msg: String,
    pub rule: String,
    pub target: DeviceTarget,
}

impl AddReport {
    pub fn new(outcome: &AddOutcome) -> Self {
        Self {
            changed: outcome.changed,
            msg: outcome.message.clone(),
            rule: outcome.rule_name.clone(),
            target: outcome.target.clone(),
        }
    }
}

/// Render matching rules for terminal output, one line per rule.
pub fn render_query(outcome: &QueryOutcome) -> String {
    let mut out = vec![format!("{}", outcome.target).bold().to_string()];
    out.extend(outcome.hits.iter().map(|hit| render_rule(&hit.rule)));
    out.push(render_query_summary(outcome));
    out.join("\n")
}

/// Render the match count line.
pub fn render_query_summary(outcome: &QueryOutcome) -> String {
    outcome.message().cyan().to_string()
}

fn render_rule(rule: &SecurityRule) -> String {
    let action = match rule.action {
        Action::Allow => rule.action.as_str().green(),
        _ => rule.action.as_str().red(),
    };
    let mut line = format!(
        "{action} {} from={} to={} src={} dst={} service={}",
        rule.name,
        rule.from_zones.join(","),
        rule.to_zones.join(","),
        rule.source.join(","),
        rule.destination.join(","),
        rule.service.join(","),
    );
    if !rule.tags.is_empty() {
        line.push_str(&format!(" tags={}", rule.tags.join(",")));
    }
    if rule.disabled {
        line.push_str(&format!(" {}", "disabled".yellow()));
    }
    line
}

/// Render the add-rule result line.
pub fn render_add(outcome: &AddOutcome) -> String {
    format!("changed={} msg={}", outcome.changed, outcome.message)
        .green()
        .to_string()
}
