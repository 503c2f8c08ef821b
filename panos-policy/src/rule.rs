//! Security rule model.
//!
//! [`SecurityRule`] mirrors a `<rules><entry>` element of a PAN-OS security
//! rulebase. New rules are declared through [`RuleSpec`], a typed set of
//! attributes with the device defaults, and validated by [`RuleSpec::build`].

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use panos_xml::XmlNode;
use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

pub const ANY: &str = "any";
pub const APPLICATION_DEFAULT: &str = "application-default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    #[default]
    Allow,
    Deny,
    Drop,
    ResetClient,
    ResetServer,
    ResetBoth,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Allow => "allow",
            Action::Deny => "deny",
            Action::Drop => "drop",
            Action::ResetClient => "reset-client",
            Action::ResetServer => "reset-server",
            Action::ResetBoth => "reset-both",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "allow" => Ok(Action::Allow),
            "deny" => Ok(Action::Deny),
            "drop" => Ok(Action::Drop),
            "reset-client" => Ok(Action::ResetClient),
            "reset-server" => Ok(Action::ResetServer),
            "reset-both" => Ok(Action::ResetBoth),
            other => Err(PolicyError::invalid_rule(
                "action",
                format!("unknown action '{other}'"),
            )),
        }
    }
}

/// Rule type, available from PAN-OS 6.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    #[default]
    Universal,
    Intrazone,
    Interzone,
}

impl RuleType {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleType::Universal => "universal",
            RuleType::Intrazone => "intrazone",
            RuleType::Interzone => "interzone",
        }
    }
}

impl Display for RuleType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleType {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "universal" => Ok(RuleType::Universal),
            "intrazone" => Ok(RuleType::Intrazone),
            "interzone" => Ok(RuleType::Interzone),
            other => Err(PolicyError::invalid_rule(
                "rule_type",
                format!("unknown rule type '{other}'"),
            )),
        }
    }
}

/// Individually named security profiles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SecurityProfiles {
    pub antivirus: Option<String>,
    pub vulnerability: Option<String>,
    pub spyware: Option<String>,
    pub url_filtering: Option<String>,
    pub file_blocking: Option<String>,
    pub data_filtering: Option<String>,
    pub wildfire_analysis: Option<String>,
}

impl SecurityProfiles {
    /// Element names under `<profiles>` paired with the configured profile.
    fn slots(&self) -> [(&'static str, Option<&String>); 7] {
        [
            ("virus", self.antivirus.as_ref()),
            ("spyware", self.spyware.as_ref()),
            ("vulnerability", self.vulnerability.as_ref()),
            ("url-filtering", self.url_filtering.as_ref()),
            ("file-blocking", self.file_blocking.as_ref()),
            ("data-filtering", self.data_filtering.as_ref()),
            ("wildfire-analysis", self.wildfire_analysis.as_ref()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.slots().iter().all(|(_, v)| v.is_none())
    }

    fn from_node(profiles: &XmlNode) -> Self {
        let first = |tag: &str| profiles.members(tag).into_iter().next();
        Self {
            antivirus: first("virus"),
            vulnerability: first("vulnerability"),
            spyware: first("spyware"),
            url_filtering: first("url-filtering"),
            file_blocking: first("file-blocking"),
            data_filtering: first("data-filtering"),
            wildfire_analysis: first("wildfire-analysis"),
        }
    }
}

/// Security profile attachment of a rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileSetting {
    #[default]
    None,
    Group(String),
    Profiles(SecurityProfiles),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityRule {
    pub name: String,
    pub description: Option<String>,
    pub from_zones: Vec<String>,
    pub to_zones: Vec<String>,
    pub source: Vec<String>,
    pub destination: Vec<String>,
    pub source_user: Vec<String>,
    pub category: Vec<String>,
    pub application: Vec<String>,
    pub service: Vec<String>,
    pub hip_profiles: Vec<String>,
    pub tags: Vec<String>,
    pub action: Action,
    pub rule_type: RuleType,
    pub log_start: bool,
    pub log_end: bool,
    pub disabled: bool,
    pub profile_setting: ProfileSetting,
}

impl SecurityRule {
    /// Read a rule from a `<rules><entry>` element.
    ///
    /// Missing elements take the device defaults (`allow`, `universal`,
    /// log at session end only).
    pub fn from_entry(entry: &XmlNode) -> Result<Self, PolicyError> {
        let name = entry
            .name()
            .ok_or_else(|| PolicyError::Snapshot("security rule without a name".to_string()))?
            .to_string();
        let action = match entry.get_text(&["action"]) {
            Some(raw) => raw
                .parse()
                .map_err(|_| PolicyError::Snapshot(format!("rule '{name}' has unknown action '{raw}'")))?,
            None => Action::default(),
        };
        let rule_type = match entry.get_text(&["rule-type"]) {
            Some(raw) => raw.parse().map_err(|_| {
                PolicyError::Snapshot(format!("rule '{name}' has unknown rule type '{raw}'"))
            })?,
            None => RuleType::default(),
        };
        let profile_setting = match entry.get_child("profile-setting") {
            Some(setting) => {
                if let Some(group) = setting.members("group").into_iter().next() {
                    ProfileSetting::Group(group)
                } else if let Some(profiles) = setting.get_child("profiles") {
                    ProfileSetting::Profiles(SecurityProfiles::from_node(profiles))
                } else {
                    ProfileSetting::None
                }
            }
            None => ProfileSetting::None,
        };

        Ok(Self {
            description: entry.get_text(&["description"]).map(ToOwned::to_owned),
            from_zones: entry.members("from"),
            to_zones: entry.members("to"),
            source: entry.members("source"),
            destination: entry.members("destination"),
            source_user: entry.members("source-user"),
            category: entry.members("category"),
            application: entry.members("application"),
            service: entry.members("service"),
            hip_profiles: entry.members("hip-profiles"),
            tags: entry.members("tag"),
            action,
            rule_type,
            log_start: yes_no(entry.get_text(&["log-start"]), false),
            log_end: yes_no(entry.get_text(&["log-end"]), true),
            disabled: yes_no(entry.get_text(&["disabled"]), false),
            profile_setting,
            name,
        })
    }

    /// Render the rule as a `<entry name="...">` element.
    pub fn to_xml(&self) -> XmlNode {
        let mut entry = XmlNode::entry(self.name.as_str());
        let lists = [
            ("to", &self.to_zones),
            ("from", &self.from_zones),
            ("source", &self.source),
            ("destination", &self.destination),
            ("source-user", &self.source_user),
            ("category", &self.category),
            ("application", &self.application),
            ("service", &self.service),
            ("hip-profiles", &self.hip_profiles),
        ];
        for (tag, members) in lists {
            entry
                .children
                .push(XmlNode::member_list(tag, members.iter().cloned()));
        }
        if !self.tags.is_empty() {
            entry
                .children
                .push(XmlNode::member_list("tag", self.tags.iter().cloned()));
        }
        entry
            .children
            .push(XmlNode::with_text("action", self.action.as_str()));
        entry
            .children
            .push(XmlNode::with_text("rule-type", self.rule_type.as_str()));
        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            entry
                .children
                .push(XmlNode::with_text("description", description));
        }
        entry
            .children
            .push(XmlNode::with_text("log-start", yes_no_text(self.log_start)));
        entry
            .children
            .push(XmlNode::with_text("log-end", yes_no_text(self.log_end)));
        if self.disabled {
            entry.children.push(XmlNode::with_text("disabled", "yes"));
        }

        match &self.profile_setting {
            ProfileSetting::None => {}
            ProfileSetting::Group(group) => {
                let mut setting = XmlNode::new("profile-setting");
                setting
                    .children
                    .push(XmlNode::member_list("group", [group.as_str()]));
                entry.children.push(setting);
            }
            ProfileSetting::Profiles(profiles) if !profiles.is_empty() => {
                let mut list = XmlNode::new("profiles");
                for (tag, value) in profiles.slots() {
                    if let Some(value) = value {
                        list.children
                            .push(XmlNode::member_list(tag, [value.as_str()]));
                    }
                }
                let mut setting = XmlNode::new("profile-setting");
                setting.children.push(list);
                entry.children.push(setting);
            }
            ProfileSetting::Profiles(_) => {}
        }
        entry
    }
}

fn yes_no(raw: Option<&str>, default: bool) -> bool {
    match raw.map(str::trim) {
        Some("yes") => true,
        Some("no") => false,
        _ => default,
    }
}

fn yes_no_text(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Attributes of a rule to create.
///
/// Start from [`RuleSpec::new`], which fills in the device defaults, then
/// override fields. Validation happens in [`RuleSpec::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec {
    pub name: String,
    pub description: String,
    pub tag: Option<String>,
    pub from_zone: Vec<String>,
    pub to_zone: Vec<String>,
    pub source: Vec<String>,
    pub source_user: Vec<String>,
    pub destination: Vec<String>,
    pub category: Vec<String>,
    pub application: Vec<String>,
    pub service: Vec<String>,
    pub hip_profiles: Vec<String>,
    pub log_start: bool,
    pub log_end: bool,
    pub rule_type: RuleType,
    pub action: Action,
    /// Security profile group; when set the individual profiles are ignored.
    pub group_profile: Option<String>,
    pub profiles: SecurityProfiles,
}

impl RuleSpec {
    pub fn new(name: impl Into<String>) -> Self {
        let any = || vec![ANY.to_string()];
        Self {
            name: name.into(),
            description: String::new(),
            tag: None,
            from_zone: any(),
            to_zone: any(),
            source: any(),
            source_user: any(),
            destination: any(),
            category: any(),
            application: any(),
            service: vec![APPLICATION_DEFAULT.to_string()],
            hip_profiles: any(),
            log_start: false,
            log_end: true,
            rule_type: RuleType::default(),
            action: Action::default(),
            group_profile: None,
            profiles: SecurityProfiles::default(),
        }
    }

    /// Validate the attributes and produce the rule to submit.
    pub fn build(self) -> Result<SecurityRule, PolicyError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(PolicyError::invalid_rule("rule_name", "must not be empty"));
        }

        let tag = match self.tag {
            Some(tag) if tag.trim().is_empty() => {
                return Err(PolicyError::invalid_rule("tag", "must not be blank"));
            }
            Some(tag) => vec![tag.trim().to_string()],
            None => Vec::new(),
        };

        let profile_setting = match self.group_profile {
            Some(group) if group.trim().is_empty() => {
                return Err(PolicyError::invalid_rule("group_profile", "must not be blank"));
            }
            Some(group) => ProfileSetting::Group(group.trim().to_string()),
            None if self.profiles.is_empty() => ProfileSetting::None,
            None => ProfileSetting::Profiles(self.profiles),
        };

        let description = Some(self.description).filter(|d| !d.trim().is_empty());

        Ok(SecurityRule {
            from_zones: members("from_zone", self.from_zone)?,
            to_zones: members("to_zone", self.to_zone)?,
            source: members("source", self.source)?,
            destination: members("destination", self.destination)?,
            source_user: members("source_user", self.source_user)?,
            category: members("category", self.category)?,
            application: members("application", self.application)?,
            service: members("service", self.service)?,
            hip_profiles: members("hip_profiles", self.hip_profiles)?,
            tags: tag,
            action: self.action,
            rule_type: self.rule_type,
            log_start: self.log_start,
            log_end: self.log_end,
            disabled: false,
            description,
            profile_setting,
            name,
        })
    }
}

fn members(field: &str, values: Vec<String>) -> Result<Vec<String>, PolicyError> {
    if values.is_empty() {
        return Err(PolicyError::invalid_rule(field, "needs at least one member"));
    }
    values
        .into_iter()
        .map(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                Err(PolicyError::invalid_rule(field, "members must not be blank"))
            } else {
                Ok(trimmed.to_string())
            }
        })
        .collect()
}
