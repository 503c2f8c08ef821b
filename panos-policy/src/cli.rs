use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};
use panos_policy::objects::Protocol;
use panos_policy::rule::{Action, RuleType};

#[derive(Parser, Debug)]
#[command(name = "panos-policy")]
#[command(about = "Query and add security rules on PAN-OS firewalls and Panorama")]
pub struct Cli {
    #[command(flatten)]
    pub device: DeviceArgs,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// List the rules of a rulebase that match the given traffic.
    Query(QueryArgs),
    /// Append a security rule to a rulebase.
    AddRule(AddRuleArgs),
}

/// How to reach the device; unset values fall back to the settings file.
#[derive(Args, Debug, Default)]
pub struct DeviceArgs {
    /// Exported running configuration to operate on.
    #[arg(long, global = true, conflicts_with = "ip_address")]
    pub config: Option<PathBuf>,
    /// TOML settings file with device and rule defaults.
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,
    /// Panorama device group holding the rulebase.
    #[arg(long, global = true)]
    pub devicegroup: Option<String>,
    /// Management address of the device.
    #[arg(long, global = true)]
    pub ip_address: Option<String>,
    #[arg(long, global = true)]
    pub username: Option<String>,
    #[arg(long, global = true)]
    pub password: Option<String>,
    #[arg(long, global = true, conflicts_with = "password")]
    pub api_key: Option<String>,
}

#[derive(Parser, Debug)]
pub struct QueryArgs {
    #[arg(long)]
    pub source_zone: Option<String>,
    #[arg(long)]
    pub destination_zone: Option<String>,
    #[arg(long)]
    pub source_ip: Option<IpAddr>,
    #[arg(long)]
    pub destination_ip: Option<IpAddr>,
    #[arg(long, requires = "protocol")]
    pub source_port: Option<String>,
    #[arg(long, requires = "protocol")]
    pub destination_port: Option<String>,
    /// Protocol the queried ports are reached over.
    #[arg(long, value_enum)]
    pub protocol: Option<ProtocolArg>,
    #[arg(long)]
    pub tag: Option<String>,
    /// Application name; recorded in the log, not matched.
    #[arg(long)]
    pub application: Option<String>,
}

#[derive(Parser, Debug)]
pub struct AddRuleArgs {
    #[arg(long)]
    pub rule_name: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long)]
    pub tag: Option<String>,
    #[arg(long, value_delimiter = ',')]
    pub from_zone: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    pub to_zone: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    pub source: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    pub source_user: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    pub destination: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    pub category: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    pub application: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    pub service: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    pub hip_profiles: Vec<String>,
    /// Log at session start.
    #[arg(long)]
    pub log_start: Option<bool>,
    /// Log at session end.
    #[arg(long)]
    pub log_end: Option<bool>,
    #[arg(long, value_enum)]
    pub rule_type: Option<RuleTypeArg>,
    #[arg(long, value_enum)]
    pub action: Option<ActionArg>,
    /// Security profile group; individual profiles are ignored when set.
    #[arg(long)]
    pub group_profile: Option<String>,
    #[arg(long)]
    pub antivirus: Option<String>,
    #[arg(long)]
    pub vulnerability: Option<String>,
    #[arg(long)]
    pub spyware: Option<String>,
    #[arg(long)]
    pub url_filtering: Option<String>,
    #[arg(long)]
    pub file_blocking: Option<String>,
    #[arg(long)]
    pub data_filtering: Option<String>,
    #[arg(long)]
    pub wildfire_analysis: Option<String>,
    /// Write the updated configuration here instead of in place.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum ProtocolArg {
    Tcp,
    Udp,
}

impl From<ProtocolArg> for Protocol {
    fn from(value: ProtocolArg) -> Self {
        match value {
            ProtocolArg::Tcp => Protocol::Tcp,
            ProtocolArg::Udp => Protocol::Udp,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum ActionArg {
    Allow,
    Deny,
    Drop,
    ResetClient,
    ResetServer,
    ResetBoth,
}

impl From<ActionArg> for Action {
    fn from(value: ActionArg) -> Self {
        match value {
            ActionArg::Allow => Action::Allow,
            ActionArg::Deny => Action::Deny,
            ActionArg::Drop => Action::Drop,
            ActionArg::ResetClient => Action::ResetClient,
            ActionArg::ResetServer => Action::ResetServer,
            ActionArg::ResetBoth => Action::ResetBoth,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum RuleTypeArg {
    Universal,
    Intrazone,
    Interzone,
}

impl From<RuleTypeArg> for RuleType {
    fn from(value: RuleTypeArg) -> Self {
        match value {
            RuleTypeArg::Universal => RuleType::Universal,
            RuleTypeArg::Intrazone => RuleType::Intrazone,
            RuleTypeArg::Interzone => RuleType::Interzone,
        }
    }
}
