use std::path::Path;

use anyhow::{Context, Result};
use panos_policy::create::add_rule;
use panos_policy::report::{render_add, AddReport};
use panos_policy::rule::{RuleSpec, SecurityProfiles};
use panos_policy::settings::RuleDefaults;

use crate::cli::{AddRuleArgs, OutputFormat};
use crate::device_args::ResolvedDevice;
use crate::path_guard;

pub fn run_add_rule(
    args: AddRuleArgs,
    device: ResolvedDevice,
    settings_path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let mut snapshot = device.open()?;
    if let Some(out_path) = &args.output {
        if let Some(settings) = settings_path {
            path_guard::ensure_output_not_protected(out_path, &[settings])?;
        }
        snapshot = snapshot.with_output(out_path);
    }

    let spec = build_spec(&args, &device.settings.rule_defaults);
    let outcome = add_rule(&mut snapshot, device.device_group.as_deref(), spec)
        .context("failed to add security rule")?;

    match format {
        OutputFormat::Text => println!("{}", render_add(&outcome)),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&AddReport::new(&outcome))?)
        }
    }
    Ok(())
}

/// Device defaults, then settings-file defaults, then explicit flags.
fn build_spec(args: &AddRuleArgs, defaults: &RuleDefaults) -> RuleSpec {
    let mut spec = RuleSpec::new(args.rule_name.as_str());
    defaults.apply(&mut spec);

    spec.description = args.description.clone();
    spec.tag = args.tag.clone();
    override_list(&mut spec.from_zone, &args.from_zone);
    override_list(&mut spec.to_zone, &args.to_zone);
    override_list(&mut spec.source, &args.source);
    override_list(&mut spec.source_user, &args.source_user);
    override_list(&mut spec.destination, &args.destination);
    override_list(&mut spec.category, &args.category);
    override_list(&mut spec.application, &args.application);
    override_list(&mut spec.service, &args.service);
    override_list(&mut spec.hip_profiles, &args.hip_profiles);

    if let Some(log_start) = args.log_start {
        spec.log_start = log_start;
    }
    if let Some(log_end) = args.log_end {
        spec.log_end = log_end;
    }
    if let Some(rule_type) = args.rule_type {
        spec.rule_type = rule_type.into();
    }
    if let Some(action) = args.action {
        spec.action = action.into();
    }

    spec.group_profile = args.group_profile.clone();
    spec.profiles = SecurityProfiles {
        antivirus: args.antivirus.clone(),
        vulnerability: args.vulnerability.clone(),
        spyware: args.spyware.clone(),
        url_filtering: args.url_filtering.clone(),
        file_blocking: args.file_blocking.clone(),
        data_filtering: args.data_filtering.clone(),
        wildfire_analysis: args.wildfire_analysis.clone(),
    };
    spec
}

fn override_list(field: &mut Vec<String>, values: &[String]) {
    if !values.is_empty() {
        *field = values.to_vec();
    }
}
