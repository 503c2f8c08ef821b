use anyhow::{bail, Result};
use panos_policy::matcher::{Criteria, PortQuery};
use panos_policy::objects::Protocol;
use panos_policy::query::run_query;
use panos_policy::report::{render_query, QueryReport};
use tracing::info;

use crate::cli::{OutputFormat, QueryArgs};
use crate::device_args::ResolvedDevice;

pub fn run_query_cmd(args: QueryArgs, device: ResolvedDevice, format: OutputFormat) -> Result<()> {
    let criteria = build_criteria(&args)?;
    if let Some(application) = &args.application {
        info!(application = %application, "application is not a match criterion; ignored");
    }

    let snapshot = device.open()?;
    let outcome = run_query(&snapshot, device.device_group.as_deref(), &criteria)?;
    if outcome.hits.is_empty() {
        bail!("No matching rules found.");
    }

    match format {
        OutputFormat::Text => println!("{}", render_query(&outcome)),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&QueryReport::new(&outcome))?)
        }
    }
    Ok(())
}

fn build_criteria(args: &QueryArgs) -> Result<Criteria> {
    let protocol = args.protocol.map(Protocol::from);
    let port = |raw: &Option<String>| -> Result<Option<PortQuery>> {
        match (raw, protocol) {
            (Some(port), Some(protocol)) => Ok(Some(PortQuery::new(port.as_str(), protocol)?)),
            _ => Ok(None),
        }
    };

    Ok(Criteria {
        source_zone: args.source_zone.clone(),
        destination_zone: args.destination_zone.clone(),
        source_ip: args.source_ip,
        destination_ip: args.destination_ip,
        source_port: port(&args.source_port)?,
        destination_port: port(&args.destination_port)?,
        tag: args.tag.clone(),
    })
}
