use anyhow::{Context, Result};
use panos_policy::device::{connect, Connection, Credentials};
use panos_policy::error::PolicyError;
use panos_policy::settings::{load_settings, Settings};
use panos_policy::snapshot::SnapshotDevice;
use tracing::debug;

use crate::cli::DeviceArgs;

const DEFAULT_USERNAME: &str = "admin";

/// Device parameters after merging the settings file with command-line flags.
#[derive(Debug)]
pub struct ResolvedDevice {
    pub connection: Connection,
    pub device_group: Option<String>,
    pub settings: Settings,
}

impl ResolvedDevice {
    pub fn open(&self) -> Result<SnapshotDevice> {
        if self.connection.address.is_empty() {
            return Err(PolicyError::MissingConnection.into());
        }
        connect(&self.connection)
            .with_context(|| format!("failed to open device {}", self.connection.address))
    }
}

pub fn resolve(args: &DeviceArgs) -> Result<ResolvedDevice> {
    let settings = match &args.settings {
        Some(path) => {
            let settings = load_settings(path)?;
            debug!(path = %path.display(), "loaded settings");
            settings
        }
        None => Settings::default(),
    };
    let file = &settings.device;

    let api_key = args.api_key.clone().or_else(|| file.api_key.clone());
    let password = args.password.clone().or_else(|| file.password.clone());
    let credentials = match (api_key, password) {
        (Some(key), _) => Some(Credentials::ApiKey(key)),
        (None, Some(password)) => Some(Credentials::Password {
            username: args
                .username
                .clone()
                .or_else(|| file.username.clone())
                .unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
            password,
        }),
        (None, None) => None,
    };

    // --config is always a snapshot file, whatever its name
    let mut connection = match &args.config {
        Some(path) => Connection::snapshot(path),
        None => Connection::new(
            args.ip_address
                .clone()
                .or_else(|| file.address.clone())
                .unwrap_or_default(),
        ),
    };
    if let Some(credentials) = credentials {
        connection = connection.with_credentials(credentials);
    }

    Ok(ResolvedDevice {
        connection,
        device_group: args.devicegroup.clone().or_else(|| file.devicegroup.clone()),
        settings,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use panos_policy::device::Credentials;

    use super::resolve;
    use crate::cli::DeviceArgs;

    #[test]
    fn flags_override_settings_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            "[device]\naddress = \"from-file.xml\"\ndevicegroup = \"DG-file\"\npassword = \"secret\"\n",
        )
        .expect("write");

        let args = DeviceArgs {
            config: Some(PathBuf::from("cli.xml")),
            settings: Some(path),
            ..DeviceArgs::default()
        };
        let resolved = resolve(&args).expect("resolve");
        assert_eq!(
            resolved.connection.snapshot_path(),
            Some(PathBuf::from("cli.xml"))
        );
        assert_eq!(resolved.device_group.as_deref(), Some("DG-file"));
        assert_eq!(
            resolved.connection.credentials,
            Some(Credentials::Password {
                username: "admin".to_string(),
                password: "secret".to_string(),
            })
        );
    }

    #[test]
    fn api_key_wins_over_password() {
        let args = DeviceArgs {
            ip_address: Some("10.5.172.91".to_string()),
            password: Some("pw".to_string()),
            api_key: Some("key".to_string()),
            ..DeviceArgs::default()
        };
        let resolved = resolve(&args).expect("resolve");
        assert_eq!(
            resolved.connection.credentials,
            Some(Credentials::ApiKey("key".to_string()))
        );
        assert!(resolved.device_group.is_none());
    }
}
