use panos_xml::{ApiError, ParseError, WriteError};
use thiserror::Error;

/// Errors raised while resolving, querying or submitting security policy.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The named device group does not exist on the manager.
    #[error("'{0}' device group not found in Panorama. Is the name correct?")]
    DeviceGroupNotFound(String),

    /// A queried port is not a number, or an object's port range bound is malformed.
    #[error("invalid port '{0}'")]
    InvalidPort(String),

    /// A rule attribute failed validation while building the rule.
    #[error("invalid rule {field}: {message}")]
    InvalidRule { field: String, message: String },

    /// No device address or configuration was supplied.
    #[error("no device configured: pass --config, --ip-address, or a settings file")]
    MissingConnection,

    /// The address does not select an available backend.
    #[error("unsupported transport for device address '{0}': only configuration snapshots are available")]
    UnsupportedTransport(String),

    /// The configuration document does not have the expected PAN-OS layout.
    #[error("unusable device configuration: {0}")]
    Snapshot(String),

    /// The configuration document could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The device rejected a request.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Persisting a change failed; the lower layer's message is kept verbatim.
    #[error("{0}")]
    Submit(String),
}

impl From<WriteError> for PolicyError {
    fn from(err: WriteError) -> Self {
        PolicyError::Submit(err.to_string())
    }
}

impl PolicyError {
    pub(crate) fn invalid_rule(field: &str, message: impl Into<String>) -> Self {
        PolicyError::InvalidRule {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
