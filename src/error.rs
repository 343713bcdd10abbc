//! Error taxonomy for the BSB-LAN client.

use thiserror::Error;

pub type BsbLanResult<T> = Result<T, BsbLanError>;

#[derive(Debug, Error)]
pub enum BsbLanError {
    #[error("timeout occurred while connecting to BSB-LAN device")]
    Timeout,

    #[error("error occurred while connecting to BSB-LAN device: {0}")]
    Connection(String),

    #[error("authentication failed, check username and password")]
    Auth,

    #[error("unexpected response from BSB-LAN device: {0}")]
    InvalidResponse(String),

    /// The device answered the discovery probe but supports none of the candidates.
    #[error("no parameters available for partition '{partition}'")]
    NoParametersAvailable { partition: String },

    #[error("no valid parameters found for partition '{partition}'")]
    NoValidParameters { partition: String },

    #[error("unknown partition key '{0}'")]
    UnknownPartition(String),

    #[error("unsupported firmware version '{0}'")]
    UnsupportedVersion(String),

    #[error("firmware version not available")]
    MissingFirmwareVersion,

    #[error("invalid circuit {0}, expected 1, 2 or 3")]
    InvalidCircuit(u8),

    #[error("invalid values provided: {0}")]
    InvalidParameter(String),

    #[error("none of the included parameters belong to this section")]
    InvalidInclude,

    #[error("no parameter IDs provided")]
    NoParameterIds,

    #[error("could not resolve any parameter names: {0}")]
    UnresolvedNames(String),

    #[error("no state provided")]
    NoState,

    #[error("only one parameter can be set per request")]
    MultipleParameters,

    #[error("no schedule provided")]
    NoSchedule,

    #[error("temperature range not initialized for circuit {0}")]
    TemperatureRangeUnavailable(u8),

    #[error("invalid time slot: {0}")]
    InvalidTimeSlot(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl BsbLanError {
    /// Whether the request never produced a usable response.
    /// These are never cached and are retryable on the next call.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            BsbLanError::Timeout
                | BsbLanError::Connection(_)
                | BsbLanError::Auth
                | BsbLanError::InvalidResponse(_)
        )
    }
}

impl From<reqwest::Error> for BsbLanError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BsbLanError::Timeout
        } else if err.status() == Some(reqwest::StatusCode::UNAUTHORIZED) {
            BsbLanError::Auth
        } else if err.is_decode() {
            BsbLanError::InvalidResponse(err.to_string())
        } else {
            BsbLanError::Connection(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(BsbLanError::Timeout.is_transport());
        assert!(BsbLanError::Connection("refused".into()).is_transport());
        assert!(BsbLanError::InvalidResponse("not json".into()).is_transport());
        let empty = BsbLanError::NoParametersAvailable {
            partition: "essential".into(),
        };
        assert!(!empty.is_transport());
        assert!(!BsbLanError::InvalidInclude.is_transport());
    }

    #[test]
    fn test_messages_name_the_partition() {
        let err = BsbLanError::NoParametersAvailable { partition: "essential".into() };
        assert_eq!(err.to_string(), "no parameters available for partition 'essential'");

        let err = BsbLanError::UnknownPartition("bogus".into());
        assert!(err.to_string().contains("bogus"));
    }
}
