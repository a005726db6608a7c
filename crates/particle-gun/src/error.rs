use glam::DVec3;
use thiserror::Error;

use crate::steering::SteeringError;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors from validating, loading or saving a configuration.
///
/// Building a configuration and assigning its fields never fails; these only
/// come out of `validate()` and the file formats.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Gun energy is zero, negative or not finite (internal units).
    #[error("gun energy must be finite and positive, got {0} MeV")]
    InvalidEnergy(f64),

    #[error("gun position must be finite, got {0}")]
    InvalidPosition(DVec3),

    /// A polar-angle bound outside [0, pi].
    #[error("{name} = {value} rad is outside [0, pi]")]
    ThetaOutOfRange { name: &'static str, value: f64 },

    #[error("thetaMin ({min} rad) is larger than thetaMax ({max} rad)")]
    ThetaOrder { min: f64, max: f64 },

    #[error("numberOfEvents must be positive")]
    NoEvents,

    #[error("unsupported configuration file `{0}` (expected .toml, .json or .py)")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Steering(#[from] SteeringError),

    #[error("invalid TOML: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("cannot write TOML: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
