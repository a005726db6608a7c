//! The simulation driver object that owns the gun

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::gun::GunConfiguration;
use crate::render::to_steering;
use crate::steering::parse_steering;

/// Run-level settings plus the gun.
///
/// Run-level settings left as `None` are not written out, so the driver
/// keeps its own defaults for them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Simulation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_gun: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_events: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compact_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>,
    /// Kept last so TOML writes it as a trailing `[gun]` table
    #[serde(default)]
    pub gun: GunConfiguration,
}

impl Simulation {
    pub fn new(gun: GunConfiguration) -> Self {
        Self {
            gun,
            ..Default::default()
        }
    }

    /// The HCal cluster-check run: only the gun is configured
    pub fn hcal_cluster_check() -> Self {
        Self::new(GunConfiguration::hcal_cluster_check())
    }

    pub fn validate(&self) -> Result<()> {
        self.gun.validate()?;
        if self.number_of_events == Some(0) {
            return Err(ConfigError::NoEvents);
        }
        Ok(())
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a configuration, picking the format from the file extension
    /// (`.toml`, `.json`, or `.py` for a steering file)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path)?;
        let text = fs::read_to_string(path)?;
        let simulation = match format {
            FileFormat::Toml => Self::from_toml_str(&text)?,
            FileFormat::Json => Self::from_json_str(&text)?,
            FileFormat::Steering => parse_steering(&text)?,
        };
        log::info!("✓ Loaded {} configuration from {}", format.name(), path.display());
        Ok(simulation)
    }

    /// Write the configuration in the format given by the file extension
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path)?;
        let text = match format {
            FileFormat::Toml => self.to_toml_string()?,
            FileFormat::Json => self.to_json_string()?,
            FileFormat::Steering => to_steering(self),
        };
        fs::write(path, text)?;
        log::info!("✓ Wrote {} configuration to {}", format.name(), path.display());
        Ok(())
    }
}

/// On-disk representations of a [`Simulation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Json,
    Steering,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(FileFormat::Toml),
            Some("json") => Ok(FileFormat::Json),
            Some("py") => Ok(FileFormat::Steering),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FileFormat::Toml => "TOML",
            FileFormat::Json => "JSON",
            FileFormat::Steering => "steering",
        }
    }
}
