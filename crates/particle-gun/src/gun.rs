//! The particle gun: primary particle, energy, origin and angular range

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use glam::DVec3;
use gun_units::{degree, format_quantity, in_display_unit, Dimension, GeV};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::particle::{particle_tag, ParticleKind};

/// Angular sampling law of the gun, by the identifier the driver accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AngularDistribution {
    /// Uniform over the allowed solid angle
    #[default]
    #[serde(rename = "uniform")]
    Uniform,

    /// Weighted by cos(theta)
    #[serde(rename = "cos(theta)")]
    CosTheta,

    /// Flat in pseudorapidity
    #[serde(rename = "eta", alias = "pseudorapidity")]
    Eta,

    /// Uniform in the polar angle itself
    #[serde(rename = "theta")]
    Theta,

    /// 1 + cos^2(theta), as for e+e- -> f fbar
    #[serde(rename = "ffbar")]
    FfBar,
}

impl AngularDistribution {
    pub const ALL: [AngularDistribution; 5] = [
        AngularDistribution::Uniform,
        AngularDistribution::CosTheta,
        AngularDistribution::Eta,
        AngularDistribution::Theta,
        AngularDistribution::FfBar,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AngularDistribution::Uniform => "uniform",
            AngularDistribution::CosTheta => "cos(theta)",
            AngularDistribution::Eta => "eta",
            AngularDistribution::Theta => "theta",
            AngularDistribution::FfBar => "ffbar",
        }
    }
}

impl fmt::Display for AngularDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown angular distribution `{0}` (expected uniform, cos(theta), eta, theta or ffbar)")]
pub struct UnknownDistribution(pub String);

impl FromStr for AngularDistribution {
    type Err = UnknownDistribution;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "pseudorapidity" => Ok(AngularDistribution::Eta),
            name => Self::ALL
                .into_iter()
                .find(|d| d.as_str() == name)
                .ok_or_else(|| UnknownDistribution(name.to_string())),
        }
    }
}

/// Gun settings read by the simulation driver before a run.
///
/// Quantities are plain numbers in internal units: build them as
/// `5.0 * GeV` or `70.0 * degree`. Assigning a field never fails; call
/// [`GunConfiguration::validate`] to check the values before handing the
/// configuration over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GunConfiguration {
    /// Geant4 name of the primary particle
    pub particle: String,
    /// Kinetic energy
    pub energy: f64,
    /// Emission point
    pub position: DVec3,
    pub distribution: AngularDistribution,
    /// Lower polar-angle bound
    pub theta_min: f64,
    /// Upper polar-angle bound
    pub theta_max: f64,
}

impl Default for GunConfiguration {
    fn default() -> Self {
        Self {
            particle: "mu-".to_string(),
            energy: 10.0 * GeV,
            position: DVec3::ZERO,
            distribution: AngularDistribution::Uniform,
            theta_min: 0.0,
            theta_max: PI,
        }
    }
}

impl GunConfiguration {
    /// 5 GeV pi+ from the origin, cos(theta) between 70 and 80 degrees,
    /// as used for the HCal cluster check
    pub fn hcal_cluster_check() -> Self {
        Self {
            energy: 5.0 * GeV,
            particle: "pi+".to_string(),
            position: DVec3::new(0.0, 0.0, 0.0),
            distribution: AngularDistribution::CosTheta,
            theta_min: 70.0 * degree,
            theta_max: 80.0 * degree,
        }
    }

    /// Catalogue entry for the configured particle, if it is a known one
    pub fn particle_kind(&self) -> Option<ParticleKind> {
        ParticleKind::from_name(&self.particle)
    }

    /// Momentum of the primary, treating `energy` as kinetic energy
    pub fn momentum(&self) -> Option<f64> {
        let mass = self.particle_kind()?.mass();
        Some((self.energy * self.energy + 2.0 * self.energy * mass).sqrt())
    }

    /// Check the values the simulation would otherwise reject at run start.
    ///
    /// Unknown particle names are only logged: the driver's particle table is
    /// larger than the catalogue here.
    pub fn validate(&self) -> Result<()> {
        if !self.energy.is_finite() || self.energy <= 0.0 {
            return Err(ConfigError::InvalidEnergy(self.energy));
        }
        if !self.position.is_finite() {
            return Err(ConfigError::InvalidPosition(self.position));
        }
        for (name, value) in [("thetaMin", self.theta_min), ("thetaMax", self.theta_max)] {
            if !(0.0..=PI).contains(&value) {
                return Err(ConfigError::ThetaOutOfRange { name, value });
            }
        }
        if self.theta_min > self.theta_max {
            return Err(ConfigError::ThetaOrder {
                min: self.theta_min,
                max: self.theta_max,
            });
        }

        if self.particle_kind().is_none() {
            log::warn!(
                "particle {:?} is not in the local catalogue, leaving it to Geant4",
                self.particle
            );
        }
        Ok(())
    }

    /// Compact run name, `e<GeV>th<degree><particle>`: `e5th70pip`
    pub fn run_tag(&self) -> String {
        let tag = match self.particle_kind() {
            Some(kind) => kind.short_tag(),
            None => particle_tag(&self.particle),
        };
        format!(
            "e{}th{}{}",
            in_display_unit(self.energy, Dimension::Energy),
            in_display_unit(self.theta_min, Dimension::Angle),
            tag
        )
    }
}

impl fmt::Display for GunConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "particle      {}", self.particle)?;
        if let Some(kind) = self.particle_kind() {
            write!(
                f,
                " (pdg {}, charge {:+}, mass {:.3} MeV)",
                kind.pdg_code(),
                kind.charge(),
                kind.mass()
            )?;
        }
        writeln!(f)?;
        writeln!(f, "energy        {}", format_quantity(self.energy, Dimension::Energy))?;
        if let Some(p) = self.momentum() {
            writeln!(f, "momentum      {}", format_quantity(p, Dimension::Energy))?;
        }
        writeln!(
            f,
            "position      ({}, {}, {}) mm",
            self.position.x, self.position.y, self.position.z
        )?;
        writeln!(f, "distribution  {}", self.distribution)?;
        writeln!(f, "thetaMin      {}", format_quantity(self.theta_min, Dimension::Angle))?;
        write!(f, "thetaMax      {}", format_quantity(self.theta_max, Dimension::Angle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gun_units::{mm, MeV};

    #[test]
    fn test_hcal_cluster_check_values() {
        let gun = GunConfiguration::hcal_cluster_check();
        assert_eq!(gun.energy, 5.0 * GeV);
        assert_eq!(gun.particle, "pi+");
        assert_eq!(gun.position, DVec3::new(0.0, 0.0, 0.0));
        assert_eq!(gun.distribution.as_str(), "cos(theta)");
        assert_eq!(gun.theta_min, 70.0 * degree);
        assert_eq!(gun.theta_max, 80.0 * degree);
        assert!(gun.theta_min < gun.theta_max);
        assert!(gun.validate().is_ok());
    }

    #[test]
    fn test_fields_are_plain_assignments() {
        let mut gun = GunConfiguration::default();
        gun.energy = -1.0;
        gun.theta_min = 2.0;
        gun.theta_max = 1.0;
        // nothing is checked until validate()
        assert_eq!(gun.energy, -1.0);
        assert!(gun.validate().is_err());
    }

    #[test]
    fn test_validate_energy() {
        let mut gun = GunConfiguration::hcal_cluster_check();
        for energy in [0.0, -5.0 * GeV, f64::NAN, f64::INFINITY] {
            gun.energy = energy;
            assert!(matches!(gun.validate(), Err(ConfigError::InvalidEnergy(_))));
        }
    }

    #[test]
    fn test_validate_position() {
        let mut gun = GunConfiguration::hcal_cluster_check();
        gun.position = DVec3::new(0.0, f64::NAN, 0.0);
        assert!(matches!(gun.validate(), Err(ConfigError::InvalidPosition(_))));
        gun.position = DVec3::new(-10.0 * mm, 0.0, 250.0 * mm);
        assert!(gun.validate().is_ok());
    }

    #[test]
    fn test_validate_theta() {
        let mut gun = GunConfiguration::hcal_cluster_check();
        gun.theta_min = 80.0 * degree;
        gun.theta_max = 70.0 * degree;
        assert!(matches!(gun.validate(), Err(ConfigError::ThetaOrder { .. })));

        gun.theta_min = -1.0 * degree;
        assert!(matches!(
            gun.validate(),
            Err(ConfigError::ThetaOutOfRange { name: "thetaMin", .. })
        ));

        gun.theta_min = 0.0;
        gun.theta_max = 181.0 * degree;
        assert!(matches!(
            gun.validate(),
            Err(ConfigError::ThetaOutOfRange { name: "thetaMax", .. })
        ));

        // a fixed polar angle is allowed
        gun.theta_min = 75.0 * degree;
        gun.theta_max = 75.0 * degree;
        assert!(gun.validate().is_ok());
    }

    #[test]
    fn test_unknown_particle_is_not_an_error() {
        let mut gun = GunConfiguration::hcal_cluster_check();
        gun.particle = "deuteron".to_string();
        assert!(gun.validate().is_ok());
        assert_eq!(gun.particle_kind(), None);
        assert_eq!(gun.momentum(), None);
    }

    #[test]
    fn test_momentum() {
        let mut gun = GunConfiguration::hcal_cluster_check();
        gun.particle = "gamma".to_string();
        assert_eq!(gun.momentum(), Some(5.0 * GeV));

        gun.particle = "pi+".to_string();
        let p = gun.momentum().unwrap();
        let m = ParticleKind::PionPlus.mass();
        let total = gun.energy + m;
        assert!((total * total - p * p - m * m).abs() < 1e-3 * MeV * MeV);
    }

    #[test]
    fn test_run_tag() {
        assert_eq!(GunConfiguration::hcal_cluster_check().run_tag(), "e5th70pip");

        let mut gun = GunConfiguration::hcal_cluster_check();
        gun.particle = "e-".to_string();
        gun.energy = 500.0 * MeV;
        gun.theta_min = 45.0 * degree;
        assert_eq!(gun.run_tag(), "e0.5th45em");

        gun.particle = "He3".to_string();
        assert_eq!(gun.run_tag(), "e0.5th45he3");
    }

    #[test]
    fn test_distribution_names() {
        assert_eq!("cos(theta)".parse(), Ok(AngularDistribution::CosTheta));
        assert_eq!("pseudorapidity".parse(), Ok(AngularDistribution::Eta));
        assert_eq!(" uniform ".parse(), Ok(AngularDistribution::Uniform));
        assert_eq!(
            "cos".parse::<AngularDistribution>(),
            Err(UnknownDistribution("cos".to_string()))
        );
        for d in AngularDistribution::ALL {
            assert_eq!(d.to_string().parse(), Ok(d));
        }
    }

    #[test]
    fn test_display_summary() {
        let text = GunConfiguration::hcal_cluster_check().to_string();
        assert!(text.contains("particle      pi+ (pdg 211, charge +1"));
        assert!(text.contains("energy        5*GeV"));
        assert!(text.contains("distribution  cos(theta)"));
        assert!(text.contains("thetaMin      70*degree"));
        assert!(text.ends_with("thetaMax      80*degree"));
    }
}
