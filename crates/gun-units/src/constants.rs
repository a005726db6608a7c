//! Unit scale factors in the CLHEP system
//!
//! A quantity is stored as a plain `f64` in internal units: multiply by a
//! constant to convert into internal units, divide to convert out.

#![allow(non_upper_case_globals)]

use std::f64::consts::PI;

// Length (internal unit: millimeter)
pub const mm: f64 = 1.0;
pub const millimeter: f64 = mm;
pub const nm: f64 = 1.0e-6 * mm;
pub const um: f64 = 1.0e-3 * mm;
pub const cm: f64 = 10.0 * mm;
pub const centimeter: f64 = cm;
pub const m: f64 = 1000.0 * mm;
pub const meter: f64 = m;
pub const km: f64 = 1000.0 * m;

// Energy (internal unit: MeV)
pub const MeV: f64 = 1.0;
pub const megaelectronvolt: f64 = MeV;
pub const eV: f64 = 1.0e-6 * MeV;
pub const keV: f64 = 1.0e-3 * MeV;
pub const GeV: f64 = 1.0e3 * MeV;
pub const gigaelectronvolt: f64 = GeV;
pub const TeV: f64 = 1.0e6 * MeV;

// Angle (internal unit: radian)
pub const rad: f64 = 1.0;
pub const radian: f64 = rad;
pub const mrad: f64 = 1.0e-3 * rad;
pub const degree: f64 = PI / 180.0 * rad;
pub const deg: f64 = degree;

/// Physical dimension of a quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Length,
    Energy,
    Angle,
}

impl Dimension {
    /// Name of the internal unit (scale factor 1)
    pub fn base_unit(self) -> &'static str {
        match self {
            Dimension::Length => "mm",
            Dimension::Energy => "MeV",
            Dimension::Angle => "rad",
        }
    }

    /// Unit used when writing quantities of this dimension back out
    pub fn display_unit(self) -> (&'static str, f64) {
        match self {
            Dimension::Length => ("mm", mm),
            Dimension::Energy => ("GeV", GeV),
            Dimension::Angle => ("degree", degree),
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Dimension::Length => "length",
            Dimension::Energy => "energy",
            Dimension::Angle => "angle",
        };
        f.write_str(name)
    }
}

const UNITS: &[(&str, Dimension, f64)] = &[
    ("nm", Dimension::Length, nm),
    ("um", Dimension::Length, um),
    ("mm", Dimension::Length, mm),
    ("millimeter", Dimension::Length, millimeter),
    ("cm", Dimension::Length, cm),
    ("centimeter", Dimension::Length, centimeter),
    ("m", Dimension::Length, m),
    ("meter", Dimension::Length, meter),
    ("km", Dimension::Length, km),
    ("eV", Dimension::Energy, eV),
    ("keV", Dimension::Energy, keV),
    ("MeV", Dimension::Energy, MeV),
    ("megaelectronvolt", Dimension::Energy, megaelectronvolt),
    ("GeV", Dimension::Energy, GeV),
    ("gigaelectronvolt", Dimension::Energy, gigaelectronvolt),
    ("TeV", Dimension::Energy, TeV),
    ("rad", Dimension::Angle, rad),
    ("radian", Dimension::Angle, radian),
    ("mrad", Dimension::Angle, mrad),
    ("degree", Dimension::Angle, degree),
    ("deg", Dimension::Angle, deg),
];

/// Look up a unit by the name it has in the g4units module
pub fn unit_by_name(name: &str) -> Option<(Dimension, f64)> {
    UNITS
        .iter()
        .find(|(unit, _, _)| *unit == name)
        .map(|&(_, dimension, scale)| (dimension, scale))
}

/// All unit names known to [`unit_by_name`]
pub fn unit_names() -> impl Iterator<Item = &'static str> {
    UNITS.iter().map(|(name, _, _)| *name)
}
