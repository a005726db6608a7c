//! # Geant4 Units
//!
//! Unit constants in the CLHEP system used by Geant4 and DD4hep
//! (mm, MeV and rad are 1), plus parsing and formatting of
//! `value*unit` quantities as they appear in steering files.

pub mod constants;
pub mod quantity;

pub use constants::*;
pub use quantity::*;
