//! # Particle Gun Configuration
//!
//! Typed configuration of the primary-particle gun handed to a DD4hep/Geant4
//! simulation run, with readers and writers for the steering formats the
//! simulation driver understands.

pub mod error;
pub mod gun;
pub mod particle;
pub mod render;
pub mod simulation;
pub mod steering;

pub use error::*;
pub use gun::*;
pub use particle::*;
pub use render::*;
pub use simulation::*;
pub use steering::*;
