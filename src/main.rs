//! Particle-gun steering for DD4hep/Geant4 simulation runs
//!
//! Builds, converts and checks the gun configuration handed to `ddsim`.

mod cli;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = cli::run(Cli::parse()) {
        cli::report(&e);
        std::process::exit(1);
    }
}
