//! Writers for the formats the simulation driver reads directly

use std::fmt::Write;

use gun_units::{format_quantity, Dimension};

use crate::gun::GunConfiguration;
use crate::simulation::Simulation;
use crate::steering::unescape;

/// Name bound to the driver object in generated steering files
pub const STEERING_OBJECT: &str = "SIM";

/// Units every steering file imports, whether or not it uses them
const STANDARD_UNIT_IMPORTS: [&str; 4] = ["mm", "GeV", "MeV", "degree"];

/// Python steering file for `ddsim --steeringFile`
pub fn to_steering(simulation: &Simulation) -> String {
    let gun_lines = gun_assignments(&simulation.gun);

    let mut units: Vec<&str> = STANDARD_UNIT_IMPORTS.to_vec();
    // quantities without an exact display form fall back to the base units
    if gun_lines.iter().any(|(_, value)| value.ends_with("*rad")) {
        units.push("rad");
    }

    let mut out = String::new();
    out.push_str("from DDSim.DD4hepSimulation import DD4hepSimulation\n");
    let _ = writeln!(out, "from g4units import {}", units.join(", "));
    let _ = writeln!(out, "{STEERING_OBJECT} = DD4hepSimulation()");

    for (field, value) in run_assignments(simulation) {
        let _ = writeln!(out, "{STEERING_OBJECT}.{field} = {value}");
    }
    for (field, value) in gun_lines {
        let _ = writeln!(out, "{STEERING_OBJECT}.gun.{field} = {value}");
    }

    log::debug!("rendered steering for run {}", simulation.gun.run_tag());
    out
}

/// Command-line arguments for `ddsim`, equivalent to [`to_steering`]
pub fn to_args(simulation: &Simulation) -> Vec<String> {
    let mut args = Vec::new();
    for (field, value) in run_assignments(simulation) {
        match value.as_str() {
            "True" => args.push(format!("--{field}")),
            "False" => {}
            _ => {
                args.push(format!("--{field}"));
                args.push(unquote(&value));
            }
        }
    }
    for (field, value) in gun_assignments(&simulation.gun) {
        args.push(format!("--gun.{field}"));
        args.push(unquote(&value));
    }
    args
}

/// `steering.<purpose>_<run tag>.py`
pub fn steering_file_name(purpose: &str, gun: &GunConfiguration) -> String {
    format!("steering.{purpose}_{}.py", gun.run_tag())
}

fn gun_assignments(gun: &GunConfiguration) -> Vec<(&'static str, String)> {
    vec![
        ("energy", format_quantity(gun.energy, Dimension::Energy)),
        ("particle", python_string(&gun.particle)),
        (
            "position",
            format!(
                "({:?}, {:?}, {:?})",
                gun.position.x, gun.position.y, gun.position.z
            ),
        ),
        ("distribution", python_string(gun.distribution.as_str())),
        ("thetaMin", format_quantity(gun.theta_min, Dimension::Angle)),
        ("thetaMax", format_quantity(gun.theta_max, Dimension::Angle)),
    ]
}

fn run_assignments(simulation: &Simulation) -> Vec<(&'static str, String)> {
    let mut lines = Vec::new();
    if let Some(enable) = simulation.enable_gun {
        lines.push(("enableGun", if enable { "True" } else { "False" }.to_string()));
    }
    if let Some(events) = simulation.number_of_events {
        lines.push(("numberOfEvents", events.to_string()));
    }
    if let Some(compact) = &simulation.compact_file {
        lines.push(("compactFile", python_string(compact)));
    }
    if let Some(output) = &simulation.output_file {
        lines.push(("outputFile", python_string(output)));
    }
    if let Some(seed) = simulation.random_seed {
        lines.push(("random.seed", seed.to_string()));
    }
    lines
}

fn python_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn unquote(value: &str) -> String {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .and_then(|v| unescape(v, '"'))
        .unwrap_or_else(|| value.to_string())
}
