//! Reader for DDSim Python steering files.
//!
//! Only the flat subset that [`crate::to_steering`] writes is understood:
//!
//! ```text
//! from DDSim.DD4hepSimulation import DD4hepSimulation
//! from g4units import mm, GeV, MeV, degree
//! SIM = DD4hepSimulation()
//! SIM.numberOfEvents = 100
//! SIM.gun.energy = 5*GeV
//! SIM.gun.position = (0.0, 0.0, 0.0)
//! ```
//!
//! Values may be string literals, `True`/`False`, numbers, `number*unit`
//! with an imported unit, or tuples of numbers. Anything else is rejected
//! with the line it appeared on.

use std::collections::HashSet;

use glam::DVec3;
use gun_units::{parse_quantity, unit_by_name, Dimension, QuantityError};
use thiserror::Error;

use crate::gun::{AngularDistribution, UnknownDistribution};
use crate::simulation::Simulation;

const DRIVER_CLASS: &str = "DD4hepSimulation";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SteeringErrorKind {
    #[error("unsupported statement `{0}`")]
    UnsupportedStatement(String),

    #[error("`{0}` is not the simulation object")]
    UnknownObject(String),

    #[error("unsupported setting `{0}`")]
    UnknownField(String),

    #[error("`{0}` is used but never imported")]
    NotImported(String),

    #[error("`{0}` is not a g4units unit")]
    UnknownUnit(String),

    #[error("{field}: expected {expected}, got `{value}`")]
    InvalidValue {
        field: String,
        expected: &'static str,
        value: String,
    },

    #[error("{field}: {source}")]
    Quantity {
        field: String,
        source: QuantityError,
    },

    #[error(transparent)]
    Distribution(#[from] UnknownDistribution),

    #[error("the simulation object is created twice")]
    DuplicateSimulation,
}

/// A steering file that could not be read
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SteeringError {
    #[error("steering line {line}: {kind}")]
    Line {
        line: usize,
        kind: SteeringErrorKind,
    },

    #[error("steering file never creates a `DD4hepSimulation()` object")]
    MissingSimulation,
}

/// Read a steering file into a [`Simulation`].
///
/// Gun fields the file does not assign keep their default values.
pub fn parse_steering(text: &str) -> Result<Simulation, SteeringError> {
    let mut reader = SteeringReader::default();
    for (index, raw) in text.lines().enumerate() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }
        reader
            .statement(line)
            .map_err(|kind| SteeringError::Line {
                line: index + 1,
                kind,
            })?;
    }

    if reader.object.is_none() {
        return Err(SteeringError::MissingSimulation);
    }
    log::debug!(
        "parsed steering file: {} assignments, run {}",
        reader.assignments,
        reader.simulation.gun.run_tag()
    );
    Ok(reader.simulation)
}

#[derive(Default)]
struct SteeringReader {
    imports: HashSet<String>,
    object: Option<String>,
    simulation: Simulation,
    assignments: usize,
}

impl SteeringReader {
    fn statement(&mut self, line: &str) -> Result<(), SteeringErrorKind> {
        if let Some(rest) = line.strip_prefix("from ") {
            return self.import_from(line, rest);
        }
        if line.starts_with("import ") {
            // module imports bind nothing the gun settings can use
            return Ok(());
        }

        let Some((target, value)) = line.split_once('=') else {
            return Err(SteeringErrorKind::UnsupportedStatement(line.to_string()));
        };
        let (target, value) = (target.trim(), value.trim());

        if value == format!("{DRIVER_CLASS}()") && is_identifier(target) {
            if !self.imports.contains(DRIVER_CLASS) {
                return Err(SteeringErrorKind::NotImported(DRIVER_CLASS.to_string()));
            }
            if self.object.is_some() {
                return Err(SteeringErrorKind::DuplicateSimulation);
            }
            self.object = Some(target.to_string());
            return Ok(());
        }

        let Some((object, field)) = target.split_once('.') else {
            return Err(SteeringErrorKind::UnsupportedStatement(line.to_string()));
        };
        if self.object.as_deref() != Some(object) {
            return Err(SteeringErrorKind::UnknownObject(object.to_string()));
        }
        self.assign(field.trim(), value)?;
        self.assignments += 1;
        Ok(())
    }

    fn import_from(&mut self, line: &str, rest: &str) -> Result<(), SteeringErrorKind> {
        let Some((module, names)) = rest.split_once(" import ") else {
            return Err(SteeringErrorKind::UnsupportedStatement(line.to_string()));
        };
        let names = names.trim().trim_start_matches('(').trim_end_matches(')');
        for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if module.trim() == "g4units" && unit_by_name(name).is_none() {
                return Err(SteeringErrorKind::UnknownUnit(name.to_string()));
            }
            self.imports.insert(name.to_string());
        }
        Ok(())
    }

    fn assign(&mut self, field: &str, value: &str) -> Result<(), SteeringErrorKind> {
        let imports = &self.imports;
        let sim = &mut self.simulation;
        match field {
            "gun.energy" => sim.gun.energy = quantity(imports, field, value, Dimension::Energy)?,
            "gun.particle" => sim.gun.particle = string_literal(field, value)?,
            "gun.position" => sim.gun.position = position(imports, field, value)?,
            "gun.distribution" => {
                sim.gun.distribution = string_literal(field, value)?.parse::<AngularDistribution>()?
            }
            "gun.thetaMin" => {
                sim.gun.theta_min = quantity(imports, field, value, Dimension::Angle)?
            }
            "gun.thetaMax" => {
                sim.gun.theta_max = quantity(imports, field, value, Dimension::Angle)?
            }
            "enableGun" => sim.enable_gun = Some(boolean(field, value)?),
            "numberOfEvents" => sim.number_of_events = Some(integer(field, value)?),
            "compactFile" => sim.compact_file = Some(string_literal(field, value)?),
            "outputFile" => sim.output_file = Some(string_literal(field, value)?),
            "random.seed" => sim.random_seed = Some(integer(field, value)?),
            _ => return Err(SteeringErrorKind::UnknownField(field.to_string())),
        }
        Ok(())
    }
}

fn quantity(
    imports: &HashSet<String>,
    field: &str,
    value: &str,
    dimension: Dimension,
) -> Result<f64, SteeringErrorKind> {
    if let Some((_, unit)) = value.split_once('*') {
        let unit = unit.trim();
        if !imports.contains(unit) {
            return Err(SteeringErrorKind::NotImported(unit.to_string()));
        }
    } else if value.trim_end().ends_with(|c: char| c.is_ascii_alphabetic()) {
        // `5 GeV` is not Python
        return Err(invalid(field, "a number or number*unit", value));
    }
    parse_quantity(value, dimension).map_err(|source| SteeringErrorKind::Quantity {
        field: field.to_string(),
        source,
    })
}

fn position(
    imports: &HashSet<String>,
    field: &str,
    value: &str,
) -> Result<DVec3, SteeringErrorKind> {
    let inner = value
        .strip_prefix('(')
        .and_then(|v| v.strip_suffix(')'))
        .or_else(|| value.strip_prefix('[').and_then(|v| v.strip_suffix(']')))
        .ok_or_else(|| invalid(field, "a tuple of three coordinates", value))?;

    // `(x, y, z,)` is still a three-tuple
    let inner = inner.trim();
    let inner = inner.strip_suffix(',').unwrap_or(inner);
    let coordinates = inner
        .split(',')
        .map(|c| quantity(imports, field, c, Dimension::Length))
        .collect::<Result<Vec<_>, _>>()?;
    match coordinates.as_slice() {
        &[x, y, z] => Ok(DVec3::new(x, y, z)),
        _ => Err(invalid(field, "a tuple of three coordinates", value)),
    }
}

fn invalid(field: &str, expected: &'static str, value: &str) -> SteeringErrorKind {
    SteeringErrorKind::InvalidValue {
        field: field.to_string(),
        expected,
        value: value.to_string(),
    }
}

fn string_literal(field: &str, value: &str) -> Result<String, SteeringErrorKind> {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return unescape(inner, quote).ok_or_else(|| invalid(field, "a string literal", value));
        }
    }
    Err(invalid(field, "a string literal", value))
}

/// Decode the body of a Python string literal delimited by `quote`.
///
/// Returns `None` for a stray unescaped `quote`, a dangling backslash or a
/// malformed `\x`/`\u`/`\U` escape. Unrecognised escapes such as `\q` keep
/// their backslash, as Python does.
pub(crate) fn unescape(inner: &str, quote: char) -> Option<String> {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == quote {
            return None;
        }
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'v' => out.push('\u{0b}'),
            c @ ('\\' | '\'' | '"') => out.push(c),
            first @ '0'..='7' => {
                let mut code = first.to_digit(8)?;
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(code)?);
            }
            kind @ ('x' | 'u' | 'U') => {
                let width = match kind {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = chars.by_ref().take(width).collect();
                if digits.len() != width || !digits.chars().all(|d| d.is_ascii_hexdigit()) {
                    return None;
                }
                let code = u32::from_str_radix(&digits, 16).ok()?;
                out.push(char::from_u32(code)?);
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    Some(out)
}

fn boolean(field: &str, value: &str) -> Result<bool, SteeringErrorKind> {
    match value {
        "True" => Ok(true),
        "False" => Ok(false),
        _ => Err(invalid(field, "True or False", value)),
    }
}

fn integer<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, SteeringErrorKind> {
    value
        .replace('_', "")
        .parse()
        .map_err(|_| invalid(field, "a non-negative integer", value))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Drop a trailing `# comment`, ignoring `#` inside string literals
fn strip_comment(line: &str) -> &str {
    let mut quote = None;
    let mut escaped = false;
    for (index, c) in line.char_indices() {
        match (quote, c) {
            (Some(_), _) if escaped => escaped = false,
            (Some(_), '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (None, '"' | '\'') => quote = Some(c),
            (None, '#') => return &line[..index],
            _ => {}
        }
    }
    line
}
