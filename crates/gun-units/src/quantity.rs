//! Text form of unit-annotated quantities (`5*GeV`, `70 degree`, ...)

use crate::constants::{unit_by_name, Dimension};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuantityError {
    #[error("empty quantity")]
    Empty,

    #[error("invalid number `{0}`")]
    InvalidNumber(String),

    #[error("number `{0}` is not finite")]
    NotFinite(String),

    #[error("unknown unit `{0}`")]
    UnknownUnit(String),

    #[error("unit `{unit}` measures {found}, expected {expected}")]
    WrongDimension {
        unit: String,
        found: Dimension,
        expected: Dimension,
    },
}

/// Parse a quantity into internal units.
///
/// Accepted forms are `5*GeV`, `5 * GeV`, `5GeV`, `5 GeV` and a bare
/// number, which is taken to already be in internal units.
pub fn parse_quantity(text: &str, expected: Dimension) -> Result<f64, QuantityError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(QuantityError::Empty);
    }

    let (number, unit) = split_quantity(text);
    let value = parse_number(number)?;

    let Some(unit) = unit else {
        return Ok(value);
    };
    let (found, scale) =
        unit_by_name(unit).ok_or_else(|| QuantityError::UnknownUnit(unit.to_string()))?;
    if found != expected {
        return Err(QuantityError::WrongDimension {
            unit: unit.to_string(),
            found,
            expected,
        });
    }

    log::trace!("parsed quantity {text:?} as {value} {unit}");
    Ok(value * scale)
}

fn split_quantity(text: &str) -> (&str, Option<&str>) {
    if let Some((number, unit)) = text.split_once('*') {
        return (number.trim(), Some(unit.trim()));
    }

    let unit_start = text
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_alphabetic())
        .last()
        .map(|(index, _)| index);

    match unit_start {
        // a lone exponent marker ("1e") is not a unit; leave it to the number parser
        Some(index) if index > 0 && !text[..index].trim().is_empty() => {
            (text[..index].trim(), Some(&text[index..]))
        }
        _ => (text, None),
    }
}

fn parse_number(text: &str) -> Result<f64, QuantityError> {
    let value: f64 = text
        .parse()
        .map_err(|_| QuantityError::InvalidNumber(text.to_string()))?;
    if !value.is_finite() {
        return Err(QuantityError::NotFinite(text.to_string()));
    }
    Ok(value)
}

/// Express `value` (internal units) in the display unit of `dimension`.
///
/// The result is rounded to 12 significant digits when that still maps back
/// to exactly `value`, so `70.0 * degree` reads back as `70`.
pub fn in_display_unit(value: f64, dimension: Dimension) -> f64 {
    let (_, scale) = dimension.display_unit();
    exact_display_value(value, scale).unwrap_or(value / scale)
}

fn exact_display_value(value: f64, scale: f64) -> Option<f64> {
    let exact = value / scale;
    if exact == 0.0 || !exact.is_finite() {
        return Some(exact);
    }

    let magnitude = exact.abs().log10().floor() as i32;
    let factor = 10f64.powi(11 - magnitude);
    let rounded = (exact * factor).round() / factor;
    [rounded, exact]
        .into_iter()
        .find(|candidate| candidate * scale == value)
}

/// Format a quantity as `<number>*<unit>`.
///
/// Uses the display unit of the dimension when the number reads back to
/// exactly `value`, otherwise the internal unit.
pub fn format_quantity(value: f64, dimension: Dimension) -> String {
    let (unit, scale) = dimension.display_unit();
    match exact_display_value(value, scale) {
        Some(shown) => format!("{shown}*{unit}"),
        None => format!("{value}*{}", dimension.base_unit()),
    }
}
