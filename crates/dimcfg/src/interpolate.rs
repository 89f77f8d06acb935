//! String interpolation
//!
//! A marker is a dimension's bracket pair around an optional colon run (the register) and one control
//! character:
//!
//! | marker    | emits                                             |
//! |-----------|---------------------------------------------------|
//! | `[[.]]`   | the dimension name                                |
//! | `[[@]]`   | the selected value of the register                |
//! | `[[$]]`   | the selected domain of the register               |
//! | `[[:@]]`  | same as above, for register `R1`                  |
use crate::dimension::{Dimension, Register};
use crate::error::{Error, Result};
use crate::tuple::Tuple;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Marker {
    Name,
    Value,
    Domain,
}

impl Marker {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(Marker::Name),
            '@' => Some(Marker::Value),
            '$' => Some(Marker::Domain),
            _ => None,
        }
    }
}

/// Replace all markers of every dimension, in the given dimension order
pub fn interpolate(value: &str, dimensions: &[Dimension], tuple: &Tuple) -> Result<String> {
    let mut result = value.to_string();
    for dimension in dimensions {
        result = interpolate_dimension(&result, dimension, tuple).map_err(|e| {
            Error::Interpolation {
                value: value.to_string(),
                source: Box::new(e),
            }
        })?;
    }
    Ok(result)
}

fn interpolate_dimension(input: &str, dimension: &Dimension, tuple: &Tuple) -> Result<String> {
    let brackets = dimension.brackets();
    let chars: Vec<char> = input.chars().collect();
    let mut output = String::with_capacity(input.len());
    let mut pos = 0;

    while pos < chars.len() {
        if let Some((marker, register, end)) = match_marker(&chars, pos, dimension) {
            output.push_str(&resolve(dimension, marker, register, tuple)?);
            pos = end;
            continue;
        }

        output.push(chars[pos]);
        pos += 1;
    }

    tracing::trace!(
        dimension = dimension.name(),
        brackets = %brackets.marker(),
        %output,
        "interpolated"
    );
    Ok(output)
}

/// Marker starting exactly at `pos`, with the position right after it
fn match_marker(
    chars: &[char],
    pos: usize,
    dimension: &Dimension,
) -> Option<(Marker, Register, usize)> {
    let brackets = dimension.brackets();
    if !chars[pos..].starts_with(brackets.left()) {
        return None;
    }

    let mut cursor = pos + brackets.len();
    let colons = chars[cursor..].iter().take_while(|c| **c == ':').count();
    cursor += colons;

    let marker = Marker::from_char(*chars.get(cursor)?)?;
    cursor += 1;

    if !chars[cursor..].starts_with(brackets.right()) {
        return None;
    }

    Some((marker, Register(colons), cursor + brackets.len()))
}

fn resolve(
    dimension: &Dimension,
    marker: Marker,
    register: Register,
    tuple: &Tuple,
) -> Result<String> {
    if !dimension.has_register(register) {
        return Err(Error::UnknownRegister {
            dimension: dimension.name().to_string(),
            register,
        });
    }

    let selection = tuple.selection(dimension.name(), register);
    let resolved = match marker {
        Marker::Name => Some(dimension.name()),
        Marker::Value => selection.map(|s| s.value.as_str()),
        Marker::Domain => selection.map(|s| s.domain.as_str()),
    };

    match resolved {
        Some(resolved) if !resolved.is_empty() => Ok(resolved.to_string()),
        _ => Err(Error::EmptyInterpolation {
            dimension: dimension.name().to_string(),
            register,
        }),
    }
}
