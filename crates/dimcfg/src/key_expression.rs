//! Key-expression parser
//!
//! Strips dimension annotations from a mapping key and turns them into [Condition]s.
//!
//! ```text
//! url[[prod]]{{eu}}   →   ("url", [env: prod, region: eu])
//! ```
//!
//! Dimensions are tried in the order they are given (longest brackets first), so a marker that is a
//! substring of another marker does not steal its annotations. Annotations must trail the key name;
//! anything but whitespace after the leftmost annotation is an error.
use crate::dimension::{merge_conditions, Brackets, Condition, Dimension};
use crate::error::{Error, Result};
use crate::expression;

/// A complete annotation found by [scan]
#[derive(Debug, PartialEq, derive_new::new)]
pub struct Annotation {
    /// index of the first character of the left bracket
    pub start: usize,
    /// index one past the last character of the right bracket
    pub end: usize,
    pub expression: String,
}

#[derive(Debug, PartialEq)]
pub enum Scan {
    NotFound,
    Found(Annotation),
    /// A left bracket was found but never closed
    Unterminated,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Scanning,
    LeftBracket { matched: usize },
    Condition,
    RightBracket { matched: usize },
    Exit,
}

/// Find the first annotation at or after `from`
///
/// A bracket is only entered once the complete delimiter has been confirmed by lookahead, so the
/// in-bracket states never need to backtrack.
pub fn scan(chars: &[char], from: usize, brackets: &Brackets) -> Scan {
    let width = brackets.len();
    let mut state = State::Scanning;
    let mut start = from;
    let mut expression = String::new();

    // state after the first character of a right bracket
    let closing = || {
        if width == 1 {
            State::Exit
        } else {
            State::RightBracket { matched: 1 }
        }
    };

    for pos in from..chars.len() {
        let rest = &chars[pos..];
        let opens = rest.starts_with(brackets.left());
        let closes = rest.starts_with(brackets.right());

        state = match (state, opens, closes) {
            (State::Scanning, true, _) => {
                start = pos;
                State::LeftBracket { matched: 1 }
            }
            (State::Scanning, false, _) => State::Scanning,
            (State::LeftBracket { matched }, _, _) if matched < width => State::LeftBracket {
                matched: matched + 1,
            },
            (State::LeftBracket { .. } | State::Condition, _, true) => closing(),
            (State::LeftBracket { .. } | State::Condition, _, false) => {
                expression.push(chars[pos]);
                State::Condition
            }
            (State::RightBracket { matched }, _, _) if matched + 1 == width => State::Exit,
            (State::RightBracket { matched }, _, _) => State::RightBracket {
                matched: matched + 1,
            },
            (State::Exit, _, _) => unreachable!("scan loop stops at exit"),
        };

        if state == State::Exit {
            tracing::trace!(start, end = pos + 1, %expression, "annotation found");
            return Scan::Found(Annotation::new(start, pos + 1, expression));
        }
    }

    match state {
        State::Scanning => Scan::NotFound,
        _ => Scan::Unterminated,
    }
}

/// Strip all annotations from `key`
///
/// Returns the remaining key (untrimmed) and the AND-ed conditions of all annotations.
#[tracing::instrument(level = "trace", skip(dimensions))]
pub fn parse_key(key: &str, dimensions: &[Dimension]) -> Result<(String, Vec<Condition>)> {
    let mut chars: Vec<char> = key.chars().collect();
    let mut name_end = chars.len();
    let mut conditions = vec![];

    for dimension in dimensions {
        let mut from = 0;
        loop {
            let annotation = match scan(&chars, from, dimension.brackets()) {
                Scan::NotFound => break,
                Scan::Unterminated => {
                    return Err(Error::UnterminatedAnnotation {
                        key: key.to_string(),
                        dimension: dimension.name().to_string(),
                    })
                }
                Scan::Found(annotation) => annotation,
            };

            chars.drain(annotation.start..annotation.end);
            name_end = name_end.min(annotation.start);
            from = annotation.start;

            let expression = annotation.expression.trim();
            if !expression.is_empty() {
                let parsed = expression::parse_condition(expression, dimension)
                    .map_err(|e| e.in_key(key))?;
                merge_conditions(&mut conditions, parsed);
            }
        }
    }

    if chars[name_end..].iter().any(|c| !c.is_whitespace()) {
        return Err(Error::TrailingGarbage {
            key: key.to_string(),
        });
    }

    Ok((chars.into_iter().collect(), conditions))
}
