//! Expression grammar shared by key annotations, initializer keys and filters
//!
//! Segments separated by `:` map positionally to registers (`dev:eu` → `R0: dev`, `R1: eu`, `:eu` → `R1: eu`).
//! Empty segments are skipped. Each segment is `value`, `domain.value` or a bare `domain`.
//! Commas are never allowed: one value per register per expression.
use crate::dimension::{Condition, Dimension, Register};
use crate::error::{Error, Result};
use indexmap::IndexMap;

fn segments(expression: &str) -> Result<impl Iterator<Item = (Register, &str)>> {
    if expression.contains(',') {
        return Err(Error::CommaInExpression {
            expression: expression.to_string(),
        });
    }

    Ok(expression
        .split(':')
        .enumerate()
        .map(|(index, segment)| (Register(index), segment.trim()))
        .filter(|(_, segment)| !segment.is_empty()))
}

/// Condition expression, resolved against `dimension`
///
/// Yields one [Condition] per non-empty register segment.
pub fn parse_condition(expression: &str, dimension: &Dimension) -> Result<Vec<Condition>> {
    segments(expression)?
        .map(|(register, segment)| {
            dimension
                .resolve_value(segment, register)
                .map(|domains| Condition::new(dimension.name().to_string(), register, domains))
        })
        .collect()
}

/// Initializer key of a dimension declaration: `domain` or `:::domain`
pub fn parse_domain(expression: &str) -> Result<(Register, String)> {
    let mut parts = segments(expression)?;
    match (parts.next(), parts.next()) {
        (Some((register, domain)), None) => Ok((register, domain.to_string())),
        _ => Err(Error::RegisterCount {
            expression: expression.to_string(),
        }),
    }
}

/// Parse `dimension=expression` filters into conditions
///
/// `dimensions` is looked up by name; every filter must name a known dimension.
pub fn parse_filters<S: AsRef<str>>(
    filters: impl IntoIterator<Item = S>,
    dimensions: &IndexMap<&str, &Dimension>,
) -> Result<Vec<Condition>> {
    let mut conditions = vec![];

    for filter in filters {
        let filter = filter.as_ref();
        let (name, expression) = filter
            .split_once('=')
            .filter(|(name, expression)| !name.is_empty() && !expression.is_empty())
            .ok_or_else(|| Error::MalformedFilter {
                filter: filter.to_string(),
            })?;

        let dimension = dimensions
            .get(name)
            .ok_or_else(|| Error::UnknownDimension {
                dimension: name.to_string(),
            })
            .map_err(|e| e.in_filter(filter))?;

        let parsed = parse_condition(expression, dimension).map_err(|e| e.in_filter(filter))?;
        tracing::trace!(%filter, conditions = parsed.len(), "filter parsed");
        conditions.extend(parsed);
    }

    Ok(conditions)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dimension::test::{domains, env};
    use pretty_assertions::assert_eq;

    #[test]
    fn condition_per_register() {
        let conditions = parse_condition("prod:b", &env()).unwrap();
        assert_eq!(
            conditions,
            [
                Condition::new("env".into(), Register(0), domains("prod", &["p1"])),
                Condition::new("env".into(), Register(1), domains("zone", &["b"])),
            ]
        );
    }

    #[test]
    fn condition_skips_empty_segments() {
        let conditions = parse_condition(":zone", &env()).unwrap();
        assert_eq!(
            conditions,
            [Condition::new("env".into(), Register(1), domains("zone", &["a", "b"]))]
        );
    }

    #[test]
    fn comma_not_allowed() {
        assert!(matches!(
            parse_condition("dev,prod", &env()),
            Err(Error::CommaInExpression { .. })
        ));
        assert!(matches!(
            parse_domain("dev,prod"),
            Err(Error::CommaInExpression { .. })
        ));
    }

    #[test]
    fn domain_expression() {
        assert_eq!(parse_domain("dev").unwrap(), (Register(0), "dev".to_string()));
        assert_eq!(parse_domain("::zone").unwrap(), (Register(2), "zone".to_string()));
        assert!(matches!(parse_domain("a:b"), Err(Error::RegisterCount { .. })));
        assert!(matches!(parse_domain(""), Err(Error::RegisterCount { .. })));
    }

    #[test]
    fn filters() {
        let env = env();
        let dimensions = IndexMap::from([("env", &env)]);

        let conditions = parse_filters(["env=dev.d1", "env=:a"], &dimensions).unwrap();
        assert_eq!(conditions.len(), 2);

        let err = parse_filters(["env=staging"], &dimensions).unwrap_err();
        assert!(matches!(&err, Error::Filter { filter, .. } if filter == "env=staging"));
        assert!(matches!(err.root_cause(), Error::Unresolved { .. }));

        assert!(matches!(
            parse_filters(["region=eu"], &dimensions).unwrap_err().root_cause(),
            Error::UnknownDimension { .. }
        ));
        assert!(matches!(
            parse_filters(["env"], &dimensions),
            Err(Error::MalformedFilter { .. })
        ));
    }
}
