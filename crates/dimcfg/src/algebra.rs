//! Condition / set algebra
//!
//! Conditions, filters and tuples are all compared as nested [Set]s:
//!
//! | shape                  | condition          | tuple (context)   |
//! |------------------------|--------------------|-------------------|
//! | dimension → register   | [Set::Map]         | [Set::Map]        |
//! | register → domain      | [Set::Map]         | [Set::Map]        |
//! | domain → values        | [Set::List]        | [Set::Scalar]     |
//!
//! [contains] answers "does this context satisfy this predicate", [Set::intersect] computes the structural
//! intersection used when filtering.
use indexmap::IndexMap;

pub type SetMap = IndexMap<String, Set>;

/// Domain name → values
pub type Domains = IndexMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq)]
pub enum Set {
    Scalar(String),
    List(Vec<String>),
    Map(SetMap),
}

/// How [contains] combines the keys of a predicate map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Containment {
    /// The first key that yields a decision decides for the whole map.
    ///
    /// Predicates built from declarations only ever have one key per level, where both modes agree.
    #[default]
    FirstKey,
    /// Every key must match.
    AllKeys,
}

/// Structural containment test
///
/// A missing key in `context` fails immediately. Leaves compare as follows:
/// - list vs list: must share at least one value
/// - list vs scalar: scalar must be a member
/// - scalar vs scalar: must be equal
/// - map vs map: recurse
///
/// A scalar predicate against a container is skipped, any other shape mismatch fails.
pub fn contains(predicate: &SetMap, context: &SetMap, mode: Containment) -> bool {
    for (key, expected) in predicate {
        let Some(actual) = context.get(key) else {
            return false;
        };

        let matched = match (expected, actual) {
            (Set::Map(expected), Set::Map(actual)) => contains(expected, actual, mode),
            (Set::Map(_), _) => false,
            (Set::List(expected), Set::List(actual)) => {
                expected.iter().any(|value| actual.contains(value))
            }
            (Set::List(expected), Set::Scalar(actual)) => expected.contains(actual),
            (Set::List(_), Set::Map(_)) => false,
            (Set::Scalar(expected), Set::Scalar(actual)) => expected == actual,
            (Set::Scalar(_), _) => continue,
        };

        match mode {
            Containment::FirstKey => return matched,
            Containment::AllKeys if !matched => return false,
            Containment::AllKeys => {}
        }
    }

    true
}

impl Set {
    /// Hierarchical intersection
    ///
    /// Maps intersect key-wise (a key survives only if both sides have it and the nested intersection is
    /// not empty), lists by value in `self`'s order, scalars only if equal. Empty results are `None`.
    pub fn intersect(&self, other: &Set) -> Option<Set> {
        match (self, other) {
            (Set::Map(left), Set::Map(right)) => {
                let result: SetMap = left
                    .iter()
                    .filter_map(|(key, value)| {
                        let other = right.get(key)?;
                        value.intersect(other).map(|res| (key.clone(), res))
                    })
                    .collect();

                (!result.is_empty()).then_some(Set::Map(result))
            }
            (Set::List(left), Set::List(right)) => {
                let result: Vec<String> = left
                    .iter()
                    .filter(|value| right.contains(value))
                    .cloned()
                    .collect();

                (!result.is_empty()).then_some(Set::List(result))
            }
            (Set::Scalar(left), Set::Scalar(right)) if left == right => {
                Some(Set::Scalar(left.clone()))
            }
            _ => None,
        }
    }

    pub fn into_map(self) -> Option<SetMap> {
        match self {
            Set::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<&Domains> for Set {
    fn from(domains: &Domains) -> Self {
        Set::Map(
            domains
                .iter()
                .map(|(domain, values)| (domain.clone(), Set::List(values.clone())))
                .collect(),
        )
    }
}

/// Intersect two domain maps, dropping domains that end up empty
pub fn intersect_domains(left: &Domains, right: &Domains) -> Domains {
    let Some(Set::Map(result)) = Set::from(left).intersect(&Set::from(right)) else {
        return Domains::new();
    };

    result
        .into_iter()
        .filter_map(|(domain, values)| match values {
            Set::List(values) => Some((domain, values)),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn map<const N: usize>(entries: [(&str, Set); N]) -> SetMap {
        entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    }

    fn list(values: &[&str]) -> Set {
        Set::List(values.iter().map(|v| v.to_string()).collect())
    }

    fn scalar(value: &str) -> Set {
        Set::Scalar(value.to_string())
    }

    #[test]
    fn list_contains_scalar() {
        let predicate = map([("env", Set::Map(map([("dev", list(&["d1", "d2"]))])))]);
        let dev = map([("env", Set::Map(map([("dev", scalar("d2"))])))]);
        let prod = map([("env", Set::Map(map([("prod", scalar("p1"))])))]);

        assert!(contains(&predicate, &dev, Containment::FirstKey));
        assert!(!contains(&predicate, &prod, Containment::FirstKey));
    }

    #[test]
    fn list_intersects_list() {
        let predicate = map([("a", list(&["x", "y"]))]);
        assert!(contains(&predicate, &map([("a", list(&["y", "z"]))]), Containment::FirstKey));
        assert!(!contains(&predicate, &map([("a", list(&["z"]))]), Containment::FirstKey));
    }

    #[test]
    fn shape_mismatch_fails() {
        let predicate = map([("a", Set::Map(map([("b", scalar("c"))])))]);
        assert!(!contains(&predicate, &map([("a", scalar("c"))]), Containment::FirstKey));
    }

    #[test]
    fn first_key_decides() {
        let predicate = map([("a", scalar("1")), ("b", scalar("2"))]);
        let context = map([("a", scalar("1")), ("b", scalar("3"))]);

        assert!(contains(&predicate, &context, Containment::FirstKey));
        assert!(!contains(&predicate, &context, Containment::AllKeys));
    }

    #[test]
    fn scalar_against_container_is_skipped() {
        let predicate = map([("a", scalar("1")), ("b", scalar("2"))]);
        let context = map([("a", list(&["1"])), ("b", scalar("2"))]);

        assert!(contains(&predicate, &context, Containment::FirstKey));
    }

    #[test]
    fn intersect_nested() {
        let left = Set::Map(map([
            ("dev", list(&["d1", "d2"])),
            ("prod", list(&["p1"])),
        ]));
        let right = Set::Map(map([("dev", list(&["d2", "d3"])), ("qa", list(&["q1"]))]));

        assert_eq!(
            left.intersect(&right),
            Some(Set::Map(map([("dev", list(&["d2"]))])))
        );
    }

    #[test]
    fn intersect_empty_is_none() {
        let left = Set::Map(map([("dev", list(&["d1"]))]));
        let right = Set::Map(map([("dev", list(&["d2"]))]));

        assert_eq!(left.intersect(&right), None);
        assert_eq!(scalar("a").intersect(&list(&["a"])), None);
    }
}
