//! Tuples and products
use crate::algebra::{Set, SetMap};
use crate::dimension::{Fragment, Register, Selection};
use crate::value::Value;
use indexmap::IndexMap;

/// One concrete selection: for every dimension, for every register, a domain and a value
///
/// Also used as the partial context while tuples are generated dimension by dimension.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct Tuple {
    dimensions: IndexMap<String, Fragment>,
}

impl Tuple {
    pub fn insert(&mut self, dimension: impl Into<String>, fragment: Fragment) {
        self.dimensions.insert(dimension.into(), fragment);
    }

    pub fn selection(&self, dimension: &str, register: Register) -> Option<&Selection> {
        self.dimensions.get(dimension)?.get(&register)
    }

    pub fn get(&self, dimension: &str) -> Option<&Fragment> {
        self.dimensions.get(dimension)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Fragment)> {
        self.dimensions
            .iter()
            .map(|(name, fragment)| (name.as_str(), fragment))
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// `{dimension: {register: {domain: value}}}`, the shape conditions are tested against
    pub fn to_context(&self) -> SetMap {
        self.dimensions
            .iter()
            .map(|(name, fragment)| {
                let registers = fragment
                    .iter()
                    .map(|(register, selection)| {
                        let domain = SetMap::from([(
                            selection.domain.clone(),
                            Set::Scalar(selection.value.clone()),
                        )]);
                        (register.to_string(), Set::Map(domain))
                    })
                    .collect();
                (name.clone(), Set::Map(registers))
            })
            .collect()
    }

    /// One `dimension=domain.value:domain.value` filter per dimension
    ///
    /// Feeding these back into [crate::Config::filter] restricts generation to exactly this tuple.
    pub fn filters(&self) -> Vec<String> {
        self.iter()
            .map(|(name, fragment)| {
                let last = fragment.keys().map(|register| register.0).max().unwrap_or(0);
                let segments: Vec<String> = (0..=last)
                    .map(|index| {
                        fragment
                            .get(&Register(index))
                            .map(|s| format!("{}.{}", s.domain, s.value))
                            .unwrap_or_default()
                    })
                    .collect();
                format!("{name}={}", segments.join(":"))
            })
            .collect()
    }
}

/// [Tuple::filters] joined by `,`
///
/// Split on `,` before passing it to [crate::Config::filter], a single filter never contains a comma.
impl std::fmt::Display for Tuple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.filters().join(","))
    }
}

/// A rendered variant and the tuple it was rendered for
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Product {
    pub variant: Tuple,
    pub tree: Value,
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tuple() -> Tuple {
        let mut tuple = Tuple::default();
        tuple.insert(
            "env",
            Fragment::from([
                (Register(0), Selection::new("dev".into(), "d1".into())),
                (Register(2), Selection::new("zone".into(), "a".into())),
            ]),
        );
        tuple.insert(
            "region",
            Fragment::from([(Register(0), Selection::new("eu".into(), "fra".into()))]),
        );
        tuple
    }

    #[test]
    fn display_as_filters() {
        assert_eq!(tuple().to_string(), "env=dev.d1::zone.a,region=eu.fra");
    }

    #[test]
    fn filters_per_dimension() {
        let tuple = tuple();
        assert_eq!(tuple.filters(), ["env=dev.d1::zone.a", "region=eu.fra"]);
        assert_eq!(tuple.to_string().split(',').collect::<Vec<_>>(), tuple.filters());

        let names: Vec<&str> = tuple.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["env", "region"]);
    }

    #[test]
    fn context_shape() {
        let context = tuple().to_context();
        let Set::Map(env) = &context["env"] else {
            panic!("expected map");
        };
        assert_eq!(
            env["R2"],
            Set::Map(SetMap::from([("zone".to_string(), Set::Scalar("a".into()))]))
        );
    }

    #[test]
    fn serializes_nested() {
        let json = serde_json::to_value(tuple()).unwrap();
        assert_eq!(json["env"]["R0"]["domain"], "dev");
        assert_eq!(json["region"]["R0"]["value"], "fra");
    }
}
