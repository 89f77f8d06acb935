//! Dimension model
//!
//! A [Dimension] is a named axis of variation. It owns a list of [Item]s, each assigning values to one
//! `(register, domain)` pair and gated by [Condition]s on previously declared dimensions.
use crate::algebra::{self, contains, Containment, Domains, Set, SetMap};
use crate::error::{Error, Result};
use indexmap::IndexMap;

/// Indexed slot within a dimension (`R0`, `R1`, ...)
///
/// Selected by the number of leading colons in an annotation or interpolation marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Register(pub usize);

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R{}", self.0)
    }
}

impl serde::Serialize for Register {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Symmetric bracket marker, e.g. `[[]]` → `[[` and `]]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Brackets {
    left: Vec<char>,
    right: Vec<char>,
}

impl Brackets {
    /// Split a marker of even (character) length in two halves
    pub fn parse(name: &str, marker: &str) -> Result<Self> {
        let chars: Vec<char> = marker.chars().collect();
        if chars.is_empty() || chars.len() % 2 != 0 {
            return Err(Error::MalformedBrackets {
                name: name.to_string(),
                brackets: marker.to_string(),
            });
        }

        let (left, right) = chars.split_at(chars.len() / 2);
        Ok(Self {
            left: left.to_vec(),
            right: right.to_vec(),
        })
    }

    pub fn left(&self) -> &[char] {
        &self.left
    }

    pub fn right(&self) -> &[char] {
        &self.right
    }

    /// Length of one delimiter
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    pub fn marker(&self) -> String {
        self.left.iter().chain(self.right.iter()).collect()
    }
}

/// Predicate on one register of one dimension: `{ dimension: { register: { domain: [values] } } }`
#[derive(Debug, Clone, PartialEq, derive_new::new, serde::Serialize)]
pub struct Condition {
    pub dimension: String,
    pub register: Register,
    pub domains: Domains,
}

impl Condition {
    pub fn to_set(&self) -> SetMap {
        let register = SetMap::from([(self.register.to_string(), Set::from(&self.domains))]);
        SetMap::from([(self.dimension.clone(), Set::Map(register))])
    }

    /// Test against a (partial) tuple context
    pub fn matches(&self, context: &SetMap, mode: Containment) -> bool {
        contains(&self.to_set(), context, mode)
    }
}

/// AND-merge conditions into a running list, skipping exact duplicates
pub fn merge_conditions(
    into: &mut Vec<Condition>,
    conditions: impl IntoIterator<Item = Condition>,
) {
    for condition in conditions {
        if !into.contains(&condition) {
            into.push(condition);
        }
    }
}

/// One declared `(register, domain) → [values]` unit
#[derive(Debug, Clone, PartialEq, derive_new::new)]
pub struct Item {
    pub register: Register,
    pub domain: String,
    pub values: Vec<String>,
    pub conditions: Vec<Condition>,
}

/// Selected domain and value for one register
#[derive(Debug, Clone, PartialEq, Eq, derive_new::new, serde::Serialize)]
pub struct Selection {
    pub domain: String,
    pub value: String,
}

/// Per-dimension part of a tuple
pub type Fragment = IndexMap<Register, Selection>;

/// Current values of a dimension, per register, used to re-validate dependent conditions
pub type MergedValues = IndexMap<Register, Domains>;

#[derive(Debug)]
pub struct Dimension {
    name: String,
    brackets: Brackets,
    items: Vec<Item>,
    /// Names of the dimensions referenced by item conditions
    depends: Vec<String>,
}

impl Dimension {
    pub fn new(name: impl Into<String>, brackets: Brackets, items: Vec<Item>) -> Self {
        let mut depends: Vec<String> = vec![];
        for condition in items.iter().flat_map(|item| &item.conditions) {
            if !depends.contains(&condition.dimension) {
                depends.push(condition.dimension.clone());
            }
        }

        Self {
            name: name.into(),
            brackets,
            items,
            depends,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn brackets(&self) -> &Brackets {
        &self.brackets
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn depends(&self) -> &[String] {
        &self.depends
    }

    /// Registers in order of first appearance
    pub fn registers(&self) -> Vec<Register> {
        let mut registers = vec![];
        for item in &self.items {
            if !registers.contains(&item.register) {
                registers.push(item.register);
            }
        }
        registers
    }

    pub fn has_register(&self, register: Register) -> bool {
        self.items.iter().any(|item| item.register == register)
    }

    /// Domains of a register in order of first appearance
    pub fn domains(&self, register: Register) -> Vec<&str> {
        let mut domains = vec![];
        for item in self.items_of(register) {
            if !domains.contains(&item.domain.as_str()) {
                domains.push(item.domain.as_str());
            }
        }
        domains
    }

    pub fn has_domain(&self, domain: &str, register: Register) -> bool {
        self.items_of(register).any(|item| item.domain == domain)
    }

    /// All values of a domain, merged over every item declaring it
    pub fn values(&self, domain: &str, register: Register) -> Vec<String> {
        let mut values: Vec<String> = vec![];
        for item in self.items_of(register).filter(|item| item.domain == domain) {
            for value in &item.values {
                if !values.contains(value) {
                    values.push(value.clone());
                }
            }
        }
        values
    }

    pub fn has_value(&self, value: &str, domain: &str, register: Register) -> bool {
        self.items_of(register)
            .filter(|item| item.domain == domain)
            .any(|item| item.values.iter().any(|v| v == value))
    }

    fn items_of(&self, register: Register) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(move |item| item.register == register)
    }

    /// Resolve one expression segment to `{domain: [values]}`
    ///
    /// Resolution order:
    /// 1. `domain.value` - the domain must exist and contain the value
    /// 2. `domain` - all values of that domain
    /// 3. `value` - the first domain (in declaration order) containing it
    pub fn resolve_value(&self, raw: &str, register: Register) -> Result<Domains> {
        let unresolved = || Error::Unresolved {
            dimension: self.name.clone(),
            register,
            value: raw.to_string(),
        };

        if !self.has_register(register) {
            return Err(Error::UnknownRegister {
                dimension: self.name.clone(),
                register,
            });
        }

        if let Some((domain, value)) = raw.split_once('.') {
            if !self.has_value(value, domain, register) {
                return Err(unresolved());
            }
            return Ok(Domains::from([(domain.to_string(), vec![value.to_string()])]));
        }

        if self.has_domain(raw, register) {
            return Ok(Domains::from([(
                raw.to_string(),
                self.values(raw, register),
            )]));
        }

        self.domains(register)
            .into_iter()
            .find(|domain| self.has_value(raw, domain, register))
            .map(|domain| Domains::from([(domain.to_string(), vec![raw.to_string()])]))
            .ok_or_else(unresolved)
    }

    /// Current values of every register, merged per domain
    pub fn merged_values(&self) -> MergedValues {
        let mut merged = MergedValues::new();
        for item in &self.items {
            let values = merged
                .entry(item.register)
                .or_default()
                .entry(item.domain.clone())
                .or_default();
            for value in &item.values {
                if !values.contains(value) {
                    values.push(value.clone());
                }
            }
        }
        merged
    }

    /// Every selection of this dimension allowed by `context`
    ///
    /// Registers combine as a cartesian product. Items whose conditions fail `context` are skipped. A
    /// dimension without items yields nothing.
    #[tracing::instrument(level = "trace", skip_all, fields(dimension = %self.name))]
    pub fn generate_tuples(&self, context: &SetMap, mode: Containment) -> Vec<Fragment> {
        let registers = self.registers();
        let mut fragments = vec![];
        if !registers.is_empty() {
            self.generate_recursive(context, mode, &registers, &Fragment::new(), &mut fragments);
        }
        fragments
    }

    fn generate_recursive(
        &self,
        context: &SetMap,
        mode: Containment,
        registers: &[Register],
        accum: &Fragment,
        fragments: &mut Vec<Fragment>,
    ) {
        let Some((register, rest)) = registers.split_first() else {
            fragments.push(accum.clone());
            return;
        };

        for item in self.items_of(*register) {
            if !item
                .conditions
                .iter()
                .all(|condition| condition.matches(context, mode))
            {
                continue;
            }

            for value in &item.values {
                let mut next = accum.clone();
                next.insert(*register, Selection::new(item.domain.clone(), value.clone()));
                self.generate_recursive(context, mode, rest, &next, fragments);
            }
        }
    }

    /// Restrict items by filters, then drop items whose conditions no longer hold
    ///
    /// `dependencies` holds the current values of every dimension in [Dimension::depends].
    pub fn filter_items(
        &mut self,
        filters: &[Condition],
        dependencies: &IndexMap<String, MergedValues>,
    ) {
        for filter in filters {
            if filter.dimension != self.name {
                continue;
            }
            self.apply_filter(filter);
        }

        self.update_conditioned_items(dependencies);
    }

    fn apply_filter(&mut self, filter: &Condition) {
        let before = self.items.len();
        let name = &self.name;

        self.items.retain_mut(|item| {
            if item.register != filter.register {
                return true;
            }

            let domains = Domains::from([(item.domain.clone(), item.values.clone())]);
            match algebra::intersect_domains(&domains, &filter.domains).shift_remove(&item.domain) {
                Some(values) => {
                    item.values = values;
                    true
                }
                None => {
                    tracing::debug!(dimension = %name, domain = %item.domain, "item filtered out");
                    false
                }
            }
        });

        tracing::trace!(dimension = %self.name, before, after = self.items.len(), "filter applied");
    }

    fn update_conditioned_items(&mut self, dependencies: &IndexMap<String, MergedValues>) {
        let name = &self.name;

        self.items.retain_mut(|item| {
            for condition in &mut item.conditions {
                let current = dependencies
                    .get(&condition.dimension)
                    .and_then(|merged| merged.get(&condition.register))
                    .map(|domains| algebra::intersect_domains(domains, &condition.domains))
                    .unwrap_or_default();

                if current.is_empty() {
                    tracing::debug!(
                        dimension = %name,
                        depends = %condition.dimension,
                        domain = %item.domain,
                        "item invalidated by dependency filter"
                    );
                    return false;
                }

                condition.domains = current;
            }
            true
        });
    }

    /// Declared items grouped by register and domain
    pub fn info(&self) -> IndexMap<Register, IndexMap<String, Vec<ItemInfo>>> {
        let mut info: IndexMap<Register, IndexMap<String, Vec<ItemInfo>>> = IndexMap::new();
        for item in &self.items {
            info.entry(item.register)
                .or_default()
                .entry(item.domain.clone())
                .or_default()
                .push(ItemInfo {
                    values: item.values.clone(),
                    conditions: item.conditions.clone(),
                });
        }
        info
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ItemInfo {
    pub values: Vec<String>,
    pub conditions: Vec<Condition>,
}
