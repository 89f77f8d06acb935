//! Config engine
//!
//! Owns the dimensions and the property tree of one document and turns them into products:
//! filter (once) → generate tuples → render the tree for each tuple.
use crate::algebra::{Containment, SetMap};
use crate::dimension::{Condition, Dimension, MergedValues};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::expression;
use crate::interpolate::interpolate;
use crate::tree::{Child, Node, NodeId, Tree};
use crate::tuple::{Product, Tuple};
use crate::value::Value;
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// How a single condition's keys are combined when tested against a tuple
    pub containment: Containment,
}

#[derive(Debug)]
pub struct Config {
    /// Sorted by descending bracket length
    dimensions: Vec<Dimension>,
    /// Dimension names in declaration order
    declared: Vec<String>,
    tree: Tree,
    options: Options,
}

impl Config {
    pub fn parse(document: &Value) -> Result<Self> {
        Self::parse_with(document, Options::default())
    }

    pub fn parse_with(document: &Value, options: Options) -> Result<Self> {
        let Document {
            dimensions,
            declared,
            tree,
        } = Document::parse(document)?;

        Ok(Self {
            dimensions,
            declared,
            tree,
            options,
        })
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|dimension| dimension.name() == name)
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// Restrict generation with `dimension=expression` filters
    ///
    /// Filters only ever shrink value sets. Dimensions are visited in declaration order, so a dimension
    /// whose conditions refer to a filtered dimension sees the filtered values and drops items that no
    /// longer match.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn filter<S: AsRef<str>>(&mut self, filters: impl IntoIterator<Item = S>) -> Result<()> {
        let filters: Vec<Condition> = {
            let lookup: IndexMap<&str, &Dimension> = self
                .dimensions
                .iter()
                .map(|dimension| (dimension.name(), dimension))
                .collect();
            expression::parse_filters(filters, &lookup)?
        };

        if filters.is_empty() {
            return Ok(());
        }

        for name in &self.declared {
            let Some(index) = self.dimensions.iter().position(|d| d.name() == name.as_str()) else {
                continue;
            };

            let dependencies: IndexMap<String, MergedValues> = self.dimensions[index]
                .depends()
                .iter()
                .filter_map(|dependency| {
                    self.dimensions
                        .iter()
                        .find(|d| d.name() == dependency.as_str())
                        .map(|d| (dependency.clone(), d.merged_values()))
                })
                .collect();

            self.dimensions[index].filter_items(&filters, &dependencies);
        }

        Ok(())
    }

    /// Stored order, except that a dimension always comes after the dimensions it depends on
    pub fn generation_order(&self) -> Vec<&Dimension> {
        let mut pending: Vec<&Dimension> = self.dimensions.iter().collect();
        let mut ordered: Vec<&Dimension> = Vec::with_capacity(pending.len());

        while !pending.is_empty() {
            let next = pending
                .iter()
                .position(|dimension| {
                    dimension
                        .depends()
                        .iter()
                        .all(|dependency| ordered.iter().any(|d| d.name() == dependency.as_str()))
                })
                // dependencies always point to earlier declarations, so there is no cycle
                .unwrap_or(0);
            ordered.push(pending.remove(next));
        }

        ordered
    }

    /// Every valid tuple
    ///
    /// Without dimensions there is exactly one, empty, tuple.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn generate(&self) -> Vec<Tuple> {
        let order = self.generation_order();
        let mut tuples = vec![];
        self.generate_recursive(&order, &Tuple::default(), &mut tuples);

        tracing::debug!(count = tuples.len(), "tuples generated");
        tuples
    }

    fn generate_recursive(
        &self,
        dimensions: &[&Dimension],
        context: &Tuple,
        tuples: &mut Vec<Tuple>,
    ) {
        let Some((dimension, rest)) = dimensions.split_first() else {
            tuples.push(context.clone());
            return;
        };

        let context_set = context.to_context();
        for fragment in dimension.generate_tuples(&context_set, self.options.containment) {
            let mut next = context.clone();
            next.insert(dimension.name(), fragment);
            self.generate_recursive(rest, &next, tuples);
        }
    }

    /// Render the property tree for one tuple
    #[tracing::instrument(level = "trace", skip_all, fields(tuple = %tuple))]
    pub fn render(&self, tuple: &Tuple) -> Result<Value> {
        let context = tuple.to_context();
        self.render_node(self.tree.root(), tuple, &context)
    }

    /// Replace interpolation markers in `value`
    pub fn interpolate(&self, value: &str, tuple: &Tuple) -> Result<String> {
        interpolate(value, &self.dimensions, tuple)
    }

    /// Generate and render every tuple
    pub fn products(&self) -> Result<Vec<Product>> {
        self.generate()
            .into_iter()
            .map(|variant| {
                let tree = self.render(&variant)?;
                Ok(Product { variant, tree })
            })
            .collect()
    }

    fn satisfied(&self, conditions: &[Condition], context: &SetMap) -> bool {
        conditions
            .iter()
            .all(|condition| condition.matches(context, self.options.containment))
    }

    fn render_node(&self, id: NodeId, tuple: &Tuple, context: &SetMap) -> Result<Value> {
        match self.tree.get(id) {
            Node::Map(entries) => {
                let mut result: Option<Value> = None;

                for entry in entries.iter().filter(|e| self.satisfied(&e.conditions, context)) {
                    let value = self.render_child(&entry.child, tuple, context)?;

                    let Some(key) = &entry.key else {
                        // anonymous entries stand for the node itself
                        result = Some(value);
                        continue;
                    };

                    match result.get_or_insert_with(|| Value::Object(Default::default())) {
                        Value::Object(object) => {
                            object.insert(key.clone(), value);
                        }
                        _ => return Err(Error::KeyIntoScalar { key: key.clone() }),
                    }
                }

                Ok(result.unwrap_or_else(|| Value::Object(Default::default())))
            }
            Node::Array(entries) => entries
                .iter()
                .filter(|e| self.satisfied(&e.conditions, context))
                .map(|entry| self.render_child(&entry.child, tuple, context))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
        }
    }

    fn render_child(&self, child: &Child, tuple: &Tuple, context: &SetMap) -> Result<Value> {
        match child {
            Child::Node(id) => self.render_node(*id, tuple, context),
            Child::Scalar(Value::String(value)) => {
                Ok(Value::String(self.interpolate(value, tuple)?))
            }
            Child::Scalar(value) => Ok(value.clone()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dimension::Register;
    use crate::yaml;
    use pretty_assertions::assert_eq;

    fn config(document: Value) -> Config {
        Config::parse(&document).expect("valid document")
    }

    #[test]
    fn no_dimensions_yield_one_product() {
        let config = config(yaml!("a: 1\nb: [x]"));
        let tuples = config.generate();
        assert_eq!(tuples, [Tuple::default()]);
        assert_eq!(config.render(&tuples[0]).unwrap(), yaml!("a: 1\nb: [x]"));
    }

    #[test]
    fn empty_containers_render_empty() {
        let config = config(yaml! {r#"
            env/[[]]: { dev: [d1], prod: [p1] }
            only_prod:
              x[[prod]]: 1
            list: []
        "#});

        let dev = &config.generate()[0];
        assert_eq!(config.render(dev).unwrap(), yaml!("only_prod: {}\nlist: []"));
    }

    #[test]
    fn anonymous_entries_select_scalar() {
        let config = config(yaml! {r#"
            env/[[]]: { dev: [d1], prod: [p1] }
            url:
              "-[[prod]]": https://example.com
              "-[[dev]]": http://localhost
        "#});

        let rendered: Vec<Value> = config
            .generate()
            .iter()
            .map(|tuple| config.render(tuple).unwrap())
            .collect();
        assert_eq!(
            rendered,
            [yaml!("url: http://localhost"), yaml!("url: https://example.com")]
        );
    }

    #[test]
    fn key_into_scalar() {
        let config = config(yaml! {r#"
            env/[[]]: { dev: [d1] }
            url:
              "-": a
              b: c
        "#});

        let tuple = &config.generate()[0];
        assert!(matches!(config.render(tuple), Err(Error::KeyIntoScalar { .. })));
    }

    #[test]
    fn later_duplicate_key_wins_in_place() {
        let config = config(yaml! {r#"
            env/[[]]: { dev: [d1] }
            a: default
            b: 2
            a[[dev]]: override
        "#});

        let tuple = &config.generate()[0];
        assert_eq!(config.render(tuple).unwrap(), yaml!("a: override\nb: 2"));
    }

    #[test]
    fn dependency_generated_first() {
        // `region` has the longer brackets but depends on `env`
        let config = config(yaml! {r#"
            env/[]: { dev: [d1], prod: [p1] }
            region/{{}}:
              "-[prod]": { eu: [fra] }
              us: [nyc]
        "#});

        let names: Vec<_> = config.dimensions().iter().map(Dimension::name).collect();
        assert_eq!(names, ["region", "env"]);

        let order: Vec<_> = config.generation_order().into_iter().map(Dimension::name).collect();
        assert_eq!(order, ["env", "region"]);

        let tuples: Vec<String> = config.generate().iter().map(Tuple::to_string).collect();
        assert_eq!(
            tuples,
            [
                "env=dev.d1,region=us.nyc",
                "env=prod.p1,region=eu.fra",
                "env=prod.p1,region=us.nyc",
            ]
        );
    }

    #[test]
    fn all_keys_containment_option() {
        let document = yaml!("env/[[]]: { dev: [d1] }\na: 1");
        let config = Config::parse_with(
            &document,
            Options {
                containment: Containment::AllKeys,
            },
        )
        .unwrap();

        assert_eq!(config.options().containment, Containment::AllKeys);
        assert_eq!(config.generate().len(), 1);
    }

    #[test]
    fn filter_by_register() {
        let mut config = config(yaml! {r#"
            env/[[]]:
              dev: [d1, d2]
              ":zone": [a, b]
        "#});

        config.filter(["env=:b"]).unwrap();
        let tuples = config.generate();
        assert_eq!(tuples.len(), 2);
        assert!(tuples
            .iter()
            .all(|t| t.selection("env", Register(1)).map(|s| s.value.as_str()) == Some("b")));
    }
}
