//! Document parser
//!
//! Splits the root mapping into dimension declarations (`name/brackets` keys) and properties, building
//! the [Dimension]s first and then the property [Tree] with annotations stripped from its keys.
use crate::dimension::{merge_conditions, Brackets, Condition, Dimension, Item, Register};
use crate::error::{Error, Result};
use crate::expression;
use crate::key_expression::parse_key;
use crate::tree::{ArrayEntry, Child, MapEntry, Node, NodeId, Tree, TreeBuilder};
use crate::value::Value;
use indexmap::IndexMap;

#[derive(Debug)]
pub struct Document {
    /// Sorted by descending bracket length, stable with respect to declaration order
    pub dimensions: Vec<Dimension>,
    /// Dimension names in declaration order
    pub declared: Vec<String>,
    pub tree: Tree,
}

impl Document {
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn parse(document: &Value) -> Result<Self> {
        let Value::Object(root) = document else {
            return Err(Error::RootNotMapping);
        };

        let (dimensions, declared) = parse_dimensions(root)?;
        let tree = parse_properties(root, &dimensions)?;

        tracing::debug!(dimensions = dimensions.len(), nodes = tree.len(), "document parsed");
        Ok(Self {
            dimensions,
            declared,
            tree,
        })
    }
}

/// `name/brackets` split, for any key containing a `/`
fn declaration(key: &str) -> Option<(&str, &str)> {
    key.split_once('/')
}

/// Empty keys and `-` carry no name
fn is_anonymous(key: &str) -> bool {
    key.is_empty() || key == "-"
}

fn parse_dimensions(root: &IndexMap<String, Value>) -> Result<(Vec<Dimension>, Vec<String>)> {
    let mut dimensions: Vec<Dimension> = vec![];
    let mut declared = vec![];

    for (key, initializers) in root {
        let Some((name, marker)) = declaration(key) else {
            continue;
        };

        if name.is_empty() {
            return Err(Error::MalformedDeclaration { key: key.clone() });
        }

        let brackets = Brackets::parse(name, marker)?;

        if dimensions.iter().any(|dimension| dimension.name() == name) {
            return Err(Error::DuplicateDimension {
                name: name.to_string(),
            });
        }

        if let Some(existing) = dimensions
            .iter()
            .find(|dimension| dimension.brackets() == &brackets)
        {
            return Err(Error::AmbiguousBrackets {
                name: name.to_string(),
                brackets: marker.to_string(),
                existing: existing.name().to_string(),
            });
        }

        let Value::Object(initializers) = initializers else {
            return Err(Error::InvalidInitializer {
                dimension: name.to_string(),
                key: key.clone(),
            });
        };

        // conditions may only refer to dimensions declared before this one
        let items = parse_initializers(name, initializers, &dimensions)?
            .into_iter()
            .map(|pending| pending.into_item(name))
            .collect::<Result<Vec<_>>>()?;

        let dimension = Dimension::new(name, brackets, items);
        tracing::debug!(
            name,
            brackets = %dimension.brackets().marker(),
            items = dimension.items().len(),
            depends = ?dimension.depends(),
            "dimension declared"
        );

        dimensions.push(dimension);
        dimensions.sort_by(|a, b| b.brackets().len().cmp(&a.brackets().len()));
        declared.push(name.to_string());
    }

    Ok((dimensions, declared))
}

/// Item whose domain may still be assigned by an enclosing key
#[derive(Debug)]
struct PendingItem {
    slot: Option<(Register, String)>,
    values: Vec<String>,
    conditions: Vec<Condition>,
    /// key that declared the values
    origin: String,
}

impl PendingItem {
    fn into_item(self, dimension: &str) -> Result<Item> {
        let Some((register, domain)) = self.slot else {
            return Err(Error::MissingDomain {
                dimension: dimension.to_string(),
                key: self.origin,
            });
        };

        Ok(Item::new(register, domain, self.values, self.conditions))
    }
}

fn parse_initializers(
    dimension: &str,
    initializers: &IndexMap<String, Value>,
    known: &[Dimension],
) -> Result<Vec<PendingItem>> {
    let mut items = vec![];

    for (key, value) in initializers {
        let (domain_expression, key_conditions) = parse_key(key, known)?;
        let invalid = || Error::InvalidInitializer {
            dimension: dimension.to_string(),
            key: key.clone(),
        };

        let mut level = match value {
            Value::Object(nested) => {
                let mut nested = parse_initializers(dimension, nested, known)?;
                for item in &mut nested {
                    let mut conditions = key_conditions.clone();
                    merge_conditions(&mut conditions, std::mem::take(&mut item.conditions));
                    item.conditions = conditions;
                }
                nested
            }
            Value::Array(values) => vec![PendingItem {
                slot: None,
                values: values
                    .iter()
                    .map(|value| value.scalar_string().ok_or_else(invalid))
                    .collect::<Result<_>>()?,
                conditions: key_conditions,
                origin: key.clone(),
            }],
            _ => return Err(invalid()),
        };

        let domain_expression = domain_expression.trim();
        if !is_anonymous(domain_expression) {
            let slot = expression::parse_domain(domain_expression).map_err(|e| e.in_key(key))?;
            for item in &mut level {
                if item.slot.is_some() {
                    return Err(Error::DomainRedeclared {
                        dimension: dimension.to_string(),
                        key: key.clone(),
                    });
                }
                item.slot = Some(slot.clone());
            }
        }

        items.extend(level);
    }

    Ok(items)
}

fn parse_properties(root: &IndexMap<String, Value>, dimensions: &[Dimension]) -> Result<Tree> {
    let mut builder = TreeBuilder::default();
    let properties = root.iter().filter(|(key, _)| declaration(key).is_none());
    let root = build_map(&mut builder, properties, dimensions)?;
    Ok(builder.finish(root))
}

fn build_map<'v>(
    builder: &mut TreeBuilder,
    properties: impl Iterator<Item = (&'v String, &'v Value)>,
    dimensions: &[Dimension],
) -> Result<NodeId> {
    let mut entries = vec![];

    for (key, value) in properties {
        let (name, conditions) = parse_key(key, dimensions)?;
        let name = name.trim();
        let child = build(builder, value, dimensions)?;
        entries.push(MapEntry::new(
            (!is_anonymous(name)).then(|| name.to_string()),
            child,
            conditions,
        ));
    }

    Ok(builder.insert(Node::Map(entries)))
}

fn build(builder: &mut TreeBuilder, value: &Value, dimensions: &[Dimension]) -> Result<Child> {
    match value {
        Value::Object(object) => Ok(Child::Node(build_map(builder, object.iter(), dimensions)?)),
        Value::Array(array) => {
            let entries = array
                .iter()
                .map(|element| Ok(ArrayEntry::new(build(builder, element, dimensions)?, vec![])))
                .collect::<Result<Vec<_>>>()?;
            Ok(Child::Node(builder.insert(Node::Array(entries))))
        }
        scalar => Ok(Child::Scalar(scalar.clone())),
    }
}
