//! Schema documents and entity types.

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// The declared type of a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    /// An integer.
    Int,
    /// A string.
    String,
    /// Any number.
    Double,
    /// A boolean.
    Bool,
    /// A list of objects of `item_type`.
    Collection {
        /// Element entity type.
        item_type: String,
    },
    /// A single object of the named entity type.
    Reference(String),
}

impl PropertyType {
    fn parse(entity: &str, property: &str, spec: &Map<String, Value>) -> Result<Self, SchemaError> {
        let kind = spec.get("type").and_then(Value::as_str).ok_or_else(|| {
            SchemaError::Parse(format!("{entity}.{property} has no type"))
        })?;
        Ok(match kind {
            "int" | "integer" => Self::Int,
            "string" => Self::String,
            "double" | "float" | "number" => Self::Double,
            "bool" | "boolean" => Self::Bool,
            "collection" => {
                let item_type = spec.get("itemType").and_then(Value::as_str).ok_or_else(|| {
                    SchemaError::Parse(format!("{entity}.{property} is a collection without itemType"))
                })?;
                Self::Collection {
                    item_type: item_type.to_owned(),
                }
            }
            other => Self::Reference(other.to_owned()),
        })
    }

    /// Whether a non-null value fits this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Int => value.is_i64() || value.is_u64(),
            Self::String => value.is_string(),
            Self::Double => value.is_number(),
            Self::Bool => value.is_boolean(),
            Self::Collection { .. } => value.is_array(),
            Self::Reference(_) => value.is_object(),
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => f.write_str("int"),
            Self::String => f.write_str("string"),
            Self::Double => f.write_str("double"),
            Self::Bool => f.write_str("bool"),
            Self::Collection { item_type } => write!(f, "collection<{item_type}>"),
            Self::Reference(name) => f.write_str(name),
        }
    }
}

/// One declared property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDef {
    /// Property name.
    pub name: String,
    /// Declared type.
    pub kind: PropertyType,
    /// Whether null is allowed. Defaults to true.
    pub nullable: bool,
}

/// An entity type: a key and an ordered property list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityType {
    /// Type name.
    pub name: String,
    /// Name of the key property.
    pub key: String,
    /// Properties in document order.
    pub properties: Vec<PropertyDef>,
}

impl EntityType {
    /// Look up a property.
    pub fn property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| p.name == name)
    }

    fn parse(name: &str, spec: &Value) -> Result<Self, SchemaError> {
        let Value::Object(spec) = spec else {
            return Err(SchemaError::Parse(format!("{name} must be an object")));
        };
        match spec.get("type").and_then(Value::as_str) {
            Some("entity") => {}
            other => {
                return Err(SchemaError::Parse(format!(
                    "{name} has type {}, expected entity",
                    other.unwrap_or("null")
                )));
            }
        }
        let key = spec
            .get("key")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::Parse(format!("{name} has no key")))?
            .to_owned();

        let mut properties = Vec::new();
        if let Some(props) = spec.get("properties") {
            let Value::Object(props) = props else {
                return Err(SchemaError::Parse(format!("properties of {name} must be an object")));
            };
            for (prop, prop_spec) in props {
                let Value::Object(prop_spec) = prop_spec else {
                    return Err(SchemaError::Parse(format!("{name}.{prop} must be an object")));
                };
                properties.push(PropertyDef {
                    name: prop.clone(),
                    kind: PropertyType::parse(name, prop, prop_spec)?,
                    nullable: parse_nullable(prop_spec.get("nullable")),
                });
            }
        }

        if !properties.iter().any(|p| p.name == key) {
            return Err(SchemaError::MissingKey {
                entity: name.to_owned(),
                key,
            });
        }
        Ok(Self {
            name: name.to_owned(),
            key,
            properties,
        })
    }
}

// Documents write nullability as a bool or as the strings "true"/"false".
fn parse_nullable(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.eq_ignore_ascii_case("false"),
        _ => true,
    }
}

/// How a reference property relates its owner to other objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "target")]
pub enum Relation {
    /// Points at one object of the target type.
    Single(String),
    /// Points at many objects of the target type.
    Collection(String),
}

/// A set of entity types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    types: BTreeMap<String, Arc<EntityType>>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a schema document.
    pub fn parse(document: &str) -> Result<Self, SchemaError> {
        let value: Value =
            serde_json::from_str(document).map_err(|e| SchemaError::Parse(e.to_string()))?;
        let Value::Object(entries) = value else {
            return Err(SchemaError::Parse("schema must be a JSON object".into()));
        };
        let mut types = BTreeMap::new();
        for (name, spec) in &entries {
            types.insert(name.clone(), Arc::new(EntityType::parse(name, spec)?));
        }
        Ok(Self { types })
    }

    /// Add every type of `other`, replacing same-named types.
    pub fn merge(&mut self, other: Schema) {
        self.types.extend(other.types);
    }

    /// Look up an entity type.
    pub fn entity(&self, name: &str) -> Option<Arc<EntityType>> {
        self.types.get(name).cloned()
    }

    /// Type names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Number of entity types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the schema holds no types.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Relation map: entity type → reference property → relation.
    ///
    /// Types without reference properties are omitted.
    pub fn relations(&self) -> BTreeMap<String, BTreeMap<String, Relation>> {
        let mut out = BTreeMap::new();
        for (name, entity) in &self.types {
            let rels: BTreeMap<_, _> = entity
                .properties
                .iter()
                .filter_map(|p| match &p.kind {
                    PropertyType::Reference(target) => {
                        Some((p.name.clone(), Relation::Single(target.clone())))
                    }
                    PropertyType::Collection { item_type } => {
                        Some((p.name.clone(), Relation::Collection(item_type.clone())))
                    }
                    _ => None,
                })
                .collect();
            if !rels.is_empty() {
                out.insert(name.clone(), rels);
            }
        }
        out
    }
}
