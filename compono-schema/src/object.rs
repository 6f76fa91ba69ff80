//! Typed objects.

use crate::error::SchemaError;
use crate::schema::EntityType;
use serde_json::{Map, Value};
use std::sync::Arc;

/// An instance of an [`EntityType`].
///
/// Every declared property starts out null. Setters reject values of the
/// wrong type and nulls on non-nullable properties; [`validate`] checks that
/// every non-nullable property has since been set.
///
/// [`validate`]: EntityObject::validate
#[derive(Debug, Clone, PartialEq)]
pub struct EntityObject {
    entity: Arc<EntityType>,
    fields: Map<String, Value>,
}

impl EntityObject {
    /// A new object with every property null.
    pub fn new(entity: Arc<EntityType>) -> Self {
        let fields = entity
            .properties
            .iter()
            .map(|p| (p.name.clone(), Value::Null))
            .collect();
        Self { entity, fields }
    }

    /// Build an object from a JSON object, setting each field in turn.
    pub fn from_value(entity: Arc<EntityType>, value: Value) -> Result<Self, SchemaError> {
        let Value::Object(values) = value else {
            return Err(SchemaError::Parse(format!(
                "{} objects are built from JSON objects",
                entity.name
            )));
        };
        let mut object = Self::new(entity);
        for (property, value) in values {
            object.set(&property, value)?;
        }
        Ok(object)
    }

    /// The entity type.
    pub fn entity_type(&self) -> &EntityType {
        &self.entity
    }

    /// Read a property.
    pub fn get(&self, property: &str) -> Result<&Value, SchemaError> {
        self.fields
            .get(property)
            .ok_or_else(|| self.unknown(property))
    }

    /// Write a property, checking type and nullability.
    pub fn set(&mut self, property: &str, value: Value) -> Result<(), SchemaError> {
        let def = self
            .entity
            .property(property)
            .ok_or_else(|| self.unknown(property))?;
        if value.is_null() {
            if !def.nullable {
                return Err(SchemaError::NullViolation {
                    entity: self.entity.name.clone(),
                    property: property.to_owned(),
                });
            }
        } else if !def.kind.accepts(&value) {
            return Err(SchemaError::TypeMismatch {
                entity: self.entity.name.clone(),
                property: property.to_owned(),
                expected: def.kind.to_string(),
                actual: value.to_string(),
            });
        }
        self.fields.insert(property.to_owned(), value);
        Ok(())
    }

    /// The key property's value.
    pub fn key(&self) -> &Value {
        self.fields.get(&self.entity.key).unwrap_or(&Value::Null)
    }

    /// Check that no non-nullable property is null.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for def in &self.entity.properties {
            let missing = self.fields.get(&def.name).is_none_or(Value::is_null);
            if !def.nullable && missing {
                return Err(SchemaError::NullViolation {
                    entity: self.entity.name.clone(),
                    property: def.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// The fields as a JSON object.
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    fn unknown(&self, property: &str) -> SchemaError {
        SchemaError::UnknownProperty {
            entity: self.entity.name.clone(),
            property: property.to_owned(),
        }
    }
}
