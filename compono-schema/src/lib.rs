//! # compono-schema: typed objects from entity schemas
//!
//! A schema document maps type names to entity descriptions:
//!
//! ```json
//! {"Product": {"type": "entity", "key": "id", "properties": {
//!     "id": {"type": "int", "nullable": "false"},
//!     "categories": {"type": "collection", "itemType": "Category"},
//!     "supplier": {"type": "Supplier"}}}}
//! ```
//!
//! [`Schema::parse`] turns that into [`EntityType`]s. [`EntityObject`] is an
//! instance of one type whose setters check the declared property type and
//! nullability. [`Schema::relations`] reports, per reference property,
//! whether it points at a single object or a collection.

#![deny(missing_docs)]

mod error;
mod object;
mod schema;

pub use error::SchemaError;
pub use object::EntityObject;
pub use schema::{EntityType, PropertyDef, PropertyType, Relation, Schema};
