//! # Schema Synthesizer
//!
//! Recursively turns a [`Descriptor`] tree into JSON Schema nodes suitable for
//! `components/schemas` of an OpenAPI 3.1 document.

use crate::coercion::{coerce_default, SchemaType};
use crate::descriptor::{Descriptor, Shape};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// The `type` keyword: a single type or a `[null, T]` pair for nullable nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TypeSet {
    /// A non-nullable type.
    Single(SchemaType),
    /// `null` alongside the working type.
    Nullable([SchemaType; 2]),
}

impl TypeSet {
    /// Builds the type keyword for `working`, adding `null` when `allow_null` is set.
    pub fn new(working: SchemaType, allow_null: bool) -> Self {
        if allow_null {
            TypeSet::Nullable([SchemaType::Null, working])
        } else {
            TypeSet::Single(working)
        }
    }

    /// The non-null member of the set.
    pub fn working(&self) -> SchemaType {
        match self {
            TypeSet::Single(t) | TypeSet::Nullable([_, t]) => *t,
        }
    }
}

/// A synthesized schema node.
///
/// At most one of `properties`, `items` and `one_of` is populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaNode {
    /// Type keyword; absent on unions.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<TypeSet>,
    /// Description, omitted when empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default value, coerced or raw. `Some(Value::Null)` is emitted as `null`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Names of required properties.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Object properties.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaNode>,
    /// List item schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    /// Union alternatives.
    #[serde(rename = "oneOf", skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaNode>,
}

/// Maps a producer type tag to a schema primitive.
///
/// An empty tag marks an untyped node and maps to `object`; an unknown non-empty
/// tag is some string-like parameter type and maps to `string`.
pub fn resolve_type(tag: &str) -> SchemaType {
    match tag {
        "" | "object" => SchemaType::Object,
        "array" => SchemaType::Array,
        "int" | "integer" => SchemaType::Integer,
        "bool" | "boolean" => SchemaType::Boolean,
        "float" | "number" => SchemaType::Number,
        "string" | "raw" | "alphanum" | "alphanumext" | "notags" => SchemaType::String,
        _ => SchemaType::String,
    }
}

/// Synthesizes the schema for `node`.
///
/// With `fix_defaults` the default is coerced into the node's working type;
/// otherwise it is copied verbatim.
pub fn synthesize(node: &Descriptor, fix_defaults: bool) -> SchemaNode {
    let mut schema = SchemaNode {
        description: non_empty(&node.description),
        ..SchemaNode::default()
    };

    let working = match &node.shape {
        Shape::Union(alternatives) => {
            schema.one_of = alternatives
                .iter()
                .map(|alt| synthesize(alt, fix_defaults))
                .collect();
            return schema;
        }
        Shape::List(item) => {
            schema.items = Some(Box::new(synthesize(item, fix_defaults)));
            SchemaType::Array
        }
        Shape::Object(keys) => {
            for (name, child) in keys {
                if child.required {
                    schema.required.push(name.clone());
                }
                schema
                    .properties
                    .insert(name.clone(), synthesize(child, fix_defaults));
            }
            SchemaType::Object
        }
        Shape::Leaf(tag) => resolve_type(tag),
    };

    schema.type_ = Some(TypeSet::new(working, node.allow_null));

    // Coercion targets the working type, never the nullable pair.
    schema.default = Some(if fix_defaults {
        coerce_default(node.default.as_ref(), working, node.allow_null)
    } else {
        node.default.clone().unwrap_or(Value::Null)
    });

    schema
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}
