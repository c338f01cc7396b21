//! # Descriptor Model
//!
//! Typed representation of a parameter or return description node as emitted by the
//! webservice extractor. The raw document discriminates the node shape only by which
//! optional field is populated (`content`, `keys`, `oneOf`); decoding folds that into
//! the closed [`Shape`] enum so the synthesizer can match exhaustively.
//!
//! Two tolerant encodings are accepted:
//! - `keys` given as an array instead of an object becomes `key0`, `key1`, ... in order.
//! - flags given either as native booleans or as the strings `"true"` / `"false"`.

use indexmap::IndexMap;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// A boolean that may be encoded as a JSON boolean or as `"true"` / `"false"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flag(pub bool);

impl From<Flag> for bool {
    fn from(flag: Flag) -> Self {
        flag.0
    }
}

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FlagVisitor;

        impl Visitor<'_> for FlagVisitor {
            type Value = Flag;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a boolean or the string \"true\" / \"false\"")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Flag, E> {
                Ok(Flag(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Flag, E> {
                match v {
                    "true" => Ok(Flag(true)),
                    "false" => Ok(Flag(false)),
                    other => Err(E::custom(format!(
                        "invalid string value for flag: {other:?}"
                    ))),
                }
            }
        }

        deserializer.deserialize_any(FlagVisitor)
    }
}

/// The producer's constant for a mandatory value.
const VALUE_REQUIRED: i64 = 1;

/// The `required` field: an integer constant (only `1` is mandatory), a boolean,
/// or `"true"` / `"false"`. `null` means optional.
fn deserialize_required<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    struct RequiredVisitor;

    impl Visitor<'_> for RequiredVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer, a boolean or the string \"true\" / \"false\"")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            Ok(v == VALUE_REQUIRED)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            Ok(v == VALUE_REQUIRED as u64)
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
            match v {
                "true" => Ok(true),
                "false" => Ok(false),
                other => Err(E::custom(format!(
                    "invalid string value for required: {other:?}"
                ))),
            }
        }

        fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }

        fn visit_none<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }
    }

    deserializer.deserialize_any(RequiredVisitor)
}

/// Object children keyed by field name, in encounter order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Keys(pub IndexMap<String, Descriptor>);

impl<'de> Deserialize<'de> for Keys {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeysVisitor;

        impl<'de> Visitor<'de> for KeysVisitor {
            type Value = Keys;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object or an array of descriptors")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Keys, A::Error> {
                let mut keys = IndexMap::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, child)) = map.next_entry::<String, Descriptor>()? {
                    keys.insert(name, child);
                }
                Ok(Keys(keys))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Keys, A::Error> {
                let mut keys = IndexMap::with_capacity(seq.size_hint().unwrap_or(0));
                let mut index = 0usize;
                while let Some(child) = seq.next_element::<Descriptor>()? {
                    keys.insert(format!("key{index}"), child);
                    index += 1;
                }
                Ok(Keys(keys))
            }
        }

        deserializer.deserialize_any(KeysVisitor)
    }
}

/// The structural shape of a descriptor node.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A primitive value carrying the producer's type tag (may be empty).
    Leaf(String),
    /// An ordered list of a single item type.
    List(Box<Descriptor>),
    /// A keyed object; each child carries its own `required` flag.
    Object(IndexMap<String, Descriptor>),
    /// Alternative shapes, exactly one of which applies.
    Union(Vec<Descriptor>),
}

/// One node of a parameter or return description.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawDescriptor")]
pub struct Descriptor {
    /// Human readable description, possibly empty.
    pub description: String,
    /// Raw default value. `None` when absent; `Some(Value::Null)` when explicitly null.
    pub default: Option<Value>,
    /// Whether the parent object must contain this field.
    pub required: bool,
    /// Whether `null` is an accepted value.
    pub allow_null: bool,
    /// Structural shape of the node.
    pub shape: Shape,
}

impl Default for Descriptor {
    fn default() -> Self {
        Self::leaf("")
    }
}

impl Descriptor {
    /// Creates a leaf node with the given type tag and an empty envelope.
    pub fn leaf(type_tag: impl Into<String>) -> Self {
        Self::with_shape(Shape::Leaf(type_tag.into()))
    }

    /// Creates a list node wrapping `item`.
    pub fn list(item: Descriptor) -> Self {
        Self::with_shape(Shape::List(Box::new(item)))
    }

    /// Creates an object node from `(name, child)` pairs.
    pub fn object<I, K>(children: I) -> Self
    where
        I: IntoIterator<Item = (K, Descriptor)>,
        K: Into<String>,
    {
        Self::with_shape(Shape::Object(
            children.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Creates a union node over `alternatives`.
    pub fn union(alternatives: Vec<Descriptor>) -> Self {
        Self::with_shape(Shape::Union(alternatives))
    }

    fn with_shape(shape: Shape) -> Self {
        Self {
            description: String::new(),
            default: None,
            required: false,
            allow_null: false,
            shape,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the raw default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Marks the node as required by its parent.
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Marks the node as nullable.
    pub fn with_allow_null(mut self, allow_null: bool) -> Self {
        self.allow_null = allow_null;
        self
    }

    /// Returns the object children when the node is an object.
    pub fn keys(&self) -> Option<&IndexMap<String, Descriptor>> {
        match &self.shape {
            Shape::Object(keys) => Some(keys),
            _ => None,
        }
    }

    /// Mutable variant of [`Descriptor::keys`].
    pub fn keys_mut(&mut self) -> Option<&mut IndexMap<String, Descriptor>> {
        match &mut self.shape {
            Shape::Object(keys) => Some(keys),
            _ => None,
        }
    }

    /// Returns the item descriptor when the node is a list.
    pub fn item_mut(&mut self) -> Option<&mut Descriptor> {
        match &mut self.shape {
            Shape::List(item) => Some(item),
            _ => None,
        }
    }
}

/// Wire form of a descriptor node before the shape is resolved.
#[derive(Deserialize)]
struct RawDescriptor {
    #[serde(rename = "oneOf", default)]
    one_of: Option<Vec<Descriptor>>,
    #[serde(default)]
    content: Option<Box<Descriptor>>,
    #[serde(default)]
    keys: Option<Keys>,
    #[serde(rename = "type", default)]
    type_tag: Option<String>,
    #[serde(default, deserialize_with = "deserialize_explicit")]
    default: Option<Value>,
    #[serde(rename = "desc", default)]
    description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_required")]
    required: bool,
    #[serde(rename = "allownull", default)]
    allow_null: Option<Flag>,
}

/// Keeps an explicit `null` as `Some(Value::Null)`; only a missing field is `None`.
fn deserialize_explicit<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl TryFrom<RawDescriptor> for Descriptor {
    type Error = String;

    fn try_from(raw: RawDescriptor) -> Result<Self, Self::Error> {
        let populated = [raw.one_of.is_some(), raw.content.is_some(), raw.keys.is_some()]
            .into_iter()
            .filter(|set| *set)
            .count();
        if populated > 1 {
            return Err(
                "descriptor sets more than one of 'oneOf', 'content' and 'keys'".to_string(),
            );
        }

        let shape = if let Some(alternatives) = raw.one_of {
            Shape::Union(alternatives)
        } else if let Some(item) = raw.content {
            Shape::List(item)
        } else if let Some(keys) = raw.keys {
            Shape::Object(keys.0)
        } else {
            Shape::Leaf(raw.type_tag.unwrap_or_default())
        };

        Ok(Self {
            description: raw.description.unwrap_or_default(),
            default: raw.default,
            required: raw.required,
            allow_null: raw.allow_null.map(bool::from).unwrap_or(false),
            shape,
        })
    }
}
