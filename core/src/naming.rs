//! # Naming Utilities
//!
//! Helpers for deriving component schema names from method identifiers.

/// Converts a snake_case identifier to PascalCase.
///
/// Only the first letter of each `_`-delimited segment is upper-cased; the rest of
/// the segment is kept as is. Empty segments vanish.
pub fn snake_to_pascal(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for segment in s.split('_') {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            result.push_str(chars.as_str());
        }
    }
    result
}

/// Name of the component schema holding a method's parameters.
pub fn parameters_schema_name(method: &str) -> String {
    format!("{}Parameters", snake_to_pascal(method))
}

/// Name of the component schema holding a method's response.
pub fn response_schema_name(method: &str) -> String {
    format!("{}Response", snake_to_pascal(method))
}

/// JSON pointer to a component schema.
pub fn schema_ref(name: &str) -> String {
    format!("#/components/schemas/{}", name)
}
