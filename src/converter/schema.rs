//!
//! Parameter-schema type converter.
//!
//! Provider schemas spell JSON-schema type names in upper case (`STRING`,
//! `OBJECT`, ...). The canonical dialect uses lowercase names; this module
//! rewrites every `type` recursively through `properties` and `items`.
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

/* --- uses ------------------------------------------------------------------------------------ */

use serde_json::{Map, Value};

/* --- start of code -------------------------------------------------------------------------- */

///
/// Convert a provider parameter schema into the canonical lowercase dialect.
///
/// Non-object nodes are returned unchanged. Keys other than `type`,
/// `properties` and `items` are copied verbatim. The conversion is
/// idempotent: converting an already canonical schema is a no-op.
///
/// # Arguments
///  * `node` - schema fragment to convert
///
/// # Returns
///  * converted schema fragment
pub fn convert_schema(node: &Value) -> Value {
    let Value::Object(map) = node else {
        return node.clone();
    };

    let mut out = Map::with_capacity(map.len());
    for (key, value) in map {
        let converted = match (key.as_str(), value) {
            ("type", Value::String(type_name)) => Value::String(canonical_type(type_name)),
            ("properties", Value::Object(properties)) => Value::Object(
                properties.iter().map(|(name, schema)| (name.clone(), convert_schema(schema))).collect(),
            ),
            ("items", items) => convert_schema(items),
            _ => value.clone(),
        };
        out.insert(key.clone(), converted);
    }
    Value::Object(out)
}

///
/// Map a provider type name onto its canonical lowercase form.
///
/// Unknown names pass through lower-cased.
pub fn canonical_type(type_name: &str) -> String {
    match type_name.to_ascii_uppercase().as_str() {
        "BOOLEAN" => "boolean",
        "STRING" => "string",
        "OBJECT" => "object",
        "ARRAY" => "array",
        "INTEGER" => "integer",
        "NUMBER" => "number",
        _ => return type_name.to_lowercase(),
    }
    .to_string()
}

/* --- tests ----------------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_schema_is_lowercased() {
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "query": {"type": "STRING", "description": "Search TYPE"},
                "filters": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {"limit": {"type": "INTEGER"}, "exact": {"type": "Boolean"}}
                    }
                }
            },
            "required": ["query"]
        });

        let converted = convert_schema(&schema);
        assert_eq!(
            converted,
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "Search TYPE"},
                    "filters": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {"limit": {"type": "integer"}, "exact": {"type": "boolean"}}
                        }
                    }
                },
                "required": ["query"]
            })
        );
    }

    #[test]
    fn test_conversion_is_idempotent() {
        let once = convert_schema(&json!({"type": "STRING"}));
        assert_eq!(once, json!({"type": "string"}));
        assert_eq!(convert_schema(&once), once);
    }

    #[test]
    fn test_unknown_type_is_lowercased_and_scalars_pass_through() {
        assert_eq!(convert_schema(&json!({"type": "NULL"})), json!({"type": "null"}));
        assert_eq!(convert_schema(&json!("STRING")), json!("STRING"));
        assert_eq!(convert_schema(&json!({"type": ["STRING"]})), json!({"type": ["STRING"]}));
    }
}
