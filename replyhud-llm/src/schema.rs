//! Response-shape contract.
//!
//! Prompts carry a standard JSON Schema. Gemini only understands an OpenAPI
//! subset of it, so the schema sent upstream is translated, while the
//! response is still checked against the original with `jsonschema`.

use jsonschema::JSONSchema;
use serde_json::{Map, Value};

use crate::{LlmError, LlmResult};

/// Keywords Gemini's `responseSchema` accepts
const GEMINI_SCHEMA_KEYS: &[&str] = &[
    "type",
    "format",
    "description",
    "nullable",
    "enum",
    "properties",
    "required",
    "items",
    "minItems",
    "maxItems",
];

/// Translate a JSON Schema into Gemini's schema dialect.
///
/// Type names are upper-cased (`"string"` becomes `"STRING"`) and any keyword
/// outside the supported subset is dropped, recursively.
pub fn to_gemini_schema(schema: &Value) -> Value {
    let Value::Object(object) = schema else {
        return schema.clone();
    };

    let mut converted = Map::new();
    for (key, value) in object {
        if !GEMINI_SCHEMA_KEYS.contains(&key.as_str()) {
            continue;
        }
        let value = match key.as_str() {
            "type" => match value {
                Value::String(name) => Value::String(name.to_uppercase()),
                other => other.clone(),
            },
            "properties" => match value {
                Value::Object(properties) => Value::Object(
                    properties
                        .iter()
                        .map(|(name, property)| (name.clone(), to_gemini_schema(property)))
                        .collect(),
                ),
                other => other.clone(),
            },
            "items" => to_gemini_schema(value),
            _ => value.clone(),
        };
        converted.insert(key.clone(), value);
    }
    Value::Object(converted)
}

/// Check `value` against `schema`, collecting every violation into one error
pub fn validate_response(schema: &Value, value: &Value) -> LlmResult<()> {
    let compiled = JSONSchema::compile(schema)
        .map_err(|e| LlmError::Schema(format!("Invalid JSON schema: {e}")))?;

    if let Err(errors) = compiled.validate(value) {
        let details: Vec<String> = errors
            .map(|error| format!("{} (at '{}')", error, error.instance_path))
            .collect();
        return Err(LlmError::Schema(details.join("; ")));
    }
    Ok(())
}
