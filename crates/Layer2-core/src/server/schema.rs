//! Argument validation against a tool's input schema
//!
//! Covers the subset of JSON Schema the tools actually declare:
//! `type`, `required`, `properties.*.type`, `items.type` and
//! `additionalProperties`.

use serde_json::{Map, Value};

/// Check `arguments` against `schema`
pub fn validate(schema: &Value, arguments: &Value) -> Result<(), String> {
    if let Some(expected) = schema.get("type").and_then(Value::as_str) {
        if !type_matches(expected, arguments) {
            return Err(format!(
                "arguments must be of type {}, got {}",
                expected,
                type_name(arguments)
            ));
        }
    }

    let Some(args) = arguments.as_object() else {
        return Ok(());
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for key in required.iter().filter_map(Value::as_str) {
            if !args.contains_key(key) {
                return Err(format!("missing required argument '{}'", key));
            }
        }
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };

    check_unexpected(schema, properties, args)?;

    for (key, value) in args {
        if let Some(property) = properties.get(key) {
            check_property(key, property, value)?;
        }
    }

    Ok(())
}

fn check_unexpected(
    schema: &Value,
    properties: &Map<String, Value>,
    args: &Map<String, Value>,
) -> Result<(), String> {
    if schema.get("additionalProperties").and_then(Value::as_bool) == Some(true) {
        return Ok(());
    }

    match args.keys().find(|key| !properties.contains_key(*key)) {
        Some(key) => Err(format!("unexpected argument '{}'", key)),
        None => Ok(()),
    }
}

fn check_property(key: &str, property: &Value, value: &Value) -> Result<(), String> {
    let Some(expected) = property.get("type").and_then(Value::as_str) else {
        return Ok(());
    };

    if !type_matches(expected, value) {
        return Err(format!(
            "argument '{}' must be of type {}, got {}",
            key,
            expected,
            type_name(value)
        ));
    }

    if let (Some(items), Some(elements)) = (
        property
            .get("items")
            .and_then(|i| i.get("type"))
            .and_then(Value::as_str),
        value.as_array(),
    ) {
        if let Some((index, bad)) = elements
            .iter()
            .enumerate()
            .find(|(_, element)| !type_matches(items, element))
        {
            return Err(format!(
                "argument '{}[{}]' must be of type {}, got {}",
                key,
                index,
                items,
                type_name(bad)
            ));
        }
    }

    Ok(())
}

fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
