use serde_json::{Map, Value as JsonValue};

use vizij_reveal_core::RevealDescriptor;

/// Overlay a partial descriptor object from JS onto `base`.
///
/// Hosts usually pass only the fields they change (`{ family: "left" }`), so
/// missing fields fall back to the page config rather than the crate
/// defaults. `null`/non-object input yields `base` unchanged.
pub fn merge_descriptor(
    base: &RevealDescriptor,
    overrides: JsonValue,
) -> Result<RevealDescriptor, serde_json::Error> {
    let JsonValue::Object(overrides) = normalize_descriptor_json(overrides) else {
        return Ok(base.clone());
    };
    let mut merged = match serde_json::to_value(base)? {
        JsonValue::Object(map) => map,
        _ => Map::new(),
    };
    for (key, value) in overrides {
        if value.is_null() {
            continue;
        }
        merged.insert(normalize_key(&key), value);
    }
    serde_json::from_value(JsonValue::Object(merged))
}

/// Accept the camelCase spellings JS callers reach for.
fn normalize_key(key: &str) -> String {
    match key {
        "staggerMs" | "staggerDelay" => "stagger_ms".to_string(),
        "baseOffsetMs" | "baseOffset" => "base_offset_ms".to_string(),
        "respectReducedMotion" => "respect_reduced_motion".to_string(),
        other => other.to_string(),
    }
}

/// Map the `once: bool` shorthand onto `mode`.
pub fn normalize_descriptor_json(value: JsonValue) -> JsonValue {
    let JsonValue::Object(mut obj) = value else {
        return value;
    };
    if let Some(once) = obj.remove("once").and_then(|v| v.as_bool()) {
        obj.insert(
            "mode".to_string(),
            JsonValue::String(if once { "once" } else { "repeat" }.to_string()),
        );
    }
    JsonValue::Object(obj)
}
