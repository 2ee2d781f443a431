use serde_json::Value;

/// Vendor extension keys that are known to break renderers. They are
/// removed wherever they appear in the document.
pub const DENIED_EXTENSION_KEYS: &[&str] = &[
    "x-apifox-orders",
    "x-apifox-ignore-properties",
    "x-apifox-folder",
    "x-apifox-status",
    "x-apifox-name",
    "x-apifox-refs",
    "x-apifox-overrides",
    "x-apifox-enum",
    "x-apifox-mock",
    "x-run-in-apifox",
    "x-apifox-fe-general-model-base-action-type",
    "x-apifox",
];

/// Replacement for every non-ASCII character inside a `$ref`.
pub const REF_PLACEHOLDER: char = '_';

/// Return a cleaned copy of `spec`: denied extension keys stripped and
/// `$ref` strings reduced to ASCII. The input is left untouched.
pub fn sanitize(spec: &Value) -> Value {
    let mut cleaned = spec.clone();
    clean(&mut cleaned);
    cleaned
}

// serde_json values are trees, so plain recursion terminates.
fn clean(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|key, _| !DENIED_EXTENSION_KEYS.contains(&key.as_str()));
            for (key, child) in map.iter_mut() {
                match child {
                    Value::String(reference) if key == "$ref" => {
                        *reference = ascii_reference(reference);
                    }
                    _ => clean(child),
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(clean),
        _ => {}
    }
}

fn ascii_reference(reference: &str) -> String {
    reference
        .chars()
        .map(|c| if c.is_ascii() { c } else { REF_PLACEHOLDER })
        .collect()
}
