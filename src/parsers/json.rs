use super::ParseError;
use indexmap::IndexMap;
use serde_json::Value;

/// Key used when the document is valid JSON but not an object.
pub const NON_OBJECT_KEY: &str = "result";

/// Parse whole stdout as one JSON document.
pub fn parse(stdout: &str) -> Result<IndexMap<String, Value>, ParseError> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(IndexMap::new());
    }

    let value: Value = serde_json::from_str(trimmed)?;
    let profile = match value {
        Value::Object(map) => map.into_iter().collect(),
        other => IndexMap::from([(NON_OBJECT_KEY.to_string(), other)]),
    };
    Ok(profile)
}
