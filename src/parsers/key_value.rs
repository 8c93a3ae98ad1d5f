use super::text::clean_lines;
use indexmap::IndexMap;
use serde_json::Value;

/// Fold `key: value` lines into a mapping. Split on the first colon; lines
/// without one or with an empty key are dropped; later keys overwrite earlier ones.
pub fn parse(stdout: &str) -> IndexMap<String, Value> {
    let mut profile = IndexMap::new();
    for line in clean_lines(stdout) {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        profile.insert(key.to_string(), Value::String(value.trim().to_string()));
    }
    profile
}
