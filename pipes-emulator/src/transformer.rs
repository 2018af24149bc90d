//! `InputTemplate` placeholder substitution.
//!
//! Grounded on `targets/input_transformer.py`: `<...>` placeholders
//! (greedy-minimal, i.e. non-greedy) are substituted from a fixed table of
//! pipe/event context plus `$.`-prefixed dotted jsonpath lookups into the
//! event itself.

use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<(.*?)>").expect("static pattern is valid"))
}

/// Applies an `InputTemplate` to one event.
pub struct InputTransformer {
    input_template: String,
    pipe_arn: String,
    pipe_name: String,
    source_arn: String,
    target_arn: String,
}

impl InputTransformer {
    /// Builds a transformer bound to one pipe's template and ARNs.
    #[must_use]
    pub fn new(
        input_template: impl Into<String>,
        pipe_arn: impl Into<String>,
        pipe_name: impl Into<String>,
        source_arn: impl Into<String>,
        target_arn: impl Into<String>,
    ) -> Self {
        Self {
            input_template: input_template.into(),
            pipe_arn: pipe_arn.into(),
            pipe_name: pipe_name.into(),
            source_arn: source_arn.into(),
            target_arn: target_arn.into(),
        }
    }

    /// Transforms one event, returning either a structured JSON value (when
    /// the whole template is a single placeholder resolving to an
    /// object/array) or a string.
    #[must_use]
    pub fn transform(&self, event: &Value) -> Value {
        let replacements = self.build_replacements(event);
        Self::replace_placeholders(&self.input_template, &replacements)
    }

    fn build_replacements(&self, event: &Value) -> HashMap<String, Value> {
        let mut replacements = HashMap::new();
        replacements.insert("aws.pipes.pipe-arn".to_string(), Value::String(self.pipe_arn.clone()));
        replacements.insert("aws.pipes.pipe-name".to_string(), Value::String(self.pipe_name.clone()));
        replacements.insert("aws.pipes.source-arn".to_string(), Value::String(self.source_arn.clone()));
        replacements.insert("aws.pipes.target-arn".to_string(), Value::String(self.target_arn.clone()));
        replacements.insert(
            "aws.pipes.event.ingestion-time".to_string(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );
        replacements.insert("aws.pipes.event.json".to_string(), event.clone());
        replacements.insert("aws.pipes.event".to_string(), event.clone());

        for capture in placeholder_pattern().captures_iter(&self.input_template) {
            let key = &capture[1];
            if let Some(path) = key.strip_prefix("$.") {
                replacements.insert(key.to_string(), extract_jsonpath(event, path));
            }
        }

        replacements
    }

    fn replace_placeholders(template: &str, replacements: &HashMap<String, Value>) -> Value {
        let stripped = template.trim();

        // Whole template is a single placeholder: preserve structured values.
        if let Some(caps) = full_match_placeholder(stripped) {
            let value = replacements.get(&caps).cloned().unwrap_or(Value::String(String::new()));
            if value.is_object() || value.is_array() {
                return value;
            }
        }

        let result = placeholder_pattern().replace_all(template, |caps: &regex::Captures<'_>| {
            let key = &caps[1];
            match replacements.get(key) {
                Some(Value::Object(_)) | Some(Value::Array(_)) | Some(Value::Bool(_)) => {
                    replacements[key].to_string()
                }
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            }
        });

        if stripped.starts_with('{') {
            if let Ok(parsed) = serde_json::from_str::<Value>(&result) {
                return parsed;
            }
        }

        Value::String(result.into_owned())
    }
}

/// Returns `Some(key)` if `template` is, after trimming, exactly one
/// `<key>` placeholder and nothing else.
fn full_match_placeholder(stripped: &str) -> Option<String> {
    let caps = placeholder_pattern().captures(stripped)?;
    let whole = caps.get(0)?;
    if whole.start() == 0 && whole.end() == stripped.len() {
        Some(caps[1].to_string())
    } else {
        None
    }
}

/// Dot-separated jsonpath extraction from the event root. Returns an empty
/// string on any missing key or non-object traversal, matching the
/// original's `_extract_jsonpath`.
fn extract_jsonpath(event: &Value, path: &str) -> Value {
    let mut current = event;
    for key in path.split('.') {
        match current.get(key) {
            Some(next) => current = next,
            None => return Value::String(String::new()),
        }
    }
    current.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transformer(template: &str) -> InputTransformer {
        InputTransformer::new(
            template,
            "arn:aws:pipes:us-east-1:000000000000:pipe/p",
            "p",
            "arn:aws:sqs:us-east-1:000000000000:src",
            "arn:aws:sqs:us-east-1:000000000000:dst",
        )
    }

    #[test]
    fn whole_template_placeholder_preserves_object_type() {
        let t = transformer("<aws.pipes.event.json>");
        let event = json!({"a": "b"});
        assert_eq!(t.transform(&event), event);
    }

    #[test]
    fn whole_template_placeholder_with_surrounding_whitespace_preserves_type() {
        let t = transformer("  <aws.pipes.event.json>  ");
        let event = json!({"a": "b"});
        assert_eq!(t.transform(&event), event);
    }

    #[test]
    fn json_object_template_substitutes_and_reparses() {
        let t = transformer(r#"{"pipe": "<aws.pipes.pipe-name>", "val": <$.x>}"#);
        let event = json!({"x": 7});
        assert_eq!(t.transform(&event), json!({"pipe": "p", "val": 7}));
    }

    #[test]
    fn jsonpath_extraction_of_nested_value() {
        let t = transformer("<$.body.key>");
        let event = json!({"body": {"key": "value"}});
        assert_eq!(t.transform(&event), json!("value"));
    }

    #[test]
    fn missing_jsonpath_key_resolves_to_empty_string() {
        let t = transformer("<$.missing.path>");
        let event = json!({"a": 1});
        assert_eq!(t.transform(&event), json!(""));
    }

    #[test]
    fn plain_string_template_with_multiple_placeholders() {
        let t = transformer("pipe=<aws.pipes.pipe-name> src=<aws.pipes.source-arn>");
        let event = json!({});
        assert_eq!(
            t.transform(&event),
            json!("pipe=p src=arn:aws:sqs:us-east-1:000000000000:src")
        );
    }

    #[test]
    fn non_placeholder_template_is_returned_as_string() {
        let t = transformer("no placeholders here");
        assert_eq!(t.transform(&json!({})), json!("no placeholders here"));
    }
}
