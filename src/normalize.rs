//! Coerce a raw reply into a single JSON object.

use serde::Deserialize;
use serde_json::{Map, Value};

/// One document's structured result; always a JSON object at the top level.
pub type NormalizedRecord = Map<String, Value>;

/// Key under which non-object replies are wrapped.
pub const RESPONSE_KEY: &str = "response";

/// Objects pass through unchanged; any other JSON value, or text that is not
/// JSON at all, is wrapped as `{"response": ...}`.
pub fn normalize(reply: &str) -> NormalizedRecord {
    match parse(reply) {
        Ok(Value::Object(map)) => map,
        Ok(other) => wrap(other),
        Err(_) => wrap(Value::String(reply.to_string())),
    }
}

/// Full JSON parse with no nesting limit; deep input grows the stack on demand.
fn parse(reply: &str) -> serde_json::Result<Value> {
    let mut json = serde_json::Deserializer::from_str(reply);
    json.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut json))?;
    json.end()?;
    Ok(value)
}

fn wrap(value: Value) -> NormalizedRecord {
    let mut map = Map::new();
    map.insert(RESPONSE_KEY.to_string(), value);
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_value(record: NormalizedRecord) -> Value {
        Value::Object(record)
    }

    #[test]
    fn test_object_passes_through() {
        let reply = r#"{"invoice_no": "A-17", "lines": [{"qty": 2, "nested": {"deep": null}}]}"#;
        assert_eq!(
            as_value(normalize(reply)),
            json!({"invoice_no": "A-17", "lines": [{"qty": 2, "nested": {"deep": null}}]})
        );
    }

    #[test]
    fn test_non_objects_are_wrapped() {
        assert_eq!(as_value(normalize("[1,2]")), json!({"response": [1, 2]}));
        assert_eq!(as_value(normalize("\"x\"")), json!({"response": "x"}));
        assert_eq!(as_value(normalize("42")), json!({"response": 42}));
        assert_eq!(as_value(normalize("true")), json!({"response": true}));
        assert_eq!(as_value(normalize("null")), json!({"response": null}));
    }

    #[test]
    fn test_invalid_json_is_wrapped_verbatim() {
        assert_eq!(as_value(normalize("not json")), json!({"response": "not json"}));
        assert_eq!(as_value(normalize("")), json!({"response": ""}));

        let fenced = "```json\n{\"a\": 1}\n```";
        assert_eq!(as_value(normalize(fenced)), json!({"response": fenced}));

        let truncated = r#"{"a": [1, 2"#;
        assert_eq!(as_value(normalize(truncated)), json!({"response": truncated}));
    }

    #[test]
    fn test_deeply_nested_object_passes_through() {
        let depth = 200;
        let reply = format!(r#"{{"a":{}1{}}}"#, "[".repeat(depth), "]".repeat(depth));
        let record = normalize(&reply);

        assert_eq!(record.keys().collect::<Vec<_>>(), ["a"]);
        let mut value = &record["a"];
        for _ in 1..depth {
            value = &value[0];
        }
        assert_eq!(value, &json!([1]));
    }

    #[test]
    fn test_trailing_garbage_is_not_json() {
        let reply = r#"{"a": 1} trailing"#;
        assert_eq!(as_value(normalize(reply)), json!({"response": reply}));
    }

    #[test]
    fn test_surrounding_whitespace_is_tolerated_by_the_parser() {
        assert_eq!(as_value(normalize("  {\"a\": 1}\n")), json!({"a": 1}));
    }

    #[test]
    fn test_renormalizing_a_record_is_a_no_op() {
        for reply in [r#"{"summary":"ok"}"#, "[1,2]", "not json", "7"] {
            let once = normalize(reply);
            let serialized = serde_json::to_string(&once).unwrap();
            assert_eq!(normalize(&serialized), once, "reply: {reply}");
        }
    }
}
