use serde_json::{Map, Value};

use super::{SearchError, SearchResult};

const NO_ANSWER: &str = "No answer provided";
const NO_LOCATION: &str = "Location not specified";
const NO_VALUE: &str = "N/A";
const NO_EXPLANATION: &str = "No explanation provided";
const NO_CALCULATION: &str = "No calculation performed";

/// The span from the first `{` to the last `}`
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Validate and normalize an untrusted reply.
///
/// Only total unparseability fails. Shape mismatches are absorbed: structured scalars are
/// serialized, non-list list fields become empty, missing fields get placeholder text.
pub fn parse_reply(query: &str, raw: &str) -> Result<SearchResult, SearchError> {
    let json = extract_json_object(raw)
        .ok_or_else(|| SearchError::MalformedReply("no JSON object found".to_string()))?;

    let value: Value = serde_json::from_str(json)
        .map_err(|e| SearchError::MalformedReply(e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(SearchError::MalformedReply("reply is not a JSON object".to_string()));
    };

    Ok(SearchResult {
        query: query.to_string(),
        answer: scalar(&fields, "answer", NO_ANSWER),
        location: scalar(&fields, "location", NO_LOCATION),
        value: scalar(&fields, "value", NO_VALUE),
        explanation: scalar(&fields, "explanation", NO_EXPLANATION),
        calculation: scalar(&fields, "calculation", NO_CALCULATION),
        tabs_used: list(&fields, "tabsUsed"),
        alternatives: list(&fields, "alternatives"),
        suggestion: scalar(&fields, "suggestion", ""),
        is_from_collaborator: true,
    })
}

fn to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

fn scalar(fields: &Map<String, Value>, key: &str, default: &str) -> String {
    fields
        .get(key)
        .and_then(to_text)
        .unwrap_or_else(|| default.to_string())
}

fn list(fields: &Map<String, Value>, key: &str) -> Vec<String> {
    match fields.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(to_text).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_reply() {
        let raw = r#"{
            "answer": "Total revenue is 2000",
            "location": "Sales!B4",
            "value": "2000",
            "explanation": "Read from the existing SUM formula",
            "calculation": "=SUM(B2:B3)",
            "tabsUsed": ["Sales"],
            "alternatives": ["North contributes 1200"],
            "suggestion": "Track growth by quarter"
        }"#;

        let result = parse_reply("total revenue", raw).unwrap();
        assert_eq!(result.query, "total revenue");
        assert_eq!(result.answer, "Total revenue is 2000");
        assert_eq!(result.location, "Sales!B4");
        assert_eq!(result.value, "2000");
        assert_eq!(result.calculation, "=SUM(B2:B3)");
        assert_eq!(result.tabs_used, vec!["Sales"]);
        assert_eq!(result.alternatives, vec!["North contributes 1200"]);
        assert_eq!(result.suggestion, "Track growth by quarter");
        assert!(result.is_from_collaborator);
    }

    #[test]
    fn test_object_value_is_serialized_and_defaults_fill_gaps() {
        let result = parse_reply("q", r#"{"answer":"42","value":{"x":1}}"#).unwrap();

        assert_eq!(result.answer, "42");
        assert_eq!(result.value, "{\"x\":1}");
        assert_eq!(result.location, "Location not specified");
        assert_eq!(result.explanation, "No explanation provided");
        assert_eq!(result.calculation, "No calculation performed");
        assert_eq!(result.suggestion, "");
        assert!(result.tabs_used.is_empty());
        assert!(result.alternatives.is_empty());
    }

    #[test]
    fn test_reply_wrapped_in_prose_and_fences() {
        let raw = "Sure! Here is the answer:\n```json\n{\"answer\": \"Yes\", \"tabsUsed\": \"Sales\"}\n```\nHope that helps.";
        let result = parse_reply("q", raw).unwrap();
        assert_eq!(result.answer, "Yes");
        assert!(result.tabs_used.is_empty());
    }

    #[test]
    fn test_scalar_coercion() {
        let raw = r#"{"answer": 42, "value": 3.5, "calculation": ["=A1", "=A2"], "location": null, "explanation": "", "suggestion": true}"#;
        let result = parse_reply("q", raw).unwrap();
        assert_eq!(result.answer, "42");
        assert_eq!(result.value, "3.5");
        assert_eq!(result.calculation, "[\"=A1\",\"=A2\"]");
        assert_eq!(result.location, "Location not specified");
        assert_eq!(result.explanation, "No explanation provided");
        assert_eq!(result.suggestion, "true");
    }

    #[test]
    fn test_list_elements_are_stringified() {
        let raw = r#"{"tabsUsed": ["Sales", 2, null, {"tab": "X"}], "alternatives": {"a": 1}}"#;
        let result = parse_reply("q", raw).unwrap();
        assert_eq!(result.tabs_used, vec!["Sales", "2", "{\"tab\":\"X\"}"]);
        assert!(result.alternatives.is_empty());
        assert_eq!(result.answer, "No answer provided");
        assert_eq!(result.value, "N/A");
    }

    #[test]
    fn test_no_brace_span_is_malformed() {
        for raw in ["I could not find anything.", "", "} backwards {", "{ only open"] {
            assert!(
                matches!(parse_reply("q", raw), Err(SearchError::MalformedReply(_))),
                "expected malformed for {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_undecodable_span_is_malformed() {
        let err = parse_reply("q", "{answer: 42,}").unwrap_err();
        assert!(matches!(err, SearchError::MalformedReply(_)));
    }

    #[test]
    fn test_extract_json_object() {
        assert_eq!(extract_json_object("xx{\"a\":{\"b\":1}}yy"), Some("{\"a\":{\"b\":1}}"));
        assert_eq!(extract_json_object("no braces"), None);
    }
}
