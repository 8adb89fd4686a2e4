//! The notes retrieval tool: its declaration and validated arguments

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::agents::error::{AgentError, AgentResult};

/// Name the model uses to request note retrieval
pub const RETRIEVE_NOTES_TOOL: &str = "query_user_notes_collection";

/// Definition of a tool declared to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON Schema defining the tool's parameters
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a new tool definition
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// The single capability every student agent declares
    pub fn retrieve_notes() -> Self {
        Self::new(
            RETRIEVE_NOTES_TOOL,
            "Get the user's notes that are most similar to a list of queries.",
            json!({
                "type": "object",
                "properties": {
                    "query_texts": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "A list of strings which will be used to query the notes collection. Each string will have its own set of results."
                    },
                    "n_results": {
                        "type": "integer",
                        "description": "The number of most similar notes to return for each query text."
                    }
                },
                "required": ["query_texts", "n_results"]
            }),
        )
    }
}

/// Arguments of a retrieval request, validated against the declared schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrieveNotesArgs {
    pub query_texts: Vec<String>,
    pub n_results: u32,
}

impl RetrieveNotesArgs {
    /// Validate the raw argument object sent by the model.
    ///
    /// Anything other than an object with exactly `query_texts` (array of
    /// strings) and `n_results` (positive integer) is rejected.
    pub fn from_arguments(args: &Value) -> AgentResult<Self> {
        let obj = args
            .as_object()
            .ok_or_else(|| malformed("arguments must be an object"))?;

        if let Some(unknown) = obj
            .keys()
            .find(|k| k.as_str() != "query_texts" && k.as_str() != "n_results")
        {
            return Err(malformed(format!("unexpected argument '{}'", unknown)));
        }

        let query_texts = parse_query_texts(obj)?;
        let n_results = parse_n_results(obj)?;

        Ok(Self {
            query_texts,
            n_results,
        })
    }
}

fn parse_query_texts(obj: &Map<String, Value>) -> AgentResult<Vec<String>> {
    let raw = obj
        .get("query_texts")
        .ok_or_else(|| malformed("missing 'query_texts'"))?
        .as_array()
        .ok_or_else(|| malformed("'query_texts' must be an array of strings"))?;

    raw.iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| malformed("'query_texts' must be an array of strings"))
        })
        .collect()
}

fn parse_n_results(obj: &Map<String, Value>) -> AgentResult<u32> {
    let raw = obj
        .get("n_results")
        .ok_or_else(|| malformed("missing 'n_results'"))?;

    // Gemini transports numbers as doubles, so 3.0 is an integer here.
    let n = match raw {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64)),
        _ => None,
    }
    .ok_or_else(|| malformed("'n_results' must be a non-negative integer"))?;

    if n == 0 {
        return Err(malformed("'n_results' must be at least 1"));
    }

    u32::try_from(n).map_err(|_| malformed("'n_results' is too large"))
}

fn malformed(reason: impl Into<String>) -> AgentError {
    AgentError::MalformedToolCall(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_arguments() {
        let args = RetrieveNotesArgs::from_arguments(&json!({
            "query_texts": ["pineapple", "mango"],
            "n_results": 2
        }))
        .unwrap();
        assert_eq!(args.query_texts, vec!["pineapple", "mango"]);
        assert_eq!(args.n_results, 2);
    }

    #[test]
    fn test_integral_float_is_accepted() {
        let args = RetrieveNotesArgs::from_arguments(&json!({
            "query_texts": ["x"],
            "n_results": 3.0
        }))
        .unwrap();
        assert_eq!(args.n_results, 3);
    }

    #[test]
    fn test_missing_n_results() {
        let err = RetrieveNotesArgs::from_arguments(&json!({"query_texts": ["x"]})).unwrap_err();
        assert!(matches!(err, AgentError::MalformedToolCall(_)));
    }

    #[test]
    fn test_rejects_wrong_shapes() {
        let cases = [
            json!("not an object"),
            json!({"query_texts": "x", "n_results": 1}),
            json!({"query_texts": [1, 2], "n_results": 1}),
            json!({"query_texts": ["x"], "n_results": "1"}),
            json!({"query_texts": ["x"], "n_results": 1.5}),
            json!({"query_texts": ["x"], "n_results": 0}),
            json!({"query_texts": ["x"], "n_results": -1}),
            json!({"query_texts": ["x"], "n_results": 1, "extra": true}),
        ];
        for case in cases {
            assert!(
                matches!(
                    RetrieveNotesArgs::from_arguments(&case),
                    Err(AgentError::MalformedToolCall(_))
                ),
                "accepted {}",
                case
            );
        }
    }

    #[test]
    fn test_declaration_requires_both_arguments() {
        let def = ToolDefinition::retrieve_notes();
        assert_eq!(def.name, RETRIEVE_NOTES_TOOL);
        assert_eq!(def.parameters["required"], json!(["query_texts", "n_results"]));
    }
}
