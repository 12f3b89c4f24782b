/// Declared response shapes and reply validation.
///
/// Schemas are written in the OpenAPI subset Gemini accepts for
/// `responseSchema`. They are plain data, independent of the HTTP client,
/// so fixture replies can be checked without a network.
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::types::{AnalysisResult, Category, ExecutionTrace, RefineResponse, Severity};
use crate::model::{ModelError, RequestKind};

/// A typed reply the model is asked to produce.
pub trait ResponseShape: DeserializeOwned {
    const KIND: RequestKind;

    /// The `responseSchema` sent with the request.
    fn response_schema() -> Value;

    /// Structural checks serde cannot express.
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

fn severity_values() -> Vec<&'static str> {
    Severity::ALL.iter().map(|s| s.as_str()).collect()
}

fn category_values() -> Vec<&'static str> {
    Category::ALL.iter().map(|c| c.as_str()).collect()
}

impl ResponseShape for AnalysisResult {
    const KIND: RequestKind = RequestKind::Analyze;

    fn response_schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "summary": {
                    "type": "STRING",
                    "description": "A short summary of what the code does in Hebrew."
                },
                "language": {
                    "type": "STRING",
                    "description": "The programming language detected."
                },
                "bugs": {
                    "type": "ARRAY",
                    "description": "List of errors or potential bugs found in the code.",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "line": { "type": "INTEGER", "description": "Line number of the issue if applicable" },
                            "description": { "type": "STRING", "description": "Explanation of the error in Hebrew" },
                            "severity": { "type": "STRING", "enum": severity_values() }
                        },
                        "required": ["description", "severity"]
                    }
                },
                "improvements": {
                    "type": "ARRAY",
                    "description": "Suggestions for code quality improvements.",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "description": { "type": "STRING", "description": "Suggestion description in Hebrew" },
                            "category": { "type": "STRING", "enum": category_values() }
                        },
                        "required": ["description", "category"]
                    }
                },
                "timeComplexity": {
                    "type": "STRING",
                    "description": "Big O time complexity analysis in Hebrew (e.g. O(n) because...)."
                },
                "spaceComplexity": {
                    "type": "STRING",
                    "description": "Big O space complexity analysis in Hebrew."
                },
                "correctedCode": {
                    "type": "STRING",
                    "description": "The full corrected version of the code implementing fixes and improvements."
                }
            },
            "required": [
                "summary", "language", "bugs", "improvements",
                "timeComplexity", "spaceComplexity", "correctedCode"
            ]
        })
    }
}

impl ResponseShape for ExecutionTrace {
    const KIND: RequestKind = RequestKind::Trace;

    fn response_schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "inputDescription": {
                    "type": "STRING",
                    "description": "Description of the sample input data chosen for this execution trace (in Hebrew)."
                },
                "steps": {
                    "type": "ARRAY",
                    "description": "Step by step execution flow.",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "step": { "type": "INTEGER" },
                            "lineContent": {
                                "type": "STRING",
                                "description": "The representative code line or operation being executed."
                            },
                            "variables": {
                                "type": "ARRAY",
                                "description": "List of relevant variables and their values at this step.",
                                "items": {
                                    "type": "OBJECT",
                                    "properties": {
                                        "name": { "type": "STRING" },
                                        "value": { "type": "STRING" }
                                    },
                                    "required": ["name", "value"]
                                }
                            },
                            "explanation": {
                                "type": "STRING",
                                "description": "Short explanation of what happened in this step in Hebrew."
                            }
                        },
                        "required": ["step", "lineContent", "variables", "explanation"]
                    }
                },
                "finalOutput": {
                    "type": "STRING",
                    "description": "The final output of the code execution."
                }
            },
            "required": ["inputDescription", "steps", "finalOutput"]
        })
    }

    fn check(&self) -> Result<(), String> {
        if self.steps.is_empty() {
            return Err("trace has no steps".to_string());
        }
        Ok(())
    }
}

impl ResponseShape for RefineResponse {
    const KIND: RequestKind = RequestKind::Refine;

    fn response_schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "newCode": {
                    "type": "STRING",
                    "description": "The full updated code after applying the requested change."
                },
                "explanation": {
                    "type": "STRING",
                    "description": "Short explanation in Hebrew of what was changed."
                }
            },
            "required": ["newCode", "explanation"]
        })
    }
}

/// Parse a raw model reply into `T`.
///
/// An absent or blank reply is [`ModelError::EmptyResponse`]; anything that
/// does not deserialize as `T` or fails [`ResponseShape::check`] is
/// [`ModelError::MalformedResponse`].
pub fn parse<T: ResponseShape>(reply: Option<&str>) -> Result<T, ModelError> {
    let text = match reply {
        Some(t) if !t.trim().is_empty() => t,
        _ => return Err(ModelError::EmptyResponse),
    };

    let value: T = serde_json::from_str(text)
        .map_err(|e| ModelError::MalformedResponse(format!("{} reply: {e}", T::KIND)))?;
    value
        .check()
        .map_err(|msg| ModelError::MalformedResponse(format!("{} reply: {msg}", T::KIND)))?;
    Ok(value)
}

/// Schema for a request kind, for display.
#[must_use]
pub fn schema_for(kind: RequestKind) -> Value {
    match kind {
        RequestKind::Analyze => AnalysisResult::response_schema(),
        RequestKind::Trace => ExecutionTrace::response_schema(),
        RequestKind::Refine => RefineResponse::response_schema(),
    }
}

/// JSON Schema generated from the Rust types, for fixture authoring.
#[must_use]
pub fn json_schema_for(kind: RequestKind) -> Value {
    let schema = match kind {
        RequestKind::Analyze => schemars::schema_for!(AnalysisResult),
        RequestKind::Trace => schemars::schema_for!(ExecutionTrace),
        RequestKind::Refine => schemars::schema_for!(RefineResponse),
    };
    serde_json::to_value(schema).unwrap_or(Value::Null)
}

// ── Tests ────────────────────────────────────────────────────────────
