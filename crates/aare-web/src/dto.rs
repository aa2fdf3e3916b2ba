use serde::Serialize;
use serde_json::Value;

use aare_core::{DEFAULT_ONTOLOGY_NAME, VerifyRequest};

pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON in request body";
pub const LLM_OUTPUT_REQUIRED_MESSAGE: &str = "llm_output is required";
pub const ONTOLOGY_NOT_STRING_MESSAGE: &str = "ontology must be a string";
pub const BODY_TOO_LARGE_MESSAGE: &str = "Request body too large";
pub const UNREADABLE_BODY_MESSAGE: &str = "Request body could not be read";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed";

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// 500 body: sanitized message, stable kind, and a trace id matching the server log.
#[derive(Debug, Serialize)]
pub struct InternalErrorBody {
    pub error: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub trace_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestRejection {
    InvalidJson,
    MissingLlmOutput,
    OntologyNotString,
    BodyTooLarge,
    UnreadableBody,
}

impl RequestRejection {
    pub fn message(self) -> &'static str {
        match self {
            Self::InvalidJson => INVALID_JSON_MESSAGE,
            Self::MissingLlmOutput => LLM_OUTPUT_REQUIRED_MESSAGE,
            Self::OntologyNotString => ONTOLOGY_NOT_STRING_MESSAGE,
            Self::BodyTooLarge => BODY_TOO_LARGE_MESSAGE,
            Self::UnreadableBody => UNREADABLE_BODY_MESSAGE,
        }
    }
}

/// Decode a POST body into a verification request.
///
/// An empty, unparseable, `null`, non-object or empty-object body is invalid
/// JSON. `llm_output` must be a non-empty string; `ontology` defaults to the
/// built-in ontology when absent or `null`.
pub fn parse_verify_request(body: &[u8]) -> Result<VerifyRequest, RequestRejection> {
    let document =
        serde_json::from_slice::<Value>(body).map_err(|_| RequestRejection::InvalidJson)?;
    let fields = match document {
        Value::Object(fields) if !fields.is_empty() => fields,
        _ => return Err(RequestRejection::InvalidJson),
    };

    let llm_output = match fields.get("llm_output") {
        Some(Value::String(text)) if !text.is_empty() => text.clone(),
        _ => return Err(RequestRejection::MissingLlmOutput),
    };
    let ontology = match fields.get("ontology") {
        None | Some(Value::Null) => DEFAULT_ONTOLOGY_NAME.to_string(),
        Some(Value::String(name)) => name.clone(),
        Some(_) => return Err(RequestRejection::OntologyNotString),
    };

    Ok(VerifyRequest::new(llm_output).with_ontology(ontology))
}
