//! Input validation for resumptions
//!
//! Validates the stored triggering event before it is replayed to a job
//! endpoint, and bounds the JSON values (task outputs) the resumer persists.

use crate::error::{ResumeError, ResumeResult};
use crate::models::{ApiEventLog, EventLog};
use serde_json::Value;

/// Maximum allowed size for JSONB payloads (1MB)
const MAX_JSON_SIZE_BYTES: usize = 1024 * 1024;

/// Maximum nesting depth for JSON objects/arrays
const MAX_JSON_DEPTH: usize = 64;

/// Validates JSONB input for size and nesting constraints
pub fn validate_jsonb_input(value: &Value) -> ResumeResult<()> {
    let serialized = serde_json::to_string(value)
        .map_err(|e| ResumeError::Validation(format!("Invalid JSON structure: {e}")))?;

    if serialized.len() > MAX_JSON_SIZE_BYTES {
        return Err(ResumeError::Validation(format!(
            "JSON payload too large: {} bytes (max: {})",
            serialized.len(),
            MAX_JSON_SIZE_BYTES
        )));
    }

    validate_json_depth(value, 0)
}

fn validate_json_depth(value: &Value, current_depth: usize) -> ResumeResult<()> {
    if current_depth > MAX_JSON_DEPTH {
        return Err(ResumeError::Validation(format!(
            "JSON nesting too deep: {current_depth} (max: {MAX_JSON_DEPTH})"
        )));
    }

    match value {
        Value::Object(map) => map
            .values()
            .try_for_each(|val| validate_json_depth(val, current_depth + 1)),
        Value::Array(arr) => arr
            .iter()
            .try_for_each(|item| validate_json_depth(item, current_depth + 1)),
        _ => Ok(()),
    }
}

/// Validates a task output before it is persisted
pub fn validate_task_output(output: &Value) -> ResumeResult<()> {
    validate_jsonb_input(output)
}

/// Parse a stored event into the shape job endpoints accept.
///
/// A malformed event is fatal for the resumption: the endpoint must never be
/// called with it.
pub fn parse_event_log(event_log: &EventLog) -> ResumeResult<ApiEventLog> {
    if event_log.id.trim().is_empty() {
        return Err(ResumeError::Validation(
            "Event log is missing an id".to_string(),
        ));
    }

    if event_log.name.trim().is_empty() {
        return Err(ResumeError::Validation(format!(
            "Event log {} is missing a name",
            event_log.id
        )));
    }

    if event_log.payload.is_null() {
        return Err(ResumeError::Validation(format!(
            "Event log {} has no payload",
            event_log.id
        )));
    }
    validate_jsonb_input(&event_log.payload)?;

    if let Some(context) = &event_log.context {
        if !context.is_object() && !context.is_null() {
            return Err(ResumeError::Validation(format!(
                "Event log {} context must be a JSON object",
                event_log.id
            )));
        }
        validate_jsonb_input(context)?;
    }

    Ok(ApiEventLog {
        id: event_log.id.clone(),
        name: event_log.name.clone(),
        payload: event_log.payload.clone(),
        context: event_log.context.clone().filter(|c| !c.is_null()),
        timestamp: event_log.timestamp,
        deliver_at: event_log.deliver_at,
        delivered_at: event_log.delivered_at,
    })
}
