//! Query parameter extraction
//!
//! Pure validation of a [`QueryRequest`] and its translation into storage
//! references and write payloads. No I/O happens here.

use crate::content_id::ContentId;
use crate::{Error, Result};
use super::QueryRequest;

/// A resolved `(file name, content identifier)` pair for one request row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageReference {
    pub file_name: String,
    pub content_id: ContentId,
}

/// File name and string content of a single write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritePayload {
    pub file_name: String,
    pub content: String,
}

/// Check that `fields` and `tables` have the expected, matching length.
///
/// `expected == 0` accepts any positive count as long as both sequences agree.
pub fn validate_shape(request: &QueryRequest, expected: usize) -> Result<()> {
    let fields = request.fields.len();
    let tables = request.tables.len();

    if expected > 0 {
        if fields != expected {
            return Err(Error::ShapeMismatch(format!(
                "required {} field length, but query request has {} fields",
                expected, fields
            )));
        }
        if tables != expected {
            return Err(Error::ShapeMismatch(format!(
                "required {} tables, but query request has {} tables",
                expected, tables
            )));
        }
        return Ok(());
    }

    if fields == 0 {
        return Err(Error::EmptyRequest);
    }
    if tables != fields {
        return Err(Error::ShapeMismatch(format!(
            "required {} tables (same as fields), but query request has {} tables",
            fields, tables
        )));
    }
    Ok(())
}

/// Check that `file_name` names a single entry directly inside an object.
///
/// Gateways resolve empty, `.` and `..` segments to the object root.
pub fn validate_file_name(file_name: &str) -> Result<()> {
    let reason = match file_name {
        "" => "file name is empty",
        "." | ".." => "file name is a relative path segment",
        name if name.contains(['/', '\\']) => "file name contains a path separator",
        _ => return Ok(()),
    };
    Err(Error::InvalidFileName {
        file_name: file_name.to_string(),
        reason,
    })
}

/// Resolve row `index` into a storage reference, decoding its identifier.
pub fn resolve_reference_at(request: &QueryRequest, index: usize) -> Result<StorageReference> {
    let (Some(file_name), Some(table)) = (request.fields.get(index), request.tables.get(index)) else {
        return Err(Error::IndexOutOfRange {
            index,
            fields: request.fields.len(),
            tables: request.tables.len(),
        });
    };
    validate_file_name(file_name)?;

    Ok(StorageReference {
        file_name: file_name.clone(),
        content_id: ContentId::decode(table)?,
    })
}

/// Extract the single `(file name, string content)` pair a write needs.
///
/// Requires exactly one field and exactly one argument, and the argument
/// must be a JSON string. `tables` is not consulted.
pub fn extract_write_payload(request: &QueryRequest) -> Result<WritePayload> {
    if request.fields.len() != 1 {
        return Err(Error::ShapeMismatch(format!(
            "missing the file name in fields or too many file names were given ({} fields)",
            request.fields.len()
        )));
    }
    if request.arguments.len() != 1 {
        return Err(Error::InvalidArgumentType(format!(
            "missing the file content in the arguments or too many contents were given ({} arguments)",
            request.arguments.len()
        )));
    }

    validate_file_name(&request.fields[0])?;

    let content = request.arguments[0].as_str().ok_or_else(|| {
        Error::InvalidArgumentType(format!(
            "the argument should be a string but it's {}",
            json_type_name(&request.arguments[0])
        ))
    })?;

    Ok(WritePayload {
        file_name: request.fields[0].clone(),
        content: content.to_string(),
    })
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
