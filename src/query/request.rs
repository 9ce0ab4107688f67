//! Generic tabular query request

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A generic tabular query as delivered by the command router.
///
/// `fields` and `tables` are parallel: `fields[i]` names a file and
/// `tables[i]` is the textual content identifier holding it. `arguments`
/// carries write payloads. `where` is accepted and passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub fields: Vec<String>,

    #[serde(default)]
    pub tables: Vec<String>,

    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<String>,

    #[serde(default)]
    pub arguments: Vec<Value>,
}

impl QueryRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a `(file name, content identifier)` pair
    pub fn with_row(mut self, file_name: impl Into<String>, cid: impl Into<String>) -> Self {
        self.fields.push(file_name.into());
        self.tables.push(cid.into());
        self
    }

    pub fn with_field(mut self, file_name: impl Into<String>) -> Self {
        self.fields.push(file_name.into());
        self
    }

    pub fn with_argument(mut self, value: impl Into<Value>) -> Self {
        self.arguments.push(value.into());
        self
    }
}
