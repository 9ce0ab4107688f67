//! Reply types and the generic reply envelope
//!
//! Each command has its own typed reply. The envelope is what crosses the
//! command boundary: a status marker, a human-readable message (set on
//! failure) and the reply's fields as `parameters`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::storage::StoredItem;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistReply {
    pub exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectRowReply {
    pub outputs: StoredItem,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectAllReply {
    pub rows: Vec<StoredItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertReply {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteReply {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReply {
    pub id: String,
}

/// The closed set of successful command results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Exist(ExistReply),
    SelectRow(SelectRowReply),
    SelectAll(SelectAllReply),
    Insert(InsertReply),
    Delete(DeleteReply),
    Update(UpdateReply),
}

macro_rules! impl_from_reply {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Reply {
                fn from(reply: $ty) -> Self {
                    Reply::$variant(reply)
                }
            }
        )*
    };
}

impl_from_reply!(
    Exist(ExistReply),
    SelectRow(SelectRowReply),
    SelectAll(SelectAllReply),
    Insert(InsertReply),
    Delete(DeleteReply),
    Update(UpdateReply),
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "fail")]
    Fail,
}

/// Generic reply carried back over the command boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyEnvelope {
    pub status: Status,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl ReplyEnvelope {
    /// Successful envelope carrying `reply`'s fields
    pub fn ok(reply: &Reply) -> Self {
        match serde_json::to_value(reply) {
            Ok(Value::Object(parameters)) => Self {
                status: Status::Ok,
                message: String::new(),
                parameters,
            },
            Ok(other) => Self::fail(format!("reply: expected an object, got {}", other)),
            Err(e) => Self::fail(format!("reply: {}", e)),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            status: Status::Fail,
            message: message.into(),
            parameters: Map::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// Decode the parameters into a typed reply
    pub fn parameters_as<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(Value::Object(self.parameters.clone()))
    }
}
