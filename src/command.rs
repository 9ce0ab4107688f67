//! Command routing
//!
//! Maps a command name and its raw parameters onto a [`QueryService`]
//! handler and wraps the outcome in a [`ReplyEnvelope`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::handlers::{CommandError, QueryService};
use crate::query::QueryRequest;
use crate::reply::{Reply, ReplyEnvelope};

/// The six commands exposed at the service boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Command {
    Exist,
    SelectRow,
    SelectAll,
    Insert,
    Delete,
    Update,
}

impl Command {
    pub const ALL: [Command; 6] = [
        Command::Exist,
        Command::SelectRow,
        Command::SelectAll,
        Command::Insert,
        Command::Delete,
        Command::Update,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Exist => "exist",
            Command::SelectRow => "select-row",
            Command::SelectAll => "select-all",
            Command::Insert => "insert",
            Command::Delete => "delete",
            Command::Update => "update",
        }
    }

    /// True for commands that create a new object
    pub fn is_write(&self) -> bool {
        matches!(self, Command::Insert | Command::Delete | Command::Update)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown command: {0}")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Underscore spellings are accepted for callers that use identifiers as names.
        match s.to_lowercase().replace('_', "-").as_str() {
            "exist" => Ok(Command::Exist),
            "select-row" => Ok(Command::SelectRow),
            "select-all" => Ok(Command::SelectAll),
            "insert" => Ok(Command::Insert),
            "delete" => Ok(Command::Delete),
            "update" => Ok(Command::Update),
            _ => Err(UnknownCommand(s.to_string())),
        }
    }
}

/// Run `command` with already-decoded request parameters
pub async fn execute(service: &QueryService, command: Command, request: &QueryRequest) -> Result<Reply, CommandError> {
    match command {
        Command::Exist => service.exist(request).await.map(Reply::from),
        Command::SelectRow => service.select_row(request).await.map(Reply::from),
        Command::SelectAll => service.select_all(request).await.map(Reply::from),
        Command::Insert => service.insert(request).await.map(Reply::from),
        Command::Delete => service.delete(request).await.map(Reply::from),
        Command::Update => service.update(request).await.map(Reply::from),
    }
}

/// Decode `parameters` as a query request, run `command` and build the envelope.
///
/// Never fails: every error becomes a failure envelope.
pub async fn dispatch(service: &QueryService, command: Command, parameters: Value) -> ReplyEnvelope {
    let request: QueryRequest = match serde_json::from_value(parameters) {
        Ok(request) => request,
        Err(e) => return ReplyEnvelope::fail(format!("parameter validation: {}", e)),
    };

    match execute(service, command, &request).await {
        Ok(reply) => ReplyEnvelope::ok(&reply),
        Err(e) => {
            tracing::debug!(command = %command, step = e.step(), "command failed: {}", e);
            ReplyEnvelope::fail(e.to_string())
        }
    }
}
