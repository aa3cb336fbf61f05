//! Conversation turns for one intake session

use crate::unix_timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person filing the report
    User,
    /// The assistant
    Assistant,
}

impl Role {
    /// Lowercase label used in prompts and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Author of the message
    pub role: Role,
    /// Message text
    pub content: String,
    /// Unix timestamp (seconds) when the turn was logged
    pub at: u64,
}

/// Append-only, ordered conversation log
#[derive(Debug, Clone, Default)]
pub struct TurnLog {
    turns: Vec<Turn>,
}

impl TurnLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user turn
    pub fn append_user(&mut self, content: impl Into<String>) {
        self.append(Role::User, content.into());
    }

    /// Append an assistant turn
    pub fn append_assistant(&mut self, content: impl Into<String>) {
        self.append(Role::Assistant, content.into());
    }

    fn append(&mut self, role: Role, content: String) {
        self.turns.push(Turn {
            role,
            content,
            at: unix_timestamp(),
        });
    }

    /// The last `n` turns, oldest first
    pub fn window(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    /// Every turn, oldest first
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether nothing has been said yet
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drop the whole conversation (explicit reset only)
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
