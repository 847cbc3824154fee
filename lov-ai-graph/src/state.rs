//! Conversation state flowing through the graphs.

use lov_ai_retrieval::Document;
use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Router classification labels.
///
/// The serde names are the wire labels the rest of the system matches
/// on, including the Norwegian ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouterType {
    /// General conversational message, no retrieval needed
    #[serde(rename = "generelt")]
    Generelt,
    /// A legal question answerable from the statute index
    #[serde(rename = "lovspørsmål")]
    Lovsporsmal,
    /// Too vague; ask the user for more information
    #[serde(rename = "mer-info")]
    MerInfo,
}

impl std::fmt::Display for RouterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouterType::Generelt => write!(f, "generelt"),
            RouterType::Lovsporsmal => write!(f, "lovspørsmål"),
            RouterType::MerInfo => write!(f, "mer-info"),
        }
    }
}

/// The routing decision: a label plus the model's reasoning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Router {
    #[serde(rename = "type")]
    pub kind: RouterType,
    #[serde(default)]
    pub logic: String,
}

impl Default for Router {
    fn default() -> Self {
        Self {
            kind: RouterType::Generelt,
            logic: String::new(),
        }
    }
}

/// State carried through one retrieval-graph invocation.
///
/// After an invoke, `router` holds the classification and `messages`
/// ends with the assistant's answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentState {
    pub messages: Vec<Message>,
    #[serde(default)]
    pub router: Router,
    /// Research plan steps, filled in for legal questions
    #[serde(default)]
    pub steps: Vec<String>,
    /// Documents gathered during research
    #[serde(default)]
    pub documents: Vec<Document>,
}

impl AgentState {
    /// Start a conversation from a single user message.
    pub fn from_user_message(content: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(content)],
            ..Self::default()
        }
    }

    /// Content of the last message, if any.
    pub fn last_content(&self) -> Option<&str> {
        self.messages.last().map(|m| m.content.as_str())
    }
}

/// State for the indexing pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexState {
    pub docs: Vec<Document>,
}
