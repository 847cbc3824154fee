//! lov-ai-graph: retrieval-augmented QA over Norwegian statute text
//!
//! A router classifies each incoming message as general conversation
//! (`generelt`), a legal question (`lovspørsmål`) or too vague
//! (`mer-info`). Legal questions go through a research loop that
//! generates vector-search queries and retrieves statute text from a
//! Pinecone or Elasticsearch index before the response model answers.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lov_ai_graph::{AgentState, GraphConfig, RetrievalGraph};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let graph = RetrievalGraph::new(GraphConfig::default())?;
//! let state = AgentState::from_user_message(
//!     "Hva sier offentlighetsloven om unntak fra offentlighet?",
//! );
//! let result = graph.invoke(state).await?;
//! println!("{}: {}", result.router.kind, result.last_content().unwrap_or(""));
//! # Ok(())
//! # }
//! ```

pub mod chat;
pub mod config;
pub mod graph;
pub mod prompts;
pub mod state;

pub use chat::ChatModel;
pub use config::GraphConfig;
pub use graph::{IndexGraph, RetrievalGraph, format_docs};
pub use state::{AgentState, IndexState, Message, Role, Router, RouterType};
