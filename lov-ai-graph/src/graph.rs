//! The retrieval graph and the index graph.
//!
//! `RetrievalGraph::invoke` drives one question through routing,
//! research and response. `IndexGraph::invoke` loads documents into the
//! vector index the retrieval graph reads from.

use crate::chat::ChatModel;
use crate::config::GraphConfig;
use crate::prompts;
use crate::state::{AgentState, IndexState, Message, Router, RouterType};
use anyhow::{Context, Result, ensure};
use futures::future::try_join_all;
use lov_ai_embed::{EmbedConfig, make_text_encoder_with_config, make_text_encoder_with_key};
use lov_ai_retrieval::{Document, RetrieverHandle, dedupe_by_id, make_retriever_with_encoder};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
struct ResearchPlan {
    steps: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GeneratedQueries {
    queries: Vec<String>,
}

fn router_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "type": {
                "type": "string",
                "enum": ["generelt", "lovspørsmål", "mer-info"]
            },
            "logic": {"type": "string"}
        },
        "required": ["type", "logic"],
        "additionalProperties": false
    })
}

fn research_plan_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "steps": {"type": "array", "items": {"type": "string"}}
        },
        "required": ["steps"],
        "additionalProperties": false
    })
}

fn generated_queries_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "queries": {"type": "array", "items": {"type": "string"}}
        },
        "required": ["queries"],
        "additionalProperties": false
    })
}

/// Render retrieved documents as numbered context blocks for the
/// response prompt.
pub fn format_docs(docs: &[Document]) -> String {
    if docs.is_empty() {
        return "(ingen dokumenter funnet)".to_string();
    }
    docs.iter()
        .enumerate()
        .map(|(i, doc)| {
            let source = doc
                .metadata
                .get("kilde")
                .or_else(|| doc.metadata.get("source"))
                .and_then(|v| v.as_str())
                .map(|s| format!(" (kilde: {s})"))
                .unwrap_or_default();
            format!("[{}]{source}\n{}", i + 1, doc.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Connect the retriever configured by `config`, with the embedding
/// encoder pointed at the same API base as the chat models.
///
/// The encoder goes through the embed crate's provider dispatch, so an
/// unsupported embedding provider fails here rather than being sent to
/// the wrong backend.
fn connect_retriever(config: &GraphConfig) -> Result<RetrieverHandle> {
    let embed_config =
        EmbedConfig::from_spec(&config.embedding_model)?.with_api_base(config.api_base.clone());
    let encoder = match &config.api_key {
        Some(key) => make_text_encoder_with_key(embed_config, key)?,
        None => make_text_encoder_with_config(embed_config)?,
    };
    make_retriever_with_encoder(&config.retrieval_config(), encoder)
}

/// The question-answering pipeline: route, research, respond.
pub struct RetrievalGraph {
    config: GraphConfig,
    query_model: ChatModel,
    response_model: ChatModel,
}

impl RetrievalGraph {
    pub fn new(config: GraphConfig) -> Result<Self> {
        let query_model = ChatModel::for_spec(
            &config.query_model,
            &config.api_base,
            config.api_key.as_deref(),
        )?;
        let response_model = ChatModel::for_spec(
            &config.response_model,
            &config.api_base,
            config.api_key.as_deref(),
        )?;
        Ok(Self {
            config,
            query_model,
            response_model,
        })
    }

    /// Run one conversation turn through the graph.
    ///
    /// On return, `router` holds the classification and `messages` ends
    /// with the assistant's answer.
    pub async fn invoke(&self, mut state: AgentState) -> Result<AgentState> {
        ensure!(
            !state.messages.is_empty(),
            "cannot route an empty conversation"
        );

        let router = self.analyze_and_route(&state).await?;
        tracing::info!(route = %router.kind, logic = %router.logic, "Classified query");
        state.router = router.clone();

        let answer = match router.kind {
            RouterType::Generelt => {
                self.respond_without_retrieval(&state, prompts::GENERAL_SYSTEM_PROMPT)
                    .await?
            }
            RouterType::MerInfo => {
                self.respond_without_retrieval(&state, prompts::MORE_INFO_SYSTEM_PROMPT)
                    .await?
            }
            RouterType::Lovsporsmal => {
                state.steps = self.create_research_plan(&state).await?;

                let mut gathered = Vec::new();
                {
                    // Scoped: the retriever connection is released
                    // before the response model runs.
                    let retriever = connect_retriever(&self.config)?;
                    for step in &state.steps {
                        let docs = self.conduct_research(&retriever, step).await?;
                        gathered.extend(docs);
                    }
                }
                state.documents = dedupe_by_id(gathered);
                tracing::info!(
                    documents = state.documents.len(),
                    steps = state.steps.len(),
                    "Research complete"
                );

                self.respond(&state).await?
            }
        };

        state.messages.push(Message::assistant(answer));
        Ok(state)
    }

    /// Classify the conversation into a [`Router`] decision.
    async fn analyze_and_route(&self, state: &AgentState) -> Result<Router> {
        let mut messages = vec![Message::system(prompts::ROUTER_SYSTEM_PROMPT)];
        messages.extend(state.messages.iter().cloned());
        self.query_model
            .complete_structured(&messages, "router", router_schema())
            .await
            .context("router classification failed")
    }

    /// Answer directly from the chat model, for the non-retrieval
    /// branches.
    async fn respond_without_retrieval(
        &self,
        state: &AgentState,
        template: &str,
    ) -> Result<String> {
        let system = prompts::with_logic(template, &state.router.logic);
        let mut messages = vec![Message::system(system)];
        messages.extend(state.messages.iter().cloned());
        self.response_model.complete(&messages).await
    }

    /// Break the question into research steps. Falls back to the raw
    /// question when the model returns an empty plan.
    async fn create_research_plan(&self, state: &AgentState) -> Result<Vec<String>> {
        let mut messages = vec![Message::system(prompts::RESEARCH_PLAN_SYSTEM_PROMPT)];
        messages.extend(state.messages.iter().cloned());

        let plan: ResearchPlan = self
            .query_model
            .complete_structured(&messages, "research_plan", research_plan_schema())
            .await
            .context("research planning failed")?;

        if plan.steps.is_empty() {
            tracing::warn!("Empty research plan, falling back to the question itself");
            return Ok(state
                .last_content()
                .map(|q| vec![q.to_string()])
                .unwrap_or_default());
        }
        Ok(plan.steps)
    }

    /// Research one step: generate search queries, run them against
    /// the index, and collect the documents.
    async fn conduct_research(
        &self,
        retriever: &RetrieverHandle,
        step: &str,
    ) -> Result<Vec<Document>> {
        let messages = vec![
            Message::system(prompts::GENERATE_QUERY_SYSTEM_PROMPT),
            Message::user(step),
        ];
        let generated: GeneratedQueries = self
            .query_model
            .complete_structured(&messages, "generated_queries", generated_queries_schema())
            .await
            .context("query generation failed")?;

        let queries = if generated.queries.is_empty() {
            vec![step.to_string()]
        } else {
            generated.queries
        };
        tracing::debug!(step, queries = queries.len(), "Running retrieval queries");

        let results = try_join_all(queries.iter().map(|q| retriever.retrieve(q))).await?;
        Ok(results.into_iter().flatten().collect())
    }

    /// Compose the final grounded answer from the gathered documents.
    async fn respond(&self, state: &AgentState) -> Result<String> {
        let context = format_docs(&state.documents);
        let system = prompts::with_context(prompts::RESPONSE_SYSTEM_PROMPT, &context);
        let mut messages = vec![Message::system(system)];
        messages.extend(state.messages.iter().cloned());
        self.response_model.complete(&messages).await
    }
}

/// The indexing pipeline: embed documents and load them into the
/// configured vector index.
pub struct IndexGraph {
    config: GraphConfig,
}

impl IndexGraph {
    pub fn new(config: GraphConfig) -> Self {
        Self { config }
    }

    /// Index `state.docs`, returning how many documents were written.
    /// An empty doc list never connects to the index.
    pub async fn invoke(&self, state: IndexState) -> Result<usize> {
        if state.docs.is_empty() {
            tracing::info!("No documents to index");
            return Ok(0);
        }

        let retriever = connect_retriever(&self.config)?;
        retriever
            .add_documents(&state.docs)
            .await
            .context("indexing documents failed")?;

        tracing::info!(
            count = state.docs.len(),
            provider = retriever.provider_name(),
            "Indexed documents"
        );
        Ok(state.docs.len())
    }
}
