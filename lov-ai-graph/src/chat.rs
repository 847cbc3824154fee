//! OpenAI-compatible chat-completions client.
//!
//! Two entry points: [`ChatModel::complete`] for plain text answers and
//! [`ChatModel::complete_structured`] for JSON-schema constrained
//! output (router decisions, research plans).

use crate::state::Message;
use anyhow::{Context, Result, bail};
use lov_ai_embed::{ModelSpec, OPENAI_API_KEY_ENV};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

/// A configured chat model.
#[derive(Clone)]
pub struct ChatModel {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for ChatModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatModel")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl ChatModel {
    /// Build a model from a `provider/model` spec string.
    ///
    /// `api_key` may be supplied directly; otherwise `OPENAI_API_KEY`
    /// is read from the environment.
    pub fn for_spec(spec: &str, api_base: &str, api_key: Option<&str>) -> Result<Self> {
        let model_spec = ModelSpec::parse(spec)?;
        if model_spec.provider != "openai" {
            bail!(
                "Unsupported chat model provider '{}' in spec '{spec}'",
                model_spec.provider
            );
        }

        let api_key = match api_key {
            Some(key) => key.to_string(),
            None => std::env::var(OPENAI_API_KEY_ENV)
                .with_context(|| format!("{OPENAI_API_KEY_ENV} is not set"))?,
        };

        Ok(Self {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
            model: model_spec.model,
        })
    }

    async fn request(&self, body: Value) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_base);

        tracing::debug!(url = %url, model = %self.model, "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("chat completion request failed")?;

        let status = response.status();
        let text = response
            .text()
            .await
            .context("failed to read chat completion body")?;
        if !status.is_success() {
            bail!("chat completion returned {status}: {text}");
        }

        let parsed: Value =
            serde_json::from_str(&text).context("chat completion body was not valid JSON")?;
        let content = parsed["choices"][0]["message"]["content"]
            .as_str()
            .with_context(|| format!("chat completion had no message content: {text}"))?;
        Ok(content.to_string())
    }

    fn messages_to_json(messages: &[Message]) -> Vec<Value> {
        messages
            .iter()
            .map(|m| json!({"role": m.role, "content": m.content}))
            .collect()
    }

    /// Plain text completion.
    pub async fn complete(&self, messages: &[Message]) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": Self::messages_to_json(messages),
            "temperature": 0.0,
        });
        self.request(body).await
    }

    /// Completion constrained to a JSON schema, deserialized into `T`.
    pub async fn complete_structured<T: DeserializeOwned>(
        &self,
        messages: &[Message],
        schema_name: &str,
        schema: Value,
    ) -> Result<T> {
        let body = json!({
            "model": self.model,
            "messages": Self::messages_to_json(messages),
            "temperature": 0.0,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": schema_name,
                    "strict": true,
                    "schema": schema,
                }
            },
        });

        let content = self.request(body).await?;
        serde_json::from_str(&content).with_context(|| {
            format!("structured output for '{schema_name}' did not match schema: {content}")
        })
    }
}
