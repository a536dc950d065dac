//! HTTP completers for the OpenAI API and the Azure OpenAI gateway.
//!
//! | Backend | Chat endpoint                                                                   | Auth header            |
//! |---------|---------------------------------------------------------------------------------|------------------------|
//! | OpenAI  | `{base}/chat/completions`                                                       | `Authorization: Bearer`|
//! | Azure   | `https://{resource}.openai.azure.com/openai/deployments/{model}/chat/completions?api-version={v}` | `api-key` |
//!
//! Both clients are synchronous and make exactly one request per call; there
//! is no retry. Timeouts are whatever the transport defaults to.

use std::fmt;

use serde::Serialize;

use docsync_core::AzureGateway;

use crate::completer::{ChatCompleter, Embedder};
use crate::error::{excerpt, LlmError};
use crate::message::{FunctionSpec, Message};
use crate::wire::{self, ChatRequest, EmbeddingRequest};

pub const OPENAI_DEFAULT_BASE: &str = "https://api.openai.com/v1";

fn agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .user_agent(concat!("docsync/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// POST a JSON body and return the response text.
fn post_json<T: Serialize>(
    agent: &ureq::Agent,
    url: &str,
    auth: (&str, &str),
    body: &T,
) -> Result<String, LlmError> {
    tracing::debug!("POST {url}");
    let response = agent
        .post(url)
        .set(auth.0, auth.1)
        .set("Content-Type", "application/json")
        .send_json(body);

    match response {
        Ok(resp) => resp.into_string().map_err(|e| LlmError::Transport {
            endpoint: url.to_string(),
            message: format!("failed to read response body: {e}"),
        }),
        Err(ureq::Error::Status(status, resp)) => {
            let body = resp.into_string().unwrap_or_default();
            Err(LlmError::Status {
                status,
                endpoint: url.to_string(),
                body: excerpt(body.trim(), 500),
            })
        }
        Err(ureq::Error::Transport(transport)) => Err(LlmError::Transport {
            endpoint: url.to_string(),
            message: transport.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// OpenAI
// ---------------------------------------------------------------------------

/// Direct OpenAI API client.
#[derive(Clone)]
pub struct OpenAiClient {
    agent: ureq::Agent,
    api_key: String,
    base_url: String,
    model: String,
    embedding_model: String,
}

impl fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("embedding_model", &self.embedding_model)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    pub fn new(
        api_key: &str,
        base_url: Option<&str>,
        model: &str,
        embedding_model: &str,
    ) -> Self {
        Self {
            agent: agent(),
            api_key: api_key.to_string(),
            base_url: base_url
                .unwrap_or(OPENAI_DEFAULT_BASE)
                .trim_end_matches('/')
                .to_string(),
            model: model.to_string(),
            embedding_model: embedding_model.to_string(),
        }
    }

    pub fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    pub fn embeddings_url(&self) -> String {
        format!("{}/embeddings", self.base_url)
    }

    fn post<T: Serialize>(&self, url: &str, body: &T) -> Result<String, LlmError> {
        let bearer = format!("Bearer {}", self.api_key);
        post_json(&self.agent, url, ("Authorization", &bearer), body)
    }
}

impl ChatCompleter for OpenAiClient {
    fn backend(&self) -> &str {
        "openai"
    }

    fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        let request = ChatRequest::text(Some(&self.model), messages);
        let body = self.post(&self.chat_url(), &request)?;
        wire::first_text(&body)
    }

    fn complete_with_function(
        &self,
        messages: &[Message],
        function: &FunctionSpec,
    ) -> Result<String, LlmError> {
        let request = ChatRequest::forced_function(Some(&self.model), messages, function);
        let body = self.post(&self.chat_url(), &request)?;
        wire::function_arguments(&body, &function.name)
    }
}

impl Embedder for OpenAiClient {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        let request = EmbeddingRequest {
            model: Some(&self.embedding_model),
            input: texts,
        };
        let body = self.post(&self.embeddings_url(), &request)?;
        wire::embeddings(&body, texts.len())
    }
}

// ---------------------------------------------------------------------------
// Azure
// ---------------------------------------------------------------------------

/// Azure OpenAI gateway client. Models are addressed by deployment name.
#[derive(Clone)]
pub struct AzureClient {
    agent: ureq::Agent,
    api_key: String,
    resource_name: String,
    api_version: String,
    deployment: String,
    embedding_deployment: String,
}

impl fmt::Debug for AzureClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureClient")
            .field("resource_name", &self.resource_name)
            .field("api_version", &self.api_version)
            .field("deployment", &self.deployment)
            .finish_non_exhaustive()
    }
}

impl AzureClient {
    pub fn new(
        api_key: &str,
        gateway: &AzureGateway,
        deployment: &str,
        embedding_deployment: &str,
    ) -> Self {
        Self {
            agent: agent(),
            api_key: api_key.to_string(),
            resource_name: gateway.resource_name.clone(),
            api_version: gateway.api_version.clone(),
            deployment: deployment.to_string(),
            embedding_deployment: embedding_deployment.to_string(),
        }
    }

    fn deployment_url(&self, deployment: &str, operation: &str) -> String {
        format!(
            "https://{}.openai.azure.com/openai/deployments/{}/{}?api-version={}",
            self.resource_name, deployment, operation, self.api_version
        )
    }

    pub fn chat_url(&self) -> String {
        self.deployment_url(&self.deployment, "chat/completions")
    }

    pub fn embeddings_url(&self) -> String {
        self.deployment_url(&self.embedding_deployment, "embeddings")
    }

    fn post<T: Serialize>(&self, url: &str, body: &T) -> Result<String, LlmError> {
        post_json(&self.agent, url, ("api-key", &self.api_key), body)
    }
}

impl ChatCompleter for AzureClient {
    fn backend(&self) -> &str {
        "azure"
    }

    fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        let body = self.post(&self.chat_url(), &ChatRequest::text(None, messages))?;
        wire::first_text(&body)
    }

    fn complete_with_function(
        &self,
        messages: &[Message],
        function: &FunctionSpec,
    ) -> Result<String, LlmError> {
        let request = ChatRequest::forced_function(None, messages, function);
        let body = self.post(&self.chat_url(), &request)?;
        wire::function_arguments(&body, &function.name)
    }
}

impl Embedder for AzureClient {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        let request = EmbeddingRequest {
            model: None,
            input: texts,
        };
        let body = self.post(&self.embeddings_url(), &request)?;
        wire::embeddings(&body, texts.len())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
