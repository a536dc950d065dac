//! The [`ChatCompleter`] and [`Embedder`] capabilities.

use docsync_core::{Backend, Config};

use crate::error::LlmError;
use crate::http::{AzureClient, OpenAiClient};
use crate::message::{FunctionSpec, Message};

/// Maps an ordered list of messages to the model's reply.
///
/// Implementations send every request at temperature 0.
pub trait ChatCompleter {
    /// Short backend label used in logs and errors.
    fn backend(&self) -> &str;

    /// Free-text completion.
    fn complete(&self, messages: &[Message]) -> Result<String, LlmError>;

    /// Force a call to `function` and return its raw JSON arguments.
    fn complete_with_function(
        &self,
        _messages: &[Message],
        _function: &FunctionSpec,
    ) -> Result<String, LlmError> {
        Err(LlmError::Unsupported {
            backend: self.backend().to_string(),
            feature: "function calling",
        })
    }
}

/// Turns texts into embedding vectors, one per input, in input order.
pub trait Embedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError>;
}

/// The completer and embedder for the configured backend.
pub struct Clients {
    pub completer: Box<dyn ChatCompleter>,
    pub embedder: Box<dyn Embedder>,
}

/// Pick the backend implementation named by `config`.
pub fn clients_for(config: &Config) -> Clients {
    match (config.backend, config.credentials.azure.as_ref()) {
        (Backend::Azure, Some(gateway)) => {
            let client = AzureClient::new(
                &config.credentials.api_key,
                gateway,
                &config.model,
                &config.embedding_model,
            );
            Clients {
                completer: Box::new(client.clone()),
                embedder: Box::new(client),
            }
        }
        _ => {
            let client = OpenAiClient::new(
                &config.credentials.api_key,
                config.credentials.api_base.as_deref(),
                &config.model,
                &config.embedding_model,
            );
            Clients {
                completer: Box::new(client.clone()),
                embedder: Box::new(client),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use docsync_core::{
        AzureGateway, Credentials, Overrides, SelectionStrategy, UpdateFormat, WritePolicy,
    };

    struct TextOnly;

    impl ChatCompleter for TextOnly {
        fn backend(&self) -> &str {
            "stub"
        }

        fn complete(&self, _messages: &[Message]) -> Result<String, LlmError> {
            Ok("ok".to_string())
        }
    }

    fn config(backend: Backend) -> Config {
        Config {
            repo: PathBuf::from("/repo"),
            docs_dir: PathBuf::from("docs"),
            backend,
            model: "gpt-test".to_string(),
            embedding_model: "embed-test".to_string(),
            selection: SelectionStrategy::Full,
            top_k: 1,
            update_format: UpdateFormat::Text,
            write_policy: WritePolicy::Confirm,
            exclude_doc_changes: true,
            template_dir: None,
            revisions: Overrides::default().revisions,
            debug: false,
            dry_run: false,
            credentials: Credentials {
                api_key: "k".to_string(),
                api_base: None,
                azure: (backend == Backend::Azure).then(|| AzureGateway {
                    api_version: "2024-02-01".to_string(),
                    resource_name: "contoso".to_string(),
                }),
            },
        }
    }

    #[test]
    fn default_function_calling_is_unsupported() {
        let spec = FunctionSpec {
            name: "f".to_string(),
            description: String::new(),
            parameters: serde_json::json!({"type": "object"}),
        };
        let err = TextOnly
            .complete_with_function(&[Message::user("hi")], &spec)
            .unwrap_err();
        assert!(matches!(err, LlmError::Unsupported { .. }));
        assert!(err.to_string().contains("stub backend"));
    }

    #[test]
    fn backend_selection_follows_config() {
        assert_eq!(clients_for(&config(Backend::OpenAi)).completer.backend(), "openai");
        assert_eq!(clients_for(&config(Backend::Azure)).completer.backend(), "azure");
    }
}
