//! Mock generation provider.
//!
//! Deterministic offline client used when no real provider is configured,
//! and by tests. When the prompt carries documentation excerpts it answers
//! with the first excerpt verbatim, so downstream citation binding behaves
//! exactly as it would with a well-grounded model. Otherwise it falls back
//! to a small set of canned demo responses.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use docschat_core::AppResult;

/// Canned (keyword, response) pairs for prompts without excerpts.
const CANNED_RESPONSES: &[(&str, &str)] = &[
    (
        "langchain",
        "LangChain is a framework for developing applications powered by \
         language models, with integrations for retrieval, chains, and agents.",
    ),
    (
        "chroma",
        "Chroma is an open-source vector database commonly used as the \
         retrieval backend in RAG applications.",
    ),
    (
        "embedding",
        "Embeddings map text to dense vectors so that semantically similar \
         passages end up close together in vector space.",
    ),
];

const DEFAULT_RESPONSE: &str =
    "I am running in demo mode with mock responses. Configure a provider and \
     API key to enable live answers.";

/// Mock generation client.
#[derive(Debug, Default)]
pub struct MockClient;

impl MockClient {
    /// Create a new mock client.
    pub fn new() -> Self {
        Self
    }

    /// Extract the body of the first documentation excerpt, if the prompt
    /// contains any. Excerpts look like `[Source N: id]\n{text}` and are
    /// separated by `---` dividers.
    fn first_excerpt(prompt: &str) -> Option<String> {
        let header_start = prompt.find("[Source ")?;
        let rest = &prompt[header_start..];
        let body_start = rest.find("]\n")? + 2;
        let body = &rest[body_start..];

        let body = match body.find("\n\n---") {
            Some(end) => &body[..end],
            None => body,
        };

        let body = body.trim();
        if body.is_empty() {
            None
        } else {
            Some(body.to_string())
        }
    }

    fn respond(&self, request: &LlmRequest) -> String {
        if let Some(excerpt) = Self::first_excerpt(&request.prompt) {
            return excerpt;
        }

        let lower = request.prompt.to_lowercase();
        for (keyword, response) in CANNED_RESPONSES {
            if lower.contains(keyword) {
                return (*response).to_string();
            }
        }

        DEFAULT_RESPONSE.to_string()
    }
}

#[async_trait::async_trait]
impl LlmClient for MockClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!("Mock completion for model '{}'", request.model);

        let content = self.respond(request);
        let usage = LlmUsage::new(
            request.prompt.split_whitespace().count() as u32,
            content.split_whitespace().count() as u32,
        );

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_answers_from_excerpt() {
        let client = MockClient::new();
        let prompt = "Question:\nHow do I initialize a Chroma vector store?\n\n\
                      Documentation excerpts:\n\
                      [Source 1: docs/chroma_init.md]\n\
                      Call chromadb.Client() to initialize a Chroma vector store.\n\n\
                      ---\n\n\
                      [Source 2: docs/other.md]\nUnrelated text.";

        let request = LlmRequest::new(prompt, "mock-model");
        let response = client.complete(&request).await.unwrap();

        assert_eq!(
            response.content,
            "Call chromadb.Client() to initialize a Chroma vector store."
        );
    }

    #[tokio::test]
    async fn test_mock_canned_response() {
        let client = MockClient::new();
        let request = LlmRequest::new("Tell me about LangChain", "mock-model");
        let response = client.complete(&request).await.unwrap();

        assert!(response.content.contains("framework"));
    }

    #[tokio::test]
    async fn test_mock_default_response() {
        let client = MockClient::new();
        let request = LlmRequest::new("Something entirely unrelated", "mock-model");
        let response = client.complete(&request).await.unwrap();

        assert!(response.content.contains("demo mode"));
    }

    #[tokio::test]
    async fn test_mock_deterministic() {
        let client = MockClient::new();
        let request = LlmRequest::new("Tell me about embeddings", "mock-model");

        let first = client.complete(&request).await.unwrap();
        let second = client.complete(&request).await.unwrap();
        assert_eq!(first.content, second.content);
    }
}
