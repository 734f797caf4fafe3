//! Answer assembly.
//!
//! Merges the normalized query, retrieved chunks, and generated text into
//! the final [`Answer`], invoking the citation binder before returning.
//!
//! Fixed policy for empty retrieval: when no chunk survives the relevance
//! filter the pipeline short-circuits with `EmptyRetrieval`; the generator
//! is never called, so an uncited answer can never be fabricated.

use std::sync::Arc;

use docschat_core::{AppConfig, AppError, AppResult};
use docschat_llm::{LlmClient, LlmRequest};

use crate::citation::{BinderOptions, CitationBinder, UnsupportedClaimPolicy};
use crate::normalize::{NormalizerOptions, QueryNormalizer, SynonymTable};
use crate::retrieve::{RetrievedChunk, Retriever};
use crate::safety;
use crate::segment::segment_answer;
use crate::types::{Answer, ChatTurn, SourceRef};

/// Maximum snippet length for source references.
const MAX_SNIPPET_LENGTH: usize = 150;

/// How many past exchanges are folded into the prompt in chat mode.
const MAX_HISTORY_TURNS: usize = 8;

/// Assembles answers from retrieval and generation.
///
/// Constructed once per process from the immutable configuration; each
/// `answer` call is independent and stateless.
pub struct AnswerAssembler {
    normalizer: QueryNormalizer,
    binder: CitationBinder,
    retriever: Arc<dyn Retriever>,
    generator: Arc<dyn LlmClient>,
    model: String,
    top_k: usize,
    min_score: f32,
    denylist: Vec<String>,
    max_answer_chars: usize,
}

impl AnswerAssembler {
    /// Build an assembler from configuration plus the two collaborators.
    pub fn from_config(
        config: &AppConfig,
        retriever: Arc<dyn Retriever>,
        generator: Arc<dyn LlmClient>,
    ) -> AppResult<Self> {
        let policy = UnsupportedClaimPolicy::parse(&config.binder.on_unsupported)
            .ok_or_else(|| {
                AppError::Config(format!(
                    "Unknown unsupported-claim policy: {}",
                    config.binder.on_unsupported
                ))
            })?;

        let options = NormalizerOptions {
            case_fold: config.normalizer.case_fold,
            strip_punctuation: config.normalizer.strip_punctuation,
            synonym_expand: config.normalizer.synonym_expand,
        };
        let table = SynonymTable::builtin().with_extra(config.synonyms.clone());

        Ok(Self {
            normalizer: QueryNormalizer::new(options, table),
            binder: CitationBinder::new(BinderOptions {
                overlap_threshold: config.binder.overlap_threshold,
                policy,
            }),
            retriever,
            generator,
            model: config.model.clone(),
            top_k: config.retrieval.top_k,
            min_score: config.retrieval.min_score,
            denylist: config.safety.denylist.clone(),
            max_answer_chars: config.safety.max_answer_chars,
        })
    }

    /// Answer a single query.
    pub async fn answer(&self, query: &str) -> AppResult<Answer> {
        self.answer_with_history(query, &[]).await
    }

    /// Answer a query with conversation history folded into the prompt.
    /// The citation logic itself stays stateless per request.
    pub async fn answer_with_history(
        &self,
        query: &str,
        history: &[ChatTurn],
    ) -> AppResult<Answer> {
        safety::check_input(query, &self.denylist)?;

        let normalized = self.normalizer.normalize(query);
        tracing::info!("Answering query: {}", normalized.text);

        let chunks = self
            .retriever
            .retrieve(&normalized, self.top_k)
            .await?
            .into_iter()
            .filter(|chunk| chunk.score >= self.min_score)
            .collect::<Vec<_>>();

        if chunks.is_empty() {
            tracing::info!("No relevant chunks for query, short-circuiting");
            return Err(AppError::EmptyRetrieval {
                query: query.to_string(),
            });
        }

        tracing::debug!(
            "Retrieved {} chunks (top score {:.3})",
            chunks.len(),
            chunks.first().map(|c| c.score).unwrap_or(0.0)
        );

        let request = LlmRequest::new(build_user_prompt(query, &chunks, history), &self.model)
            .with_system(build_system_prompt())
            .with_temperature(0.3) // Lower temperature for factual answers
            .with_max_tokens(1000);

        let response = self.generator.complete(&request).await?;
        let generated = safety::truncate_text(&response.content, self.max_answer_chars);

        let segments = segment_answer(&generated);
        let bound = self.binder.bind(segments, &chunks)?;

        tracing::info!(
            "Answer bound: {} segments, fully_cited={}",
            bound.segments.len(),
            bound.fully_cited
        );

        let sources = collect_sources(&bound.segments, &chunks);

        Ok(Answer {
            query: query.to_string(),
            text: bound.text,
            segments: bound.segments,
            sources,
            fully_cited: bound.fully_cited,
            model: response.model,
        })
    }
}

/// Build the system prompt for grounded answering.
fn build_system_prompt() -> String {
    "You are a documentation assistant.\n\
     Instructions:\n\
     - Answer using only the documentation excerpts provided\n\
     - Keep wording close to the excerpts so statements stay traceable\n\
     - If the excerpts do not contain the answer, state: \"I could not find \
     this information in the available documentation.\"\n\
     - Keep your response concise and factual\n"
        .to_string()
}

/// Build the user prompt: optional history, the question, and the excerpts.
fn build_user_prompt(query: &str, chunks: &[RetrievedChunk], history: &[ChatTurn]) -> String {
    let mut prompt = String::new();

    if !history.is_empty() {
        prompt.push_str("Previous conversation:\n");
        let start = history.len().saturating_sub(MAX_HISTORY_TURNS);
        for turn in &history[start..] {
            prompt.push_str(&format!(
                "User: {}\nAssistant: {}\n",
                turn.user, turn.assistant
            ));
        }
        prompt.push('\n');
    }

    let context = chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("[Source {}: {}]\n{}", i + 1, chunk.id, chunk.text))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");

    prompt.push_str(&format!(
        "Question:\n{}\n\nDocumentation excerpts:\n{}",
        query, context
    ));

    prompt
}

/// Map cited chunks to deduplicated human-readable source references,
/// preserving retrieval order.
fn collect_sources(
    segments: &[crate::types::AnswerSegment],
    chunks: &[RetrievedChunk],
) -> Vec<SourceRef> {
    let cited: std::collections::HashSet<&str> = segments
        .iter()
        .flat_map(|s| s.citations.iter())
        .map(|c| c.chunk_id.as_str())
        .collect();

    chunks
        .iter()
        .filter(|chunk| cited.contains(chunk.id.as_str()))
        .map(|chunk| SourceRef {
            chunk_id: chunk.id.clone(),
            source_url: chunk.source_url.clone(),
            snippet: safety::truncate_text(&chunk.text, MAX_SNIPPET_LENGTH),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &str, text: &str) -> RetrievedChunk {
        RetrievedChunk {
            id: id.to_string(),
            text: text.to_string(),
            source_url: format!("https://example.com/{}", id),
            score: 0.8,
            section: None,
        }
    }

    #[test]
    fn test_build_user_prompt_contains_question_and_sources() {
        let chunks = vec![
            chunk("docs/a.md", "First excerpt"),
            chunk("docs/b.md", "Second excerpt"),
        ];

        let prompt = build_user_prompt("What is a vector store?", &chunks, &[]);

        assert!(prompt.contains("Question:\nWhat is a vector store?"));
        assert!(prompt.contains("[Source 1: docs/a.md]"));
        assert!(prompt.contains("[Source 2: docs/b.md]"));
        assert!(prompt.contains("---"));
    }

    #[test]
    fn test_build_user_prompt_folds_history() {
        let chunks = vec![chunk("docs/a.md", "Excerpt")];
        let history = vec![ChatTurn {
            user: "earlier question".to_string(),
            assistant: "earlier answer".to_string(),
        }];

        let prompt = build_user_prompt("follow-up", &chunks, &history);

        assert!(prompt.starts_with("Previous conversation:"));
        assert!(prompt.contains("earlier question"));
        assert!(prompt.contains("earlier answer"));
    }

    #[test]
    fn test_build_user_prompt_caps_history() {
        let chunks = vec![chunk("docs/a.md", "Excerpt")];
        let history: Vec<ChatTurn> = (0..20)
            .map(|i| ChatTurn {
                user: format!("question-{}", i),
                assistant: format!("answer-{}", i),
            })
            .collect();

        let prompt = build_user_prompt("follow-up", &chunks, &history);

        assert!(!prompt.contains("question-0"));
        assert!(prompt.contains("question-19"));
    }

    #[test]
    fn test_system_prompt_requests_grounding() {
        let prompt = build_system_prompt();
        assert!(prompt.contains("only the documentation excerpts"));
        assert!(prompt.contains("could not find"));
    }
}
