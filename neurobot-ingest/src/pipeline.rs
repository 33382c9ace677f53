//! The training pipeline: input in, exactly one knowledge fragment out.
//!
//! Every ingest operation either fully persists one fragment or persists
//! nothing. The optional model rewrite step is best-effort: when the
//! backend fails the raw extracted text is stored instead, so training
//! never depends on the model being up.

use std::sync::Arc;

use neurobot_core::config::{BatchPolicy, GenerationParams, IngestConfig};
use neurobot_core::llm::{GenerationOptions, ModelBackend};
use neurobot_core::models::{KnowledgeFragment, SourceType};
use neurobot_core::store::{self, NewKnowledge};
use neurobot_core::NeurobotError;
use sqlx::SqlitePool;

use crate::extract::{detect_source_type, extract_file_text};
use crate::fetch::PageFetcher;

/// Fixed placeholder used in place of an empty knowledge base.
pub const NO_KNOWLEDGE_PLACEHOLDER: &str =
    "No specific knowledge has been provided. Answer generally and politely.";

const ORGANIZE_INSTRUCTION: &str = "Extract and organize the most important information in this \
     document. Keep the formatting clear and group by topic where appropriate.";

/// Fractional progress callback, 0–100. Purely a UX affordance; reporting
/// carries no correctness weight.
pub type Progress<'a> = &'a (dyn Fn(u8) + Send + Sync);

fn report(progress: Option<Progress<'_>>, pct: u8) {
    if let Some(f) = progress {
        f(pct);
    }
}

/// One file inside a multi-file upload.
#[derive(Debug, Clone)]
pub struct BatchFile {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Outcome of a multi-file upload under the configured batch policy.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub stored: Vec<i64>,
    pub failures: Vec<BatchFailure>,
    /// True when the fail-fast policy stopped the batch before the end.
    pub aborted: bool,
}

#[derive(Debug)]
pub struct BatchFailure {
    pub file_name: String,
    pub error: String,
}

/// The ingestion pipeline for one process. Constructed explicitly with its
/// collaborators — no module-level singletons.
pub struct TrainingPipeline {
    pool: SqlitePool,
    model: Arc<dyn ModelBackend>,
    fetcher: PageFetcher,
    config: IngestConfig,
    organize_options: GenerationOptions,
}

impl TrainingPipeline {
    pub fn new(
        pool: SqlitePool,
        model: Arc<dyn ModelBackend>,
        fetcher: PageFetcher,
        config: IngestConfig,
        organize: GenerationParams,
    ) -> Self {
        Self {
            pool,
            model,
            fetcher,
            config,
            organize_options: organize.into(),
        }
    }

    // ========================================================================
    // Ingest operations
    // ========================================================================

    /// Ingest one uploaded file. PDF media types go through PDF text
    /// extraction; everything else is read as UTF-8.
    pub async fn ingest_file(
        &self,
        bytes: &[u8],
        file_name: &str,
        media_type: &str,
        chatbot_id: i64,
        progress: Option<Progress<'_>>,
    ) -> Result<i64, NeurobotError> {
        report(progress, 10);
        let text = extract_file_text(bytes, file_name, media_type, self.config.min_text_chars)?;
        report(progress, 40);

        let content = self.organize_text(&text, file_name).await;
        report(progress, 80);

        let id = store::add_knowledge(
            &self.pool,
            NewKnowledge {
                chatbot_id,
                source_type: detect_source_type(file_name, media_type),
                content,
                file_name: file_name.to_string(),
            },
        )
        .await?;
        report(progress, 100);

        tracing::info!(chatbot_id, fragment_id = id, file = %file_name, "ingested file");
        Ok(id)
    }

    /// Ingest a multi-file upload under the configured batch policy.
    ///
    /// Always returns a report; per-file failures never poison fragments
    /// that were already committed.
    pub async fn ingest_files(
        &self,
        files: Vec<BatchFile>,
        chatbot_id: i64,
        progress: Option<Progress<'_>>,
    ) -> BatchReport {
        let total = files.len().max(1);
        let mut batch = BatchReport::default();

        for (index, file) in files.into_iter().enumerate() {
            let outcome = self
                .ingest_file(&file.bytes, &file.file_name, &file.media_type, chatbot_id, None)
                .await;
            report(progress, (((index + 1) * 100) / total) as u8);

            match outcome {
                Ok(id) => batch.stored.push(id),
                Err(e) => {
                    tracing::warn!(file = %file.file_name, error = %e, "file failed in batch");
                    batch.failures.push(BatchFailure {
                        file_name: file.file_name,
                        error: e.to_string(),
                    });
                    if self.config.batch_policy == BatchPolicy::FailFast {
                        batch.aborted = true;
                        break;
                    }
                }
            }
        }

        batch
    }

    /// Ingest the readable text of a web page, fetched through the
    /// content-fetch proxy.
    pub async fn ingest_url(
        &self,
        url: &str,
        chatbot_id: i64,
        progress: Option<Progress<'_>>,
    ) -> Result<i64, NeurobotError> {
        report(progress, 10);
        let text = self.fetcher.fetch_page_text(url).await?;
        report(progress, 50);

        let content = self.organize_text(&text, url).await;
        report(progress, 90);

        let id = store::add_knowledge(
            &self.pool,
            NewKnowledge {
                chatbot_id,
                source_type: SourceType::Url,
                content,
                file_name: url.to_string(),
            },
        )
        .await?;
        report(progress, 100);

        tracing::info!(chatbot_id, fragment_id = id, url = %url, "ingested url");
        Ok(id)
    }

    /// Store a question/answer pair verbatim. No model call.
    pub async fn ingest_faq(
        &self,
        question: &str,
        answer: &str,
        chatbot_id: i64,
    ) -> Result<i64, NeurobotError> {
        if question.trim().is_empty() {
            return Err(NeurobotError::Validation("FAQ question is empty".to_string()));
        }
        if answer.trim().is_empty() {
            return Err(NeurobotError::Validation("FAQ answer is empty".to_string()));
        }

        let content = format!(
            "FREQUENTLY ASKED QUESTION:\nQuestion: {}\nAnswer: {}\n\n\
             This is a frequently asked question and must be answered exactly \
             as specified above.",
            question, answer
        );

        let id = store::add_knowledge(
            &self.pool,
            NewKnowledge {
                chatbot_id,
                source_type: SourceType::Faq,
                content,
                file_name: format!("FAQ: {}", question),
            },
        )
        .await?;

        tracing::info!(chatbot_id, fragment_id = id, "ingested faq");
        Ok(id)
    }

    /// Store caller-supplied free text, rewritten by the model when it is
    /// available.
    pub async fn ingest_custom(&self, content: &str, chatbot_id: i64) -> Result<i64, NeurobotError> {
        if content.trim().is_empty() {
            return Err(NeurobotError::Validation("custom knowledge is empty".to_string()));
        }

        let processed = self.organize_text(content, "Custom knowledge").await;

        let id = store::add_knowledge(
            &self.pool,
            NewKnowledge {
                chatbot_id,
                source_type: SourceType::Custom,
                content: processed,
                file_name: "Custom knowledge".to_string(),
            },
        )
        .await?;

        tracing::info!(chatbot_id, fragment_id = id, "ingested custom knowledge");
        Ok(id)
    }

    // ========================================================================
    // Bookkeeping
    // ========================================================================

    pub async fn list_documents(
        &self,
        chatbot_id: i64,
    ) -> Result<Vec<KnowledgeFragment>, NeurobotError> {
        Ok(store::knowledge_by_chatbot(&self.pool, chatbot_id).await?)
    }

    /// Delete a fragment. Removing an absent id is a no-op.
    pub async fn remove_document(&self, id: i64) -> Result<(), NeurobotError> {
        let removed = store::delete_knowledge(&self.pool, id).await?;
        if removed {
            tracing::info!(fragment_id = id, "removed training document");
        }
        Ok(())
    }

    // ========================================================================
    // Knowledge assembly
    // ========================================================================

    /// Concatenate a bot's fragments into the labeled knowledge block that
    /// gets embedded verbatim into the system prompt.
    ///
    /// When the rendered text exceeds the configured character budget, the
    /// oldest fragments are dropped first; the newest fragment is always
    /// kept. Zero fragments yield the fixed placeholder.
    pub async fn assemble_knowledge(&self, chatbot_id: i64) -> Result<String, NeurobotError> {
        let fragments = store::knowledge_by_chatbot(&self.pool, chatbot_id).await?;
        if fragments.is_empty() {
            return Ok(NO_KNOWLEDGE_PLACEHOLDER.to_string());
        }

        let total = fragments.len();
        let blocks: Vec<String> = fragments
            .iter()
            .map(|f| {
                format!(
                    "=== DOCUMENT: {} ===\nTYPE: {}\nCONTENT:\n{}\n\n---",
                    f.file_name,
                    f.source_type.label(),
                    f.content
                )
            })
            .collect();

        // Budget from the newest end; the separator between blocks is two
        // newlines.
        let budget = self.config.max_knowledge_chars;
        let mut kept: Vec<&String> = Vec::new();
        let mut used = 0usize;
        for block in blocks.iter().rev() {
            let cost = block.chars().count() + if kept.is_empty() { 0 } else { 2 };
            if !kept.is_empty() && used + cost > budget {
                break;
            }
            used += cost;
            kept.push(block);
        }
        kept.reverse();

        if kept.len() < total {
            tracing::warn!(
                chatbot_id,
                kept = kept.len(),
                dropped = total - kept.len(),
                budget,
                "knowledge exceeds budget, dropping oldest fragments"
            );
        }

        Ok(kept
            .into_iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n\n"))
    }

    // ========================================================================
    // Model rewrite (best-effort)
    // ========================================================================

    /// Ask the backend to reorganize extracted text. On any failure the raw
    /// text is kept — ingestion never fails because the model is down.
    async fn organize_text(&self, content: &str, file_name: &str) -> String {
        let user = format!("Document: {}\n\nContent:\n{}", file_name, content);
        match self
            .model
            .complete(ORGANIZE_INSTRUCTION, &user, &self.organize_options)
            .await
        {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => content.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, document = %file_name, "model rewrite failed, keeping raw text");
                content.to_string()
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
