use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of input a fragment was ingested from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum SourceType {
    Pdf,
    Doc,
    Url,
    Faq,
    Custom,
}

impl SourceType {
    /// Upper-case label used in assembled knowledge blocks.
    pub fn label(&self) -> &'static str {
        match self {
            SourceType::Pdf => "PDF",
            SourceType::Doc => "DOC",
            SourceType::Url => "URL",
            SourceType::Faq => "FAQ",
            SourceType::Custom => "CUSTOM",
        }
    }
}

/// One unit of ingested material attached to a bot. Immutable once stored
/// except for deletion.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct KnowledgeFragment {
    pub id: i64,
    pub chatbot_id: i64,
    pub source_type: SourceType,
    pub content: String,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
}
