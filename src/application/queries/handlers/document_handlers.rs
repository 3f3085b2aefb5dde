//! Document Query Handlers

use serde::Serialize;
use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::SessionManagerPort;
use crate::application::queries::{GetChunks, GetDocument};
use crate::domain::chunking::Chunk;
use crate::domain::session::{ReadingMode, ReadingSession};
use crate::domain::timing::TimingFormat;

// ============================================================================
// Response DTOs
// ============================================================================

/// 单词视图
#[derive(Debug, Clone, Serialize)]
pub struct WordView {
    pub global_index: usize,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

/// 句子视图
#[derive(Debug, Clone, Serialize)]
pub struct SentenceView {
    pub index: usize,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    pub words: Vec<WordView>,
}

/// 文档视图
#[derive(Debug, Clone, Serialize)]
pub struct DocumentView {
    pub session_id: String,
    pub mode: ReadingMode,
    pub highlighted_word: Option<usize>,
    pub word_count: usize,
    pub timed_word_count: usize,
    pub sentences: Vec<SentenceView>,
}

impl From<&ReadingSession> for DocumentView {
    fn from(session: &ReadingSession) -> Self {
        let document = session.document();
        let mut global_index = 0;
        let sentences = document
            .sentences()
            .iter()
            .enumerate()
            .map(|(index, sentence)| SentenceView {
                index,
                text: sentence.text().to_string(),
                start: sentence.start(),
                end: sentence.end(),
                words: sentence
                    .words()
                    .iter()
                    .map(|word| {
                        let view = WordView {
                            global_index,
                            text: word.content().to_string(),
                            start: word.start(),
                            end: word.end(),
                            confidence: word.confidence(),
                        };
                        global_index += 1;
                        view
                    })
                    .collect(),
            })
            .collect();

        Self {
            session_id: session.id().to_string(),
            mode: session.mode(),
            highlighted_word: session.highlighted_word(),
            word_count: document.word_count(),
            timed_word_count: document.timed_word_count(),
            sentences,
        }
    }
}

/// 块视图
#[derive(Debug, Clone, Serialize)]
pub struct ChunkView {
    pub id: u32,
    pub text: String,
    pub first_sentence: usize,
    pub sentence_count: usize,
    pub start_word_index: usize,
    pub end_word_index: usize,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing_format: Option<TimingFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Chunk> for ChunkView {
    fn from(chunk: &Chunk) -> Self {
        let range = chunk.sentence_range();
        Self {
            id: chunk.id(),
            text: chunk.text().to_string(),
            first_sentence: range.start,
            sentence_count: range.len(),
            start_word_index: chunk.start_word_index(),
            end_word_index: chunk.end_word_index(),
            status: chunk.status().as_str().to_string(),
            audio_key: chunk.audio().map(|a| a.key().to_string()),
            duration_secs: chunk.audio().and_then(|a| a.duration_secs()),
            timing_format: chunk.timing().map(|t| t.format()),
            error: chunk.error().map(str::to_string),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GetDocument Handler
pub struct GetDocumentHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl GetDocumentHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub async fn handle(&self, query: GetDocument) -> Result<DocumentView, ApplicationError> {
        let handle = self.session_manager.get(&query.session_id)?;
        let session = handle.lock().await;
        Ok(DocumentView::from(&*session))
    }
}

/// GetChunks Handler
pub struct GetChunksHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl GetChunksHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub async fn handle(&self, query: GetChunks) -> Result<Vec<ChunkView>, ApplicationError> {
        let handle = self.session_manager.get(&query.session_id)?;
        let session = handle.lock().await;
        Ok(session.chunks().iter().map(ChunkView::from).collect())
    }
}
