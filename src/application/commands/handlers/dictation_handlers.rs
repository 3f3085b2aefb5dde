//! Dictation Command Handlers

use std::sync::Arc;

use crate::application::commands::dictation_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::SessionManagerPort;
use crate::infrastructure::events::{EventPublisher, HighlightSource};

/// StartDictation Handler - 进入听写模式，对齐器复位
pub struct StartDictationHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl StartDictationHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub async fn handle(
        &self,
        cmd: StartDictationCommand,
    ) -> Result<StartDictationResponse, ApplicationError> {
        let handle = self.session_manager.get(&cmd.session_id)?;
        handle.lock().await.start_dictation();
        self.session_manager.touch(&cmd.session_id);

        tracing::info!(session_id = %cmd.session_id, "Dictation started");
        Ok(StartDictationResponse {
            session_id: cmd.session_id,
        })
    }
}

/// IngestRecognition Handler - 对齐一批 STT 结果
///
/// 同一会话的批次经会话锁串行进入对齐器。
pub struct IngestRecognitionHandler {
    session_manager: Arc<dyn SessionManagerPort>,
    event_publisher: Arc<EventPublisher>,
}

impl IngestRecognitionHandler {
    pub fn new(
        session_manager: Arc<dyn SessionManagerPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            session_manager,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: IngestRecognitionCommand,
    ) -> Result<IngestRecognitionResponse, ApplicationError> {
        let handle = self.session_manager.get(&cmd.session_id)?;
        let (matched_word, highlighted_word, aligner_cursor) = {
            let mut session = handle.lock().await;
            let previous = session.highlighted_word();
            let matched = session.ingest_recognition(&cmd.words)?;
            if let Some(word_index) = matched.filter(|&w| Some(w) != previous) {
                self.event_publisher.publish_highlight(
                    &cmd.session_id,
                    word_index,
                    HighlightSource::Dictation,
                );
            }
            (matched, session.highlighted_word(), session.aligner_cursor())
        };
        self.session_manager.touch(&cmd.session_id);

        tracing::debug!(
            session_id = %cmd.session_id,
            batch = cmd.words.len(),
            matched = ?matched_word,
            cursor = aligner_cursor,
            "Recognition batch ingested"
        );

        Ok(IngestRecognitionResponse {
            session_id: cmd.session_id,
            matched_word,
            highlighted_word,
            aligner_cursor,
        })
    }
}
