//! Session Command Handlers

use std::sync::Arc;

use crate::application::commands::session_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::SessionManagerPort;
use crate::domain::session::{ReadingSession, SessionSettings};
use crate::infrastructure::events::EventPublisher;

/// OpenSession Handler - 分段、分块并注册会话
pub struct OpenSessionHandler {
    session_manager: Arc<dyn SessionManagerPort>,
    settings: SessionSettings,
}

impl OpenSessionHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>, settings: SessionSettings) -> Self {
        Self {
            session_manager,
            settings,
        }
    }

    pub async fn handle(
        &self,
        cmd: OpenSessionCommand,
    ) -> Result<OpenSessionResponse, ApplicationError> {
        let session = ReadingSession::open(&cmd.text, &self.settings);
        let sentence_count = session.document().sentence_count();
        let word_count = session.document().word_count();
        let chunk_count = session.chunks().len();

        let session_id = self.session_manager.create(session)?;

        tracing::info!(
            session_id = %session_id,
            text_len = cmd.text.len(),
            sentences = sentence_count,
            chunks = chunk_count,
            "Reading session created"
        );

        Ok(OpenSessionResponse {
            session_id,
            sentence_count,
            word_count,
            chunk_count,
        })
    }
}

/// StopReading Handler - 停止播放/听写
pub struct StopReadingHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl StopReadingHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub async fn handle(
        &self,
        cmd: StopReadingCommand,
    ) -> Result<StopReadingResponse, ApplicationError> {
        let handle = self.session_manager.get(&cmd.session_id)?;
        let mode = {
            let mut session = handle.lock().await;
            session.stop();
            session.mode()
        };
        self.session_manager.touch(&cmd.session_id);

        tracing::info!(session_id = %cmd.session_id, "Reading stopped");
        Ok(StopReadingResponse {
            session_id: cmd.session_id,
            mode,
        })
    }
}

/// CloseSession Handler - 关闭会话
pub struct CloseSessionHandler {
    session_manager: Arc<dyn SessionManagerPort>,
    event_publisher: Arc<EventPublisher>,
}

impl CloseSessionHandler {
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
        cmd: CloseSessionCommand,
    ) -> Result<CloseSessionResponse, ApplicationError> {
        // 关闭会话（进行中的预取在合成后会发现会话已失效）
        self.session_manager.close(&cmd.session_id)?;
        release_channel(&self.event_publisher, &cmd.session_id, "client_close");

        tracing::info!(session_id = %cmd.session_id, "Session closed");

        Ok(CloseSessionResponse {
            session_id: cmd.session_id,
        })
    }
}

/// ExpireIdleSessions Handler - 关闭空闲超时的会话
pub struct ExpireIdleSessionsHandler {
    session_manager: Arc<dyn SessionManagerPort>,
    event_publisher: Arc<EventPublisher>,
}

impl ExpireIdleSessionsHandler {
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
        cmd: ExpireIdleSessionsCommand,
    ) -> Result<ExpireIdleSessionsResponse, ApplicationError> {
        let mut expired = Vec::new();
        for session_id in self.session_manager.get_expired_sessions(cmd.idle_timeout_secs) {
            // 扫描和关闭之间可能已被客户端关闭
            if self.session_manager.close(&session_id).is_err() {
                continue;
            }
            release_channel(&self.event_publisher, &session_id, "idle_timeout");
            tracing::info!(session_id = %session_id, "Idle session expired");
            expired.push(session_id);
        }

        Ok(ExpireIdleSessionsResponse { expired })
    }
}

/// 发布关闭事件并取消注册事件通道
fn release_channel(event_publisher: &EventPublisher, session_id: &str, reason: &str) {
    event_publisher.publish_session_closed(session_id, reason);
    event_publisher.unregister_session(session_id);
}
