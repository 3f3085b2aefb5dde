//! Playback Command Handlers

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::commands::playback_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::SessionManagerPort;
use crate::domain::chunking::ChunkStatus;
use crate::infrastructure::events::{EventPublisher, HighlightSource};
use crate::infrastructure::worker::ChunkJob;

/// PrefetchChunks Handler - 提交预取任务
pub struct PrefetchChunksHandler {
    session_manager: Arc<dyn SessionManagerPort>,
    queue_sender: mpsc::Sender<ChunkJob>,
}

impl PrefetchChunksHandler {
    pub fn new(
        session_manager: Arc<dyn SessionManagerPort>,
        queue_sender: mpsc::Sender<ChunkJob>,
    ) -> Self {
        Self {
            session_manager,
            queue_sender,
        }
    }

    pub async fn handle(
        &self,
        cmd: PrefetchChunksCommand,
    ) -> Result<PrefetchChunksResponse, ApplicationError> {
        let handle = self.session_manager.get(&cmd.session_id)?;
        let mut queued = Vec::new();
        let mut skipped = Vec::new();

        {
            let session = handle.lock().await;
            let chunk_ids: Vec<u32> = if cmd.chunk_ids.is_empty() {
                session.chunks().iter().map(|c| c.id()).collect()
            } else {
                cmd.chunk_ids.clone()
            };

            for chunk_id in chunk_ids {
                let chunk = session.chunk(chunk_id).ok_or_else(|| {
                    ApplicationError::validation(format!("Invalid chunk id: {}", chunk_id))
                })?;
                if matches!(chunk.status(), ChunkStatus::Ready | ChunkStatus::Loading) {
                    skipped.push(chunk_id);
                    continue;
                }

                let job = ChunkJob {
                    session_id: cmd.session_id.clone(),
                    chunk_id,
                };
                // 发送到队列
                match self.queue_sender.try_send(job) {
                    Ok(()) => queued.push(chunk_id),
                    Err(e) => {
                        tracing::warn!(chunk_id = chunk_id, error = %e, "Failed to enqueue chunk");
                        skipped.push(chunk_id);
                    }
                }
            }
        }
        self.session_manager.touch(&cmd.session_id);

        tracing::info!(
            session_id = %cmd.session_id,
            queued = queued.len(),
            skipped = skipped.len(),
            "Chunks submitted for prefetch"
        );

        Ok(PrefetchChunksResponse {
            session_id: cmd.session_id,
            queued,
            skipped,
        })
    }
}

/// StartPlayback Handler - 进入播放模式并写入块的单词计时
pub struct StartPlaybackHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl StartPlaybackHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub async fn handle(
        &self,
        cmd: StartPlaybackCommand,
    ) -> Result<StartPlaybackResponse, ApplicationError> {
        let handle = self.session_manager.get(&cmd.session_id)?;
        let mut session = handle.lock().await;

        let timed_words = session.start_playback(cmd.chunk_id)?;
        let audio = session
            .chunk(cmd.chunk_id)
            .and_then(|c| c.audio())
            .cloned()
            .ok_or_else(|| ApplicationError::invalid_state("Ready chunk without audio"))?;
        drop(session);
        self.session_manager.touch(&cmd.session_id);

        tracing::info!(
            session_id = %cmd.session_id,
            chunk_id = cmd.chunk_id,
            timed_words = timed_words,
            "Playback started"
        );

        Ok(StartPlaybackResponse {
            session_id: cmd.session_id,
            chunk_id: cmd.chunk_id,
            audio_key: audio.key().to_string(),
            duration_secs: audio.duration_secs(),
            timed_words,
        })
    }
}

/// UpdatePlaybackPosition Handler - 播放时间 -> 高亮
pub struct UpdatePlaybackPositionHandler {
    session_manager: Arc<dyn SessionManagerPort>,
    event_publisher: Arc<EventPublisher>,
}

impl UpdatePlaybackPositionHandler {
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
        cmd: UpdatePlaybackPositionCommand,
    ) -> Result<UpdatePlaybackPositionResponse, ApplicationError> {
        let handle = self.session_manager.get(&cmd.session_id)?;
        let highlight = handle.lock().await.playback_position(cmd.time_seconds)?;

        if let (true, Some(word_index)) = (highlight.changed, highlight.word_index) {
            self.event_publisher
                .publish_highlight(&cmd.session_id, word_index, HighlightSource::Playback);
        }

        Ok(UpdatePlaybackPositionResponse {
            session_id: cmd.session_id,
            highlight,
        })
    }
}

/// Seek Handler - 跳转到句子
pub struct SeekHandler {
    session_manager: Arc<dyn SessionManagerPort>,
    event_publisher: Arc<EventPublisher>,
}

impl SeekHandler {
    pub fn new(
        session_manager: Arc<dyn SessionManagerPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            session_manager,
            event_publisher,
        }
    }

    pub async fn handle(&self, cmd: SeekCommand) -> Result<SeekResponse, ApplicationError> {
        let handle = self.session_manager.get(&cmd.session_id)?;
        let (target, word_index) = {
            let mut session = handle.lock().await;
            let target = session.seek(cmd.sentence_index)?;
            (target, session.highlighted_word())
        };
        self.session_manager.touch(&cmd.session_id);

        if let Some(word_index) = word_index {
            self.event_publisher
                .publish_highlight(&cmd.session_id, word_index, HighlightSource::Seek);
        }

        tracing::info!(
            session_id = %cmd.session_id,
            sentence_index = cmd.sentence_index,
            chunk_id = target.chunk_id,
            time_seconds = target.time_seconds,
            "Session seeked"
        );

        Ok(SeekResponse {
            session_id: cmd.session_id,
            chunk_id: target.chunk_id,
            time_seconds: target.time_seconds,
            word_index,
        })
    }
}
