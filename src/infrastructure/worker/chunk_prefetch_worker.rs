//! Chunk Prefetch Worker - Background TTS Chunk Loader

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::ports::{SessionManagerPort, SpeechSynthesizerPort, SynthesisRequest};
use crate::domain::chunking::ChunkStatus;
use crate::domain::timing::build_marked_request;
use crate::infrastructure::events::EventPublisher;

/// 预取任务
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkJob {
    pub session_id: String,
    pub chunk_id: u32,
}

/// Worker 配置
#[derive(Debug, Clone)]
pub struct PrefetchWorkerConfig {
    /// 最大并发合成数
    pub max_concurrent: usize,
}

impl Default for PrefetchWorkerConfig {
    fn default() -> Self {
        Self { max_concurrent: 2 }
    }
}

/// 预取 Worker
///
/// 从队列消费 ChunkJob，调用合成端口并把结果写回会话中的 Chunk
pub struct ChunkPrefetchWorker {
    config: PrefetchWorkerConfig,
    queue_receiver: mpsc::Receiver<ChunkJob>,
    session_manager: Arc<dyn SessionManagerPort>,
    synthesizer: Arc<dyn SpeechSynthesizerPort>,
    event_publisher: Arc<EventPublisher>,
}

impl ChunkPrefetchWorker {
    pub fn new(
        config: PrefetchWorkerConfig,
        queue_receiver: mpsc::Receiver<ChunkJob>,
        session_manager: Arc<dyn SessionManagerPort>,
        synthesizer: Arc<dyn SpeechSynthesizerPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            config,
            queue_receiver,
            session_manager,
            synthesizer,
            event_publisher,
        }
    }

    /// 启动 Worker，队列发送端全部关闭后返回
    pub async fn run(mut self) {
        tracing::info!(
            max_concurrent = self.config.max_concurrent,
            "ChunkPrefetchWorker started"
        );

        // 使用 semaphore 控制并发
        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.config.max_concurrent));
        let mut in_flight = tokio::task::JoinSet::new();

        while let Some(job) = self.queue_receiver.recv().await {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to acquire semaphore permit");
                    continue;
                }
            };

            let session_manager = self.session_manager.clone();
            let synthesizer = self.synthesizer.clone();
            let event_publisher = self.event_publisher.clone();

            in_flight.spawn(async move {
                let _permit = permit; // 持有 permit 直到任务完成
                Self::process_job(&job, session_manager, synthesizer, event_publisher).await;
            });
        }

        while in_flight.join_next().await.is_some() {}
        tracing::info!("ChunkPrefetchWorker stopped");
    }

    /// 处理单个任务，返回处理后的块状态；跳过时返回 None
    pub async fn process_job(
        job: &ChunkJob,
        session_manager: Arc<dyn SessionManagerPort>,
        synthesizer: Arc<dyn SpeechSynthesizerPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Option<ChunkStatus> {
        // Check 1: 会话是否有效
        let handle = match session_manager.get(&job.session_id) {
            Ok(handle) => handle,
            Err(_) => {
                tracing::debug!(session_id = %job.session_id, "Session invalid, skipping");
                return None;
            }
        };

        // 标记为加载中并构造请求；合成期间不持有会话锁
        let request = {
            let mut session = handle.lock().await;
            let status = session.chunk(job.chunk_id)?.status();
            if matches!(status, ChunkStatus::Ready | ChunkStatus::Loading) {
                tracing::debug!(
                    session_id = %job.session_id,
                    chunk_id = job.chunk_id,
                    status = %status,
                    "Chunk already loaded or in flight, skipping"
                );
                return None;
            }
            if let Err(e) = session.begin_chunk_load(job.chunk_id) {
                tracing::error!(chunk_id = job.chunk_id, error = %e, "Failed to update chunk state");
                return None;
            }

            let chunk = session.chunk(job.chunk_id)?;
            let markup = synthesizer
                .timing_format()
                .needs_markup()
                .then(|| build_marked_request(session.document(), chunk));
            SynthesisRequest {
                session_id: job.session_id.clone(),
                chunk_id: job.chunk_id,
                text: chunk.text().to_string(),
                markup,
            }
        };
        event_publisher.publish_chunk_status(&job.session_id, job.chunk_id, ChunkStatus::Loading);

        let result = synthesizer.synthesize(request).await;

        // Check 2: 合成后再次检查会话是否有效
        if !session_manager.is_valid(&job.session_id) {
            tracing::debug!(
                session_id = %job.session_id,
                chunk_id = job.chunk_id,
                "Session invalid after synthesis, dropping result"
            );
            return None;
        }

        let mut session = handle.lock().await;
        match result {
            Ok(response) => {
                let duration = response.audio.duration_secs();
                let entries = response.timing.len();
                if let Err(e) =
                    session.complete_chunk_load(job.chunk_id, response.audio, response.timing)
                {
                    tracing::error!(chunk_id = job.chunk_id, error = %e, "Failed to store chunk audio");
                    return None;
                }
                event_publisher.publish_chunk_status(
                    &job.session_id,
                    job.chunk_id,
                    ChunkStatus::Ready,
                );
                tracing::info!(
                    session_id = %job.session_id,
                    chunk_id = job.chunk_id,
                    duration_secs = ?duration,
                    timing_entries = entries,
                    "Chunk ready"
                );
                Some(ChunkStatus::Ready)
            }
            Err(e) => {
                tracing::error!(
                    session_id = %job.session_id,
                    chunk_id = job.chunk_id,
                    error = %e,
                    "TTS synthesis failed"
                );
                let message = format!("TTS error: {}", e);
                if let Err(e) = session.fail_chunk_load(job.chunk_id, message.as_str()) {
                    tracing::error!(chunk_id = job.chunk_id, error = %e, "Failed to update chunk state");
                    return None;
                }
                event_publisher.publish_chunk_failed(&job.session_id, job.chunk_id, &message);
                Some(ChunkStatus::Error)
            }
        }
    }
}
