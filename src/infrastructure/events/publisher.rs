//! Event Publisher Implementation
//!
//! 按会话广播高亮和块状态事件，供展示层订阅

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::domain::chunking::ChunkStatus;

/// 每个会话通道的缓冲容量
const CHANNEL_CAPACITY: usize = 100;

/// 高亮来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightSource {
    Playback,
    Dictation,
    Seek,
}

/// 会话事件类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ReadingEvent {
    /// 高亮单词变化
    HighlightChanged {
        session_id: String,
        word_index: usize,
        source: HighlightSource,
    },
    /// 块状态变更
    ChunkStatusChanged {
        session_id: String,
        chunk_id: u32,
        status: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// 会话关闭
    SessionClosed { session_id: String, reason: String },
}

/// 事件发布器
pub struct EventPublisher {
    /// session_id -> broadcast sender
    session_channels: DashMap<String, broadcast::Sender<ReadingEvent>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            session_channels: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 注册会话的事件通道
    pub fn register_session(&self, session_id: &str) -> broadcast::Receiver<ReadingEvent> {
        if let Some(sender) = self.session_channels.get(session_id) {
            return sender.subscribe();
        }

        let (tx, rx) = broadcast::channel(CHANNEL_CAPACITY);
        self.session_channels.insert(session_id.to_string(), tx);
        rx
    }

    /// 取消注册会话
    pub fn unregister_session(&self, session_id: &str) {
        self.session_channels.remove(session_id);
    }

    /// 获取会话的事件接收器
    pub fn subscribe(&self, session_id: &str) -> Option<broadcast::Receiver<ReadingEvent>> {
        self.session_channels.get(session_id).map(|s| s.subscribe())
    }

    pub fn publish_highlight(&self, session_id: &str, word_index: usize, source: HighlightSource) {
        self.publish_to_session(
            session_id,
            ReadingEvent::HighlightChanged {
                session_id: session_id.to_string(),
                word_index,
                source,
            },
        );
    }

    /// 发布块状态事件（Loading / Ready）
    pub fn publish_chunk_status(&self, session_id: &str, chunk_id: u32, status: ChunkStatus) {
        self.publish_to_session(
            session_id,
            ReadingEvent::ChunkStatusChanged {
                session_id: session_id.to_string(),
                chunk_id,
                status: status.as_str().to_string(),
                error: None,
            },
        );
    }

    /// 发布块加载失败事件
    pub fn publish_chunk_failed(&self, session_id: &str, chunk_id: u32, error: &str) {
        self.publish_to_session(
            session_id,
            ReadingEvent::ChunkStatusChanged {
                session_id: session_id.to_string(),
                chunk_id,
                status: ChunkStatus::Error.as_str().to_string(),
                error: Some(error.to_string()),
            },
        );
    }

    /// 发布会话关闭事件
    pub fn publish_session_closed(&self, session_id: &str, reason: &str) {
        self.publish_to_session(
            session_id,
            ReadingEvent::SessionClosed {
                session_id: session_id.to_string(),
                reason: reason.to_string(),
            },
        );
    }

    /// 发布事件到指定会话
    fn publish_to_session(&self, session_id: &str, event: ReadingEvent) {
        if let Some(sender) = self.session_channels.get(session_id) {
            if let Err(e) = sender.send(event) {
                tracing::debug!(
                    session_id = %session_id,
                    error = %e,
                    "Failed to publish event (no receivers)"
                );
            }
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_reach_registered_session_only() {
        let publisher = EventPublisher::new();
        let mut rx = publisher.register_session("s1");

        publisher.publish_highlight("s1", 3, HighlightSource::Playback);
        publisher.publish_highlight("other", 9, HighlightSource::Playback);
        publisher.publish_chunk_failed("s1", 0, "boom");

        assert_eq!(
            rx.recv().await.unwrap(),
            ReadingEvent::HighlightChanged {
                session_id: "s1".to_string(),
                word_index: 3,
                source: HighlightSource::Playback,
            }
        );
        match rx.recv().await.unwrap() {
            ReadingEvent::ChunkStatusChanged { status, error, .. } => {
                assert_eq!(status, "error");
                assert_eq!(error.as_deref(), Some("boom"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_event_json_shape() {
        let event = ReadingEvent::ChunkStatusChanged {
            session_id: "s".to_string(),
            chunk_id: 2,
            status: "ready".to_string(),
            error: None,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "ChunkStatusChanged");
        assert_eq!(value["data"]["chunk_id"], 2);
        assert!(value["data"].get("error").is_none());
    }

    #[test]
    fn test_unregister_drops_channel() {
        let publisher = EventPublisher::new();
        let _rx = publisher.register_session("s1");
        assert!(publisher.subscribe("s1").is_some());
        publisher.unregister_session("s1");
        assert!(publisher.subscribe("s1").is_none());
        // 未注册会话静默丢弃
        publisher.publish_session_closed("s1", "client_close");
    }
}
