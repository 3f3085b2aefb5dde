//! Chunking Context - Value Objects

use serde::{Deserialize, Serialize};

/// Chunk 状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStatus {
    /// 等待合成
    Pending,
    /// 正在合成
    Loading,
    /// 音频和计时已就绪
    Ready,
    /// 合成失败
    Error,
}

impl ChunkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkStatus::Pending => "pending",
            ChunkStatus::Loading => "loading",
            ChunkStatus::Ready => "ready",
            ChunkStatus::Error => "error",
        }
    }

    /// 状态转换是否合法（Error -> Loading 为重试）
    pub fn can_transition_to(&self, next: ChunkStatus) -> bool {
        matches!(
            (self, next),
            (ChunkStatus::Pending, ChunkStatus::Loading)
                | (ChunkStatus::Error, ChunkStatus::Loading)
                | (ChunkStatus::Loading, ChunkStatus::Ready)
                | (ChunkStatus::Loading, ChunkStatus::Error)
        )
    }
}

impl std::fmt::Display for ChunkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 音频句柄（由 TTS 协作方提供，对核心不透明）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioHandle {
    key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

impl AudioHandle {
    pub fn new(key: impl Into<String>, duration_secs: Option<f64>) -> Self {
        Self {
            key: key.into(),
            duration_secs,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn duration_secs(&self) -> Option<f64> {
        self.duration_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        assert!(ChunkStatus::Pending.can_transition_to(ChunkStatus::Loading));
        assert!(ChunkStatus::Error.can_transition_to(ChunkStatus::Loading));
        assert!(ChunkStatus::Loading.can_transition_to(ChunkStatus::Ready));
        assert!(!ChunkStatus::Pending.can_transition_to(ChunkStatus::Ready));
        assert!(!ChunkStatus::Ready.can_transition_to(ChunkStatus::Loading));
    }

    #[test]
    fn test_status_serde_snake_case() {
        let json = serde_json::to_string(&ChunkStatus::Loading).unwrap();
        assert_eq!(json, "\"loading\"");
    }
}
