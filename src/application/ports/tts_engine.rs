//! Speech Synthesizer Port - TTS 合成抽象
//!
//! 供应商返回不透明的音频句柄和三种计时格式之一，
//! 具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::chunking::AudioHandle;
use crate::domain::timing::{TimingFormat, TimingMetadata};

/// TTS 错误
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Empty text for chunk {0}")]
    EmptyText(u32),
}

/// 合成请求（一个 Chunk）
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub session_id: String,
    pub chunk_id: u32,
    /// 块文本
    pub text: String,
    /// 带 `<mark>` 的 SSML，仅标记型供应商需要
    pub markup: Option<String>,
}

/// 合成响应
#[derive(Debug, Clone)]
pub struct SynthesisResponse {
    pub audio: AudioHandle,
    pub timing: TimingMetadata,
}

/// Speech Synthesizer Port
#[async_trait]
pub trait SpeechSynthesizerPort: Send + Sync {
    /// 合成一个块，返回音频句柄和计时元数据
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResponse, TtsError>;

    /// 供应商回报的计时格式
    fn timing_format(&self) -> TimingFormat;

    /// 检查 TTS 服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
