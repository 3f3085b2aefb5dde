//! Playback Commands - TTS 播放相关命令

use crate::domain::session::Highlight;

/// 预取命令 - 把块加入合成队列
#[derive(Debug, Clone)]
pub struct PrefetchChunksCommand {
    pub session_id: String,
    /// 为空时预取全部块
    pub chunk_ids: Vec<u32>,
}

/// 预取响应
#[derive(Debug, Clone)]
pub struct PrefetchChunksResponse {
    pub session_id: String,
    /// 实际入队的块
    pub queued: Vec<u32>,
    /// 已就绪或加载中而跳过的块
    pub skipped: Vec<u32>,
}

/// 开始播放命令
#[derive(Debug, Clone)]
pub struct StartPlaybackCommand {
    pub session_id: String,
    pub chunk_id: u32,
}

/// 开始播放响应
#[derive(Debug, Clone)]
pub struct StartPlaybackResponse {
    pub session_id: String,
    pub chunk_id: u32,
    pub audio_key: String,
    pub duration_secs: Option<f64>,
    pub timed_words: usize,
}

/// 更新播放位置命令
#[derive(Debug, Clone)]
pub struct UpdatePlaybackPositionCommand {
    pub session_id: String,
    pub time_seconds: f64,
}

/// 更新播放位置响应
#[derive(Debug, Clone)]
pub struct UpdatePlaybackPositionResponse {
    pub session_id: String,
    pub highlight: Highlight,
}

/// Seek 命令 - 跳转到句子开头
#[derive(Debug, Clone)]
pub struct SeekCommand {
    pub session_id: String,
    pub sentence_index: usize,
}

/// Seek 响应
#[derive(Debug, Clone)]
pub struct SeekResponse {
    pub session_id: String,
    pub chunk_id: u32,
    pub time_seconds: f64,
    pub word_index: Option<usize>,
}
