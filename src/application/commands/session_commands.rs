//! Session Commands - 会话生命周期命令

use crate::domain::session::ReadingMode;

/// 打开会话命令 - 分段 + 分块
#[derive(Debug, Clone)]
pub struct OpenSessionCommand {
    pub text: String,
}

/// 打开会话响应
#[derive(Debug, Clone)]
pub struct OpenSessionResponse {
    pub session_id: String,
    pub sentence_count: usize,
    pub word_count: usize,
    pub chunk_count: usize,
}

/// 停止朗读命令 - 回到空闲模式
#[derive(Debug, Clone)]
pub struct StopReadingCommand {
    pub session_id: String,
}

/// 停止朗读响应
#[derive(Debug, Clone)]
pub struct StopReadingResponse {
    pub session_id: String,
    pub mode: ReadingMode,
}

/// 关闭会话命令
#[derive(Debug, Clone)]
pub struct CloseSessionCommand {
    pub session_id: String,
}

/// 关闭会话响应
#[derive(Debug, Clone)]
pub struct CloseSessionResponse {
    pub session_id: String,
}

/// 清理空闲会话命令
#[derive(Debug, Clone)]
pub struct ExpireIdleSessionsCommand {
    pub idle_timeout_secs: u64,
}

/// 清理空闲会话响应
#[derive(Debug, Clone)]
pub struct ExpireIdleSessionsResponse {
    pub expired: Vec<String>,
}
