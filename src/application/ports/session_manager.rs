//! Session Manager Port - 会话生命周期管理
//!
//! 定义会话管理的抽象接口，具体实现在 infrastructure/memory 层

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::session::ReadingSession;

/// Session Manager 错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionManagerError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Session already exists: {0}")]
    AlreadyExists(String),
}

/// 会话句柄
///
/// 同一会话的所有写操作经过这把锁串行，对齐器不会被并发调用。
pub type SessionHandle = Arc<Mutex<ReadingSession>>;

/// Session Manager Port
///
/// 管理朗读会话的生命周期，所有状态存储在内存中
pub trait SessionManagerPort: Send + Sync {
    /// 注册新会话，返回会话 ID
    fn create(&self, session: ReadingSession) -> Result<String, SessionManagerError>;

    /// 获取会话句柄
    fn get(&self, id: &str) -> Result<SessionHandle, SessionManagerError>;

    /// 检查会话是否有效
    fn is_valid(&self, id: &str) -> bool;

    /// 关闭会话
    fn close(&self, id: &str) -> Result<(), SessionManagerError>;

    /// 更新最后活动时间
    fn touch(&self, id: &str);

    /// 获取所有过期会话的 ID
    fn get_expired_sessions(&self, idle_timeout_secs: u64) -> Vec<String>;

    /// 获取所有会话 ID
    fn list_all(&self) -> Vec<String>;
}
