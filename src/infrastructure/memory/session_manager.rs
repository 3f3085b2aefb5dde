//! In-Memory Session Manager Implementation

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::ports::{SessionHandle, SessionManagerError, SessionManagerPort};
use crate::domain::session::ReadingSession;

/// 注册表条目
///
/// 活动时间放在锁外，过期扫描不需要获取会话锁。
struct SessionEntry {
    handle: SessionHandle,
    last_activity: DateTime<Utc>,
}

/// 内存会话管理器
pub struct InMemorySessionManager {
    sessions: DashMap<String, SessionEntry>,
}

impl InMemorySessionManager {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Default for InMemorySessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManagerPort for InMemorySessionManager {
    fn create(&self, session: ReadingSession) -> Result<String, SessionManagerError> {
        let session_id = session.id().to_string();
        if self.sessions.contains_key(&session_id) {
            return Err(SessionManagerError::AlreadyExists(session_id));
        }
        let entry = SessionEntry {
            last_activity: session.created_at(),
            handle: Arc::new(Mutex::new(session)),
        };
        self.sessions.insert(session_id.clone(), entry);
        tracing::info!(session_id = %session_id, "Session registered");
        Ok(session_id)
    }

    fn get(&self, id: &str) -> Result<SessionHandle, SessionManagerError> {
        self.sessions
            .get(id)
            .map(|entry| entry.handle.clone())
            .ok_or_else(|| SessionManagerError::NotFound(id.to_string()))
    }

    fn is_valid(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    fn close(&self, id: &str) -> Result<(), SessionManagerError> {
        self.sessions
            .remove(id)
            .map(|_| {
                tracing::info!(session_id = %id, "Session closed");
            })
            .ok_or_else(|| SessionManagerError::NotFound(id.to_string()))
    }

    fn touch(&self, id: &str) {
        if let Some(mut entry) = self.sessions.get_mut(id) {
            entry.last_activity = Utc::now();
        }
    }

    fn get_expired_sessions(&self, idle_timeout_secs: u64) -> Vec<String> {
        let now = Utc::now();
        let timeout = chrono::Duration::seconds(idle_timeout_secs as i64);

        self.sessions
            .iter()
            .filter_map(|entry| {
                let elapsed = now - entry.last_activity;
                if elapsed > timeout {
                    Some(entry.key().clone())
                } else {
                    None
                }
            })
            .collect()
    }

    fn list_all(&self) -> Vec<String> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }
}
