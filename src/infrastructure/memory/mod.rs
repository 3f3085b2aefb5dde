//! Memory Layer - In-Memory State Management
//!
//! 实现 SessionManager，管理朗读会话的内存状态

mod session_manager;

pub use session_manager::InMemorySessionManager;
