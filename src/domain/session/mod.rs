//! Session Context - 朗读会话
//!
//! 职责:
//! - 持有 Document、Chunk 列表和对齐器
//! - 播放/听写模式切换，保证同一时刻只有一个计时写入方
//! - 维护当前高亮单词（无匹配时保留上一个）

mod aggregate;
mod errors;
mod value_objects;

pub use aggregate::{ReadingSession, SessionSettings};
pub use errors::SessionError;
pub use value_objects::{Highlight, ReadingMode, SeekTarget};
