//! readalong - 朗读高亮核心
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - 文本分割器: 句子/单词切分（缩写、引号、连字符规则）
//! - Document / Chunking / Alignment / Timing / Session Context
//!
//! 应用层 (application/):
//! - Ports: SpeechSynthesizer, SessionManager
//! - Commands: 会话、播放、听写命令处理器
//! - Queries: 文档与块视图
//!
//! 基础设施层 (infrastructure/):
//! - Memory: SessionManager 内存实现
//! - Worker: ChunkPrefetchWorker 后台合成预取
//! - Adapters: 模拟 TTS 客户端
//! - Events: 会话事件发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
