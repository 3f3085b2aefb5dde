//! Session Context - Errors

use thiserror::Error;

use crate::domain::chunking::{ChunkError, ChunkStatus};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("无效操作: {0}")]
    InvalidOperation(String),

    #[error("Chunk 尚未就绪: chunk {id} 状态为 {status}")]
    ChunkNotReady { id: u32, status: ChunkStatus },

    #[error("句子索引越界: {index} (共 {sentence_count} 句)")]
    SentenceOutOfRange {
        index: usize,
        sentence_count: usize,
    },

    #[error(transparent)]
    Chunk(#[from] ChunkError),
}
